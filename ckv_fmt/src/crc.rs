//! Raw reflected CRC-32 folding
//! 原始反射 CRC-32 折叠
//!
//! The on-disk value is the bare shift register: seeded `0xFFFFFFFF`,
//! polynomial `0xEDB88320`, no final inversion. crc32fast speaks the standard
//! inverted form, so convert at both seams.
//! 磁盘上的值是裸移位寄存器：种子 `0xFFFFFFFF`，多项式 `0xEDB88320`，
//! 无最终取反。crc32fast 使用标准取反形式，在两端换算。

use crc32fast::Hasher;

/// Register seed / 寄存器种子
pub const CRC_INIT: u32 = 0xFFFF_FFFF;

/// Fold `data` into the register `seed`
/// 将 `data` 折叠进寄存器 `seed`
///
/// Associative by concatenation: `add_crc(add_crc(s, a), b) == add_crc(s, a ++ b)`,
/// and `add_crc(s, &[]) == s`.
/// 按拼接可结合：`add_crc(add_crc(s, a), b) == add_crc(s, a ++ b)`，
/// 且 `add_crc(s, &[]) == s`。
#[inline]
pub fn add_crc(seed: u32, data: &[u8]) -> u32 {
  let mut h = Hasher::new_with_initial(!seed);
  h.update(data);
  !h.finalize()
}
