//! Record header and bounds-safe traversal
//! 记录头与边界安全遍历

use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned, byteorder::little_endian::U16,
};

/// Record header size / 记录头大小
pub const KVP_HEAD: usize = size_of::<Kvp>();

/// Largest user key / 最大用户键
pub const MAX_KEY: u16 = 0xFFFA;

/// Reserved key of the file head, must not appear elsewhere
/// 文件头保留键，不得出现在其他位置
pub const FILE_HEAD_KEY: u16 = 0xFFFB;

/// Reserved, also means "no key" / 保留，亦表示“无键”
pub const INVALID_KEY: u16 = 0xFFFF;

/// Serialized record header: key + total size, header included
/// 序列化记录头：键 + 总大小（含头）
#[repr(C)]
#[derive(
  FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy, Debug, PartialEq, Eq,
)]
pub struct Kvp {
  pub key: U16,
  pub size: U16,
}

impl Kvp {
  #[inline]
  pub fn new(key: u16, size: u16) -> Self {
    Self {
      key: U16::new(key),
      size: U16::new(size),
    }
  }

  /// Value bytes carried by a record of this size / 该记录的值字节数
  #[inline]
  pub fn val_len(&self) -> usize {
    (self.size.get() as usize).saturating_sub(KVP_HEAD)
  }
}

/// View the record at `at` when its header and full size fit in `buf`
/// 当记录头与完整大小均落在 `buf` 内时，返回其只读视图
#[inline]
pub fn kvp_at(buf: &[u8], at: usize) -> Option<&Kvp> {
  let rest = buf.get(at..)?;
  let (kvp, _) = Kvp::ref_from_prefix(rest).ok()?;
  let size = kvp.size.get() as usize;
  (size >= KVP_HEAD && size <= rest.len()).then_some(kvp)
}

/// True when the record at `at` can be read in full
/// 记录能否完整读取
#[inline]
pub fn can_deref(buf: &[u8], at: usize) -> bool {
  kvp_at(buf, at).is_some()
}

/// Record size, clamped to the bytes remaining before `buf.len()`
/// 记录大小，截断到 `buf.len()` 前的剩余字节
#[inline]
pub fn full_size(buf: &[u8], at: usize) -> usize {
  match kvp_at(buf, at) {
    Some(kvp) => kvp.size.get() as usize,
    None => buf.len().saturating_sub(at),
  }
}

/// Advance to the next record boundary, never past `buf.len()`
/// 前进到下一条记录边界，绝不越过 `buf.len()`
///
/// A chain of `next` calls from any valid offset lands on exactly `buf.len()`.
/// 从任意合法偏移出发的 `next` 链必定恰好停在 `buf.len()`。
#[inline]
pub fn next(buf: &[u8], at: usize) -> usize {
  let to = at + full_size(buf, at);
  if to != buf.len() && !can_deref(buf, to) {
    return buf.len();
  }
  to
}
