//! Insert, erase, value writes
//! 插入、删除、值写入

use ckv_fmt::{KVP_HEAD, Kvp, full_size};
use zerocopy::IntoBytes;

use super::Store;
use crate::{Error, Result};

impl Store {
  /// Insert a record with `val_size` value bytes at cursor `at`
  /// 在游标 `at` 处插入值为 `val_size` 字节的记录
  ///
  /// Shifts `[at, end)` right; the value region starts zeroed. Returns the
  /// cursor of the new record.
  /// 右移 `[at, end)`；值区域初始为零。返回新记录的游标。
  pub fn insert(&mut self, at: usize, key: u16, val_size: usize) -> Result<usize> {
    let kvp_size = val_size
      .checked_add(KVP_HEAD)
      .and_then(|n| u16::try_from(n).ok())
      .ok_or(Error::TooBig)? as usize;

    let old_len = self.buf.len();
    if at > old_len {
      return Err(Error::Invalid);
    }
    self.reserve(old_len + kvp_size)?;

    self.buf.resize(old_len + kvp_size, 0);
    self.buf.copy_within(at..old_len, at + kvp_size);

    let kvp = Kvp::new(key, kvp_size as u16);
    self.buf[at..at + KVP_HEAD].copy_from_slice(kvp.as_bytes());
    self.buf[at + KVP_HEAD..at + kvp_size].fill(0);

    Ok(at)
  }

  /// Remove the record at `at`; returns the cursor of its successor
  /// 删除 `at` 处的记录，返回其后继的游标
  pub fn erase(&mut self, at: usize) -> usize {
    let len = self.buf.len();
    if at >= len {
      return len;
    }
    let size = full_size(&self.buf, at);
    self.buf.copy_within(at + size..len, at);
    self.buf.truncate(len - size);
    at
  }

  /// Write `data` at `offset` into the record's value, zeroing the tail
  /// 在记录值的 `offset` 处写入 `data`，并清零其后尾部
  ///
  /// The region past `offset + data.len()` is cleared, not preserved: write
  /// the whole value in one call, or rebuild it yourself.
  /// `offset + data.len()` 之后的区域会被清零而非保留：
  /// 要么一次写整个值，要么自行重建。
  pub fn write_value(&mut self, at: usize, offset: usize, data: &[u8]) -> Result<()> {
    let val_len = self.kvp(at).ok_or(Error::Invalid)?.val_len();
    let last = offset.checked_add(data.len()).ok_or(Error::TooBig)?;
    if last > val_len {
      return Err(Error::TooBig);
    }

    let val = &mut self.buf[at + KVP_HEAD..at + KVP_HEAD + val_len];
    val[offset..last].copy_from_slice(data);
    val[last..].fill(0);
    Ok(())
  }
}
