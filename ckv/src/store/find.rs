//! Key lookup, range scans, unique allocation
//! 键查找、范围扫描、唯一分配

use ckv_fmt::{KVP_HEAD, full_size, next};

use super::Store;
use crate::{Error, Result};

/// Range-and-step key match; `last` is exclusive
/// 范围与步长键匹配；`last` 为开区间端点
#[inline]
fn key_match(key: u16, first: u16, last: u16, step: u16) -> bool {
  first <= key && key < last && step != 0 && (key - first) % step == 0
}

impl Store {
  /// First record keyed `key` at or after cursor `at`, else `end()`
  /// 自游标 `at` 起首条键为 `key` 的记录，否则 `end()`
  fn find_from(&self, key: u16, mut at: usize) -> usize {
    while at != self.end() {
      if let Some(kvp) = self.kvp(at)
        && kvp.key.get() == key
      {
        break;
      }
      at = next(&self.buf, at);
    }
    at
  }

  /// First record keyed `key`, or None
  /// 首条键为 `key` 的记录，无则 None
  pub fn try_get(&self, key: u16) -> Option<usize> {
    let at = self.find_from(key, self.begin());
    (at != self.end()).then_some(at)
  }

  /// Next record after `prev` whose key lies in `[first, last)` on the step grid
  /// `prev` 之后键落在 `[first, last)` 且对齐步长网格的下一条记录
  ///
  /// `prev = None` starts from `begin()`. Returns `end()` when nothing
  /// matches.
  /// `prev = None` 时自 `begin()` 开始。无匹配时返回 `end()`。
  pub fn next_in_range(&self, prev: Option<usize>, first: u16, last: u16, step: u16) -> usize {
    let mut at = match prev {
      Some(p) => next(&self.buf, p),
      None => self.begin(),
    };
    while at != self.end() {
      if let Some(kvp) = self.kvp(at)
        && key_match(kvp.key.get(), first, last, step)
      {
        break;
      }
      at = next(&self.buf, at);
    }
    at
  }

  /// Erase every record matching the range and step
  /// 删除范围与步长匹配的所有记录
  pub fn erase_in_range(&mut self, first: u16, last: u16, step: u16) -> Result<()> {
    if first > last || step < 1 {
      return Err(Error::Invalid);
    }

    let mut at = self.begin();
    while at != self.end() {
      let matched = self
        .kvp(at)
        .is_some_and(|kvp| key_match(kvp.key.get(), first, last, step));
      at = if matched {
        self.erase(at)
      } else {
        next(&self.buf, at)
      };
    }
    Ok(())
  }

  /// Keep exactly one record of `key` sized `val_size`, optionally writing it
  /// 保留恰好一条键为 `key`、值大小为 `val_size` 的记录，可选写入值
  ///
  /// Matches of a different size are erased; the first exact-size match is
  /// reused and later duplicates dropped; a fresh record is appended when no
  /// match survives.
  /// 大小不符的匹配被删除；首条完全匹配被复用，其后的重复键被丢弃；
  /// 无存活匹配时在末尾追加新记录。
  pub fn put_unique(&mut self, key: u16, data: Option<&[u8]>, val_size: usize) -> Result<usize> {
    let want = val_size
      .checked_add(KVP_HEAD)
      .and_then(|n| u16::try_from(n).ok())
      .ok_or(Error::TooBig)? as usize;

    let mut at = self.begin();
    let mut kept = None;
    loop {
      at = self.find_from(key, at);
      if at == self.end() {
        break;
      }
      if full_size(&self.buf, at) != want {
        at = self.erase(at);
        continue;
      }

      // First exact match wins; any same-key record after it goes
      // 首条完全匹配保留；其后的同键记录删除
      kept = Some(at);
      let mut dup = next(&self.buf, at);
      loop {
        dup = self.find_from(key, dup);
        if dup == self.end() {
          break;
        }
        dup = self.erase(dup);
      }
      break;
    }

    let at = match kept {
      Some(at) => at,
      None => {
        let end = self.end();
        self.insert(end, key, val_size)?
      }
    };

    if let Some(data) = data {
      self.write_value(at, 0, data)?;
    }
    Ok(at)
  }

  /// Insert a record under the first free key in `[first, last)` on the step grid
  /// 在 `[first, last)` 内沿步长网格寻找首个空闲键并插入记录
  ///
  /// `NotFound` when the range is exhausted or the increment overflows 16
  /// bits.
  /// 范围耗尽或步进溢出 16 位时返回 `NotFound`。
  pub fn alloc_unique(&mut self, first: u16, last: u16, val_size: usize, step: u16) -> Result<usize> {
    if step == 0 {
      return Err(Error::Invalid);
    }

    let mut key = first;
    while key < last {
      if self.try_get(key).is_none() {
        let end = self.end();
        return self.insert(end, key, val_size);
      }
      key = key.checked_add(step).ok_or(Error::NotFound)?;
    }
    Err(Error::NotFound)
  }
}
