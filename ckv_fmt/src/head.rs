//! File head: the distinguished first record
//! 文件头：首条特殊记录

use zerocopy::{
  FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
  byteorder::little_endian::U32,
};

use crate::{
  crc::CRC_INIT,
  kvp::{FILE_HEAD_KEY, Kvp},
};

/// File signature / 文件签名
pub const SIGNATURE: u8 = 0xC6;

/// Format version / 格式版本
pub const VERSION: u8 = 0;

/// File head size / 文件头大小
pub const FILE_HEAD: usize = size_of::<FileHead>();

/// Fixed-shape head (14 bytes)
/// 定长文件头（14 字节）
///
/// | Field     | Size | Description                              |
/// |-----------|------|------------------------------------------|
/// | kvp       | 4    | key = FILE_HEAD_KEY, size >= 14          |
/// | sign      | 1    | SIGNATURE                                |
/// | ver       | 1    | VERSION                                  |
/// | file_size | 4    | valid image length, this head included   |
/// | crc       | 4    | register over bytes `[14, file_size)`    |
///
/// `kvp.size` may exceed 14 in later versions, bounded by `file_size`.
/// `kvp.size` 在后续版本中可超过 14，以 `file_size` 为界。
#[repr(C)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy, Debug)]
pub struct FileHead {
  pub kvp: Kvp,
  pub sign: u8,
  pub ver: u8,
  pub file_size: U32,
  pub crc: U32,
}

impl FileHead {
  /// Head of an empty store / 空存储的文件头
  #[inline]
  pub fn new() -> Self {
    Self {
      kvp: Kvp::new(FILE_HEAD_KEY, FILE_HEAD as u16),
      sign: SIGNATURE,
      ver: VERSION,
      file_size: U32::new(FILE_HEAD as u32),
      crc: U32::new(CRC_INIT),
    }
  }
}

impl Default for FileHead {
  fn default() -> Self {
    Self::new()
  }
}
