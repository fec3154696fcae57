//! Image validation
//! 镜像校验

use zerocopy::FromBytes;

use crate::{
  crc::{CRC_INIT, add_crc},
  head::{FILE_HEAD, FileHead, SIGNATURE, VERSION},
  kvp::{FILE_HEAD_KEY, next},
};

/// Check whether `data` holds a well-formed store image.
/// 校验 `data` 是否为合法存储镜像。
///
/// Returns the accepted length, 0 to reject. An accepted length below
/// `data.len()` means trailing garbage the caller may truncate away.
/// 返回接受长度，0 表示拒绝。接受长度小于 `data.len()` 时，
/// 尾部为垃圾字节，调用者可将其截断。
pub fn validate(data: &[u8]) -> usize {
  let Ok((head, _)) = FileHead::ref_from_prefix(data) else {
    return 0;
  };

  let head_size = head.kvp.size.get() as usize;
  if head.kvp.key.get() != FILE_HEAD_KEY || head_size < FILE_HEAD {
    return 0;
  }

  if head.sign != SIGNATURE || head.ver != VERSION {
    return 0;
  }

  let file_size = head.file_size.get() as usize;
  if head_size > file_size || file_size > data.len() {
    return 0;
  }

  if add_crc(CRC_INIT, &data[FILE_HEAD..file_size]) != head.crc.get() {
    return 0;
  }

  // The head key must not reappear past the head itself
  // 文件头键不得再次出现
  let img = &data[..file_size];
  let mut at = next(img, 0);
  while at != file_size {
    if at + 2 <= file_size {
      let key = u16::from_le_bytes([img[at], img[at + 1]]);
      if key == FILE_HEAD_KEY {
        return 0;
      }
    }
    at = next(img, at);
  }

  file_size
}
