//! # ckv_fmt - Store file format
//! 存储文件格式
//!
//! Self-describing packed container: a 14-byte file head followed by
//! variable-length records, validated end to end by CRC-32.
//! 自描述紧凑容器：14 字节文件头 + 变长记录，端到端 CRC-32 校验。
//!
//! ## File layout / 文件布局
//!
//! ```text
//! | FileHead(14) | Kvp | Kvp | ... | <- file_size -> trailing garbage?
//!                |<-- crc covers -->|
//! ```

pub mod crc;
pub mod head;
pub mod kvp;
pub mod validate;

pub use crc::{CRC_INIT, add_crc};
pub use head::{FILE_HEAD, FileHead, SIGNATURE, VERSION};
pub use kvp::{
  FILE_HEAD_KEY, INVALID_KEY, KVP_HEAD, Kvp, MAX_KEY, can_deref, full_size, kvp_at, next,
};
pub use validate::validate;
