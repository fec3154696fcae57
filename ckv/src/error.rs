//! Error taxonomy
//! 错误分类

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// Open on an open handle / 对已打开句柄再次 open
  #[error("store already open / 存储已打开")]
  Already,

  #[error("not found / 未找到")]
  NotFound,

  #[error("invalid argument or state / 参数或状态无效")]
  Invalid,

  #[error("file shorter than the file head / 文件短于文件头")]
  Range,

  #[error("exceeds the max size / 超出容量上限")]
  TooBig,

  #[error("no usable space after block overhead / 扣除块开销后无可用空间")]
  NoSpace,

  #[error("allocation failed / 内存分配失败")]
  NoMem,

  #[error("file locked / 文件已锁定")]
  Locked,

  #[error("content failed validation / 内容校验失败")]
  Corrupt,

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl From<std::collections::TryReserveError> for Error {
  fn from(_: std::collections::TryReserveError) -> Self {
    Self::NoMem
  }
}
