//! Open lifecycle: lock, read, validate, reconcile
//! 打开流程：加锁、读取、校验、对账

use std::{
  fs::{self, OpenOptions},
  io::ErrorKind,
  os::unix::fs::{FileExt as _, OpenOptionsExt},
  path::{Path, PathBuf},
};

use ckv_fmt::{FILE_HEAD, FileHead, validate};
use fs4::fs_std::FileExt as _;
use log::{debug, warn};
use zerocopy::IntoBytes;

use super::Store;
use crate::{Error, Flags, Replica, Result};

/// Filesystem metadata bytes assumed consumed per storage block
/// 假定文件系统每个存储块消耗的元数据字节数
const BLOCK_OVERHEAD: usize = 16;

/// Deduct per-block filesystem overhead from the caller's budget, using the
/// block size of the directory that will hold the file
/// 按文件所在目录的块大小，从调用者预算中扣除每块文件系统开销
fn adjust_max_size(dir: &Path, max_size: usize) -> Result<usize> {
  let block = fs4::allocation_granularity(dir)? as usize;
  let blocks = max_size.div_ceil(block.max(1));
  let adjusted = max_size.saturating_sub(blocks * BLOCK_OVERHEAD);
  if adjusted <= BLOCK_OVERHEAD {
    return Err(Error::NoSpace);
  }
  Ok(adjusted)
}

/// `<primary>.tmp`, same directory / 主文件同目录下的 `<primary>.tmp`
pub(crate) fn swap_path(primary: &Path) -> PathBuf {
  let mut os = primary.as_os_str().to_os_string();
  os.push(".tmp");
  PathBuf::from(os)
}

impl Store {
  /// Open `path` with a byte budget of `max_size` before block overhead
  /// 打开 `path`，`max_size` 为扣除块开销前的字节预算
  ///
  /// Builds in a temporary handle: on any failure `self` is untouched and
  /// every acquired resource is released.
  /// 在临时句柄中构建：失败时 `self` 不变，已获取的资源全部释放。
  pub fn open(
    &mut self,
    path: impl Into<PathBuf>,
    max_size: usize,
    flags: Flags,
    replica: Replica,
  ) -> Result<()> {
    if self.is_open() {
      return Err(Error::Already);
    }

    let mut tmp = Self::default();
    tmp.open_impl(path.into(), max_size, flags, replica)?;
    *self = tmp;
    Ok(())
  }

  fn open_impl(
    &mut self,
    path: PathBuf,
    max_size: usize,
    flags: Flags,
    replica: Replica,
  ) -> Result<()> {
    let dir = match path.parent() {
      Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
      _ => PathBuf::from("."),
    };
    self.max_size = adjust_max_size(&dir, max_size)?;

    self.replica = replica;
    if replica == Replica::Swap {
      let swap = swap_path(&path);
      // A leftover swap is a dead write, drop it before anything else
      // 残留交换文件是一次死写入，先行丢弃
      match fs::remove_file(&swap) {
        Ok(()) => warn!("removed leftover swap: {}", swap.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
      }
      self.swap = Some(swap);
    }

    let file = OpenOptions::new()
      .read(!flags.write_only())
      .write(flags.writable())
      .create(flags.create())
      .truncate(flags.trunc())
      .mode(0o600)
      .custom_flags(libc::O_CLOEXEC)
      .open(&path)?;

    // Writers exclude everyone, readers share; never wait
    // 写者互斥，读者共享；绝不等待
    if flags.writable() {
      if !file.try_lock_exclusive()? {
        return Err(Error::Locked);
      }
    } else if !fs4::fs_std::FileExt::try_lock_shared(&file)? {
      return Err(Error::Locked);
    }

    let len = file.metadata()?.len() as usize;

    if len == 0 {
      if !flags.expects_new() {
        return Err(Error::NotFound);
      }
      // Synthesize an empty store; the file stays 0 bytes until commit
      // 合成空存储；提交前文件保持 0 字节
      self.reserve(FILE_HEAD)?;
      self.buf.extend_from_slice(FileHead::new().as_bytes());
    } else if len < FILE_HEAD {
      return Err(Error::Range);
    } else {
      self.reserve(len)?;
      self.buf.resize(len, 0);
      file.read_exact_at(&mut self.buf, 0)?;

      let ok = validate(&self.buf);
      if ok == 0 {
        return Err(Error::Corrupt);
      }

      if flags.writable() && ok < len && replica != Replica::Swap {
        // A previous in-place writer died between write and truncate.
        // Swap commits never leave this state, so leave the file alone there.
        // 先前的原地写入者死于 write 与 truncate 之间。
        // 交换提交不会留下这种状态，故交换模式下不动文件。
        warn!("truncating stale tail: {} {len} -> {ok}", path.display());
        file.set_len(ok as u64)?;
        file.sync_all()?;
      }
      self.buf.truncate(ok);
    }

    debug!("store opened: {} end={}", path.display(), self.buf.len());
    self.file = Some(file);
    self.primary = path;
    Ok(())
  }
}
