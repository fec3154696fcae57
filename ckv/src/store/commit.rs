//! Commit: in place or swap-rename
//! 提交：原地或交换重命名

use std::{
  fs::{self, OpenOptions},
  io::ErrorKind,
  os::unix::fs::{FileExt as _, OpenOptionsExt},
  path::Path,
};

use ckv_fmt::{CRC_INIT, FILE_HEAD, FILE_HEAD_KEY, FileHead, add_crc};
use log::{debug, error};
use zerocopy::FromBytes;

use super::Store;
use crate::{Error, Replica, Result};

/// Write the image to the swap file, sync, rename over the primary
/// 写入交换文件，落盘，重命名覆盖主文件
fn swap_commit(swap: &Path, primary: &Path, data: &[u8]) -> Result<()> {
  let file = OpenOptions::new()
    .read(true)
    .write(true)
    .create(true)
    .truncate(true)
    .mode(0o600)
    .custom_flags(libc::O_CLOEXEC)
    .open(swap)?;
  file.write_all_at(data, 0)?;
  file.set_len(data.len() as u64)?;
  file.sync_all()?;
  drop(file);

  fs::rename(swap, primary)?;
  Ok(())
}

impl Store {
  /// Write the in-memory image back to storage
  /// 将内存镜像写回存储
  ///
  /// Recomputes `file_size` and `crc` into the file head first. In swap mode
  /// a successful commit also closes the handle: the lock went down with the
  /// renamed-over inode, and silently re-locking would race other openers.
  /// 先将 `file_size` 与 `crc` 重算进文件头。交换模式下成功提交即关闭句柄：
  /// 锁随被覆盖的 inode 消失，静默重新加锁会与其他打开者竞争。
  pub fn commit(&mut self) -> Result<()> {
    if self.file.is_none() || self.buf.len() < FILE_HEAD {
      return Err(Error::Invalid);
    }

    let size = self.buf.len();
    let crc = add_crc(CRC_INIT, &self.buf[FILE_HEAD..]);
    if let Ok((head, _)) = FileHead::mut_from_prefix(&mut self.buf[..])
      && head.kvp.key.get() == FILE_HEAD_KEY
    {
      head.file_size.set(size as u32);
      head.crc.set(crc);
    }

    match self.replica {
      Replica::None => {
        let Some(file) = self.file.as_ref() else {
          return Err(Error::Invalid);
        };
        file.write_all_at(&self.buf, 0)?;
        file.set_len(size as u64)?;
        file.sync_all()?;
        debug!("committed in place: {} {size}B", self.primary.display());
      }
      Replica::Swap => {
        let Some(swap) = self.swap.clone() else {
          return Err(Error::Invalid);
        };
        let res = swap_commit(&swap, &self.primary, &self.buf);
        if res.is_err() {
          if let Err(e) = fs::remove_file(&swap)
            && e.kind() != ErrorKind::NotFound
          {
            error!("remove swap failed: {}, err={e}", swap.display());
          }
          return res;
        }
        debug!("committed via swap: {} {size}B", self.primary.display());
        self.close();
      }
    }
    Ok(())
  }
}
