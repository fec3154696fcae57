//! Open flags and replica policy
//! 打开标志与副本策略

const WRONLY_BIT: u8 = 0x01;
const RDWR_BIT: u8 = 0x02;
const CREATE_BIT: u8 = 0x04;
const TRUNC_BIT: u8 = 0x08;

/// Open flags, POSIX-shaped; CLOEXEC is always added by open
/// 打开标志（POSIX 风格）；open 总是附加 CLOEXEC
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u8);

impl Flags {
  pub const RDONLY: Self = Self(0);
  pub const WRONLY: Self = Self(WRONLY_BIT);
  pub const RDWR: Self = Self(RDWR_BIT);
  pub const CREATE: Self = Self(CREATE_BIT);
  pub const TRUNC: Self = Self(TRUNC_BIT);

  /// Any write access requested / 是否请求写访问
  #[inline]
  pub const fn writable(self) -> bool {
    self.0 & (WRONLY_BIT | RDWR_BIT) != 0
  }

  /// Write access without read access / 只写不读
  #[inline]
  pub const fn write_only(self) -> bool {
    self.0 & WRONLY_BIT != 0 && self.0 & RDWR_BIT == 0
  }

  /// Caller accepts starting from an empty file / 调用者接受空文件起步
  #[inline]
  pub const fn expects_new(self) -> bool {
    self.0 & (CREATE_BIT | TRUNC_BIT) != 0
  }

  #[inline]
  pub const fn create(self) -> bool {
    self.0 & CREATE_BIT != 0
  }

  #[inline]
  pub const fn trunc(self) -> bool {
    self.0 & TRUNC_BIT != 0
  }
}

impl core::ops::BitOr for Flags {
  type Output = Self;

  #[inline]
  fn bitor(self, rhs: Self) -> Self {
    Self(self.0 | rhs.0)
  }
}

/// Replica policy used by commit / 提交使用的副本策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Replica {
  /// Overwrite in place / 原地覆盖
  #[default]
  None,
  /// Swap file renamed over the primary / 交换文件重命名覆盖主文件
  Swap,
}
