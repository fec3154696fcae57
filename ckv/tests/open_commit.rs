//! Open/commit lifecycle tests
//! 打开/提交生命周期测试

use std::fs;

use aok::{OK, Void};
use ckv::{Error, Flags, Replica, Store};
use ckv::fmt::{CRC_INIT, FILE_HEAD, add_crc, validate};
use log::info;
use tempfile::tempdir;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

const ANY_MAX: usize = 8 * 1024;

#[test]
fn create_commit_empty() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("s");

  let mut sto = Store::new();
  sto.open(&path, ANY_MAX, Flags::RDWR | Flags::CREATE, Replica::None)?;

  // Nothing hits the disk before commit
  // 提交前不落盘
  assert_eq!(fs::metadata(&path)?.len(), 0);

  sto.commit()?;
  let bytes = fs::read(&path)?;
  assert_eq!(
    bytes,
    [0xFB, 0xFF, 0x0E, 0x00, 0xC6, 0x00, 0x0E, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
  );
  assert_eq!(validate(&bytes), FILE_HEAD);
  OK
}

#[test]
fn commit_one_record_and_reopen() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("s");

  const ANY_KEY: u16 = 189;
  const ANY_DATA: [u8; 9] = [0x94, 0xa9, 0xbe, 0xb0, 0x57, 0xe7, 0x71, 0xee, 0x1e];

  let mut sto = Store::new();
  sto.open(&path, ANY_MAX, Flags::RDWR | Flags::CREATE, Replica::None)?;
  let end = sto.end();
  let it = sto.insert(end, ANY_KEY, ANY_DATA.len())?;
  sto.write_value(it, 0, &ANY_DATA)?;
  sto.commit()?;
  drop(sto);

  // 14-byte head + 4-byte record head + 9-byte value
  // 14 字节文件头 + 4 字节记录头 + 9 字节值
  let bytes = fs::read(&path)?;
  assert_eq!(bytes.len(), 27);

  let mut body = vec![0xBD, 0x00, 0x0D, 0x00];
  body.extend_from_slice(&ANY_DATA);
  let mut expect = vec![0xFB, 0xFF, 0x0E, 0x00, 0xC6, 0x00, 0x1B, 0x00, 0x00, 0x00];
  expect.extend_from_slice(&add_crc(CRC_INIT, &body).to_le_bytes());
  expect.extend_from_slice(&body);
  assert_eq!(bytes, expect);

  let mut back = Store::new();
  back.open(&path, ANY_MAX, Flags::RDONLY, Replica::None)?;
  let it = back.try_get(ANY_KEY).expect("record survived");
  assert_eq!(back.kvp(it).unwrap().size.get(), 13);
  assert_eq!(back.value(it), ANY_DATA);
  OK
}

#[test]
fn open_empty_without_create_flags() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("empty");
  fs::File::create(&path)?;

  let mut sto = Store::new();
  assert!(matches!(
    sto.open(&path, ANY_MAX, Flags::RDWR, Replica::None),
    Err(Error::NotFound)
  ));
  assert!(!sto.is_open());
  OK
}

#[test]
fn open_missing_file_passes_io_error() -> Void {
  let dir = tempdir()?;
  let mut sto = Store::new();
  assert!(matches!(
    sto.open(dir.path().join("gone"), ANY_MAX, Flags::RDWR, Replica::None),
    Err(Error::Io(_))
  ));
  OK
}

#[test]
fn open_short_file_is_range() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("short");
  fs::write(&path, [0xFB, 0xFF, 0x0E, 0x00, 0xC6, 0x00, 0x0E])?;

  let mut sto = Store::new();
  assert!(matches!(
    sto.open(&path, ANY_MAX, Flags::RDWR, Replica::None),
    Err(Error::Range)
  ));
  OK
}

#[test]
fn open_twice_is_already() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("s");

  let mut sto = Store::new();
  sto.open(&path, ANY_MAX, Flags::RDWR | Flags::CREATE, Replica::None)?;
  assert!(matches!(
    sto.open(&path, ANY_MAX, Flags::RDWR | Flags::CREATE, Replica::None),
    Err(Error::Already)
  ));

  // Close makes the handle reusable
  // 关闭后句柄可复用
  sto.close();
  sto.open(&path, ANY_MAX, Flags::RDWR | Flags::CREATE, Replica::None)?;
  assert!(sto.is_open());
  OK
}

#[test]
fn open_rejects_any_content_flip() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("s");

  let mut sto = Store::new();
  sto.open(&path, ANY_MAX, Flags::RDWR | Flags::CREATE, Replica::None)?;
  let end = sto.end();
  let it = sto.insert(end, 7, 4)?;
  sto.write_value(it, 0, b"good")?;
  sto.commit()?;
  drop(sto);

  let good = fs::read(&path)?;
  for i in [4, 5, FILE_HEAD, good.len() - 1] {
    let mut bad = good.clone();
    bad[i] ^= 0x01;
    fs::write(&path, &bad)?;

    let mut sto = Store::new();
    assert!(
      matches!(
        sto.open(&path, ANY_MAX, Flags::RDONLY, Replica::None),
        Err(Error::Corrupt)
      ),
      "flip at {i} accepted"
    );
  }
  OK
}

#[test]
fn crash_tail_reconciled_for_writers_only() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("s");

  let mut sto = Store::new();
  sto.open(&path, ANY_MAX, Flags::RDWR | Flags::CREATE, Replica::None)?;
  let end = sto.end();
  sto.insert(end, 1, 5)?;
  sto.commit()?;
  let valid = sto.end();
  drop(sto);

  // Simulate a writer that died after writing extra bytes
  // 模拟写入后崩溃留下的多余字节
  let mut bytes = fs::read(&path)?;
  bytes.extend_from_slice(&[0xEE; 5]);
  fs::write(&path, &bytes)?;

  // Readers must not repair the file
  // 读者不得修复文件
  {
    let mut sto = Store::new();
    sto.open(&path, ANY_MAX, Flags::RDONLY, Replica::None)?;
    assert_eq!(sto.end(), valid);
    assert_eq!(fs::metadata(&path)?.len() as usize, valid + 5);
  }

  // A writer truncates the stale tail
  // 写者截断陈旧尾部
  let mut sto = Store::new();
  sto.open(&path, ANY_MAX, Flags::RDWR, Replica::None)?;
  assert_eq!(sto.end(), valid);
  assert_eq!(fs::metadata(&path)?.len() as usize, valid);
  info!("reconciled to {valid}B");
  OK
}

#[test]
fn commit_close_open_is_identical() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("s");

  let mut sto = Store::new();
  sto.open(&path, ANY_MAX, Flags::RDWR | Flags::CREATE, Replica::None)?;
  for (key, val) in [(1u16, &b"one"[..]), (2, b"two"), (9, b"nine")] {
    sto.put_unique(key, Some(val), val.len())?;
  }
  sto.commit()?;
  let img = sto.as_bytes().to_vec();
  drop(sto);

  let mut back = Store::new();
  back.open(&path, ANY_MAX, Flags::RDONLY, Replica::None)?;
  assert_eq!(back.as_bytes(), img);
  OK
}

#[test]
fn writer_excludes_readers_share() -> Void {
  let dir = tempdir()?;
  let path = dir.path().join("s");

  {
    let mut sto = Store::new();
    sto.open(&path, ANY_MAX, Flags::RDWR | Flags::CREATE, Replica::None)?;
    sto.commit()?;
  }

  // Two readers coexist
  // 两个读者可共存
  let mut r1 = Store::new();
  r1.open(&path, ANY_MAX, Flags::RDONLY, Replica::None)?;
  let mut r2 = Store::new();
  r2.open(&path, ANY_MAX, Flags::RDONLY, Replica::None)?;

  let mut w = Store::new();
  assert!(matches!(
    w.open(&path, ANY_MAX, Flags::RDWR, Replica::None),
    Err(Error::Locked)
  ));

  drop(r1);
  drop(r2);
  w.open(&path, ANY_MAX, Flags::RDWR, Replica::None)?;

  let mut r3 = Store::new();
  assert!(matches!(
    r3.open(&path, ANY_MAX, Flags::RDONLY, Replica::None),
    Err(Error::Locked)
  ));
  OK
}

#[test]
fn commit_on_closed_handle() -> Void {
  let mut sto = Store::new();
  assert!(matches!(sto.commit(), Err(Error::Invalid)));
  OK
}

#[test]
fn tiny_budget_leaves_no_space() -> Void {
  let dir = tempdir()?;
  let mut sto = Store::new();
  assert!(matches!(
    sto.open(
      dir.path().join("s"),
      32,
      Flags::RDWR | Flags::CREATE,
      Replica::None
    ),
    Err(Error::NoSpace)
  ));
  OK
}
