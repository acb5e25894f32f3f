/*!
 * MemFS Tests
 * Vnode lifecycle and file semantics of the in-memory filesystem
 */

use std::path::Path;

use fdtable_kernel::core::limits::MAX_FILE_SIZE;
use fdtable_kernel::vfs::memory::MemFS;
use fdtable_kernel::vfs::traits::FileSystem;
use fdtable_kernel::vfs::types::{OpenFlags, OpenMode, VfsError};

#[test]
fn test_memfs_basic() {
    let fs = MemFS::new();

    fs.write_file(Path::new("/test.txt"), b"hello").unwrap();
    assert_eq!(fs.read_file(Path::new("/test.txt")).unwrap(), b"hello");

    assert!(fs.exists(Path::new("/test.txt")));
    assert!(!fs.exists(Path::new("/missing.txt")));
}

#[test]
fn test_vnode_counters() {
    let fs = MemFS::new();
    fs.write_file(Path::new("/a"), b"").unwrap();

    let first = fs
        .open(Path::new("/a"), OpenFlags::read_only(), OpenMode::default())
        .unwrap();
    let second = fs
        .open(Path::new("/a"), OpenFlags::read_only(), OpenMode::default())
        .unwrap();
    assert_eq!(fs.open_vnodes(), 2);

    fs.close(first);
    assert_eq!(fs.open_vnodes(), 1);
    fs.close(second);
    assert_eq!(fs.open_vnodes(), 0);
    assert_eq!(fs.close_calls(), 2);
}

#[test]
fn test_vnodes_share_contents() {
    let fs = MemFS::new();
    let writer = fs
        .open(Path::new("/shared"), OpenFlags::create(), OpenMode::default())
        .unwrap();
    let reader = fs
        .open(Path::new("/shared"), OpenFlags::read_only(), OpenMode::default())
        .unwrap();

    writer.write_at(0, b"hello").unwrap();
    writer.write_at(3, b"p!").unwrap();

    let mut buf = [0u8; 8];
    let n = reader.read_at(0, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"help!");
    assert_eq!(reader.read_at(10, &mut buf).unwrap(), 0);
    assert_eq!(reader.metadata().unwrap().size, 5);

    fs.close(writer);
    fs.close(reader);
}

#[test]
fn test_create_new_rejects_existing() {
    let fs = MemFS::new();
    fs.write_file(Path::new("/x"), b"1").unwrap();

    let mut flags = OpenFlags::create();
    flags.create_new = true;
    assert!(matches!(
        fs.open(Path::new("/x"), flags, OpenMode::default()),
        Err(VfsError::AlreadyExists(_))
    ));
    assert_eq!(fs.open_vnodes(), 0);
}

#[test]
fn test_truncate_clears_contents() {
    let fs = MemFS::new();
    fs.write_file(Path::new("/t"), b"old contents").unwrap();

    let mut flags = OpenFlags::write_only();
    flags.truncate = true;
    let vnode = fs.open(Path::new("/t"), flags, OpenMode::default()).unwrap();
    assert_eq!(vnode.metadata().unwrap().size, 0);
    fs.close(vnode);
}

#[test]
fn test_readonly_mode_blocks_writers() {
    let fs = MemFS::new();
    let vnode = fs
        .open(Path::new("/ro"), OpenFlags::create(), OpenMode::new(0o444))
        .unwrap();
    fs.close(vnode);

    assert!(matches!(
        fs.open(Path::new("/ro"), OpenFlags::read_write(), OpenMode::default()),
        Err(VfsError::PermissionDenied(_))
    ));
    let reader = fs
        .open(Path::new("/ro"), OpenFlags::read_only(), OpenMode::default())
        .unwrap();
    fs.close(reader);
}

#[test]
fn test_flags_without_access_rejected() {
    let fs = MemFS::new();
    let flags = OpenFlags::default();
    assert!(matches!(
        fs.open(Path::new("/any"), flags, OpenMode::default()),
        Err(VfsError::InvalidArgument(_))
    ));
}

#[test]
fn test_capacity_limit() {
    let fs = MemFS::with_capacity(10);

    fs.write_file(Path::new("/small.txt"), b"hello").unwrap();
    assert!(matches!(
        fs.write_file(Path::new("/large.txt"), b"hello world"),
        Err(VfsError::OutOfSpace)
    ));
}

#[test]
fn test_far_writes_are_file_too_large() {
    let fs = MemFS::new();
    let vnode = fs
        .open(Path::new("/sparse"), OpenFlags::create(), OpenMode::default())
        .unwrap();

    assert_eq!(vnode.write_at(u64::MAX - 1, b"x"), Err(VfsError::FileTooLarge));
    assert_eq!(
        vnode.write_at(MAX_FILE_SIZE as u64, b"x"),
        Err(VfsError::FileTooLarge)
    );
    assert_eq!(vnode.metadata().unwrap().size, 0);

    // Nearby sparse writes zero-fill the gap
    assert_eq!(vnode.write_at(4, b"ok").unwrap(), 2);
    assert_eq!(fs.read_file(Path::new("/sparse")).unwrap(), b"\0\0\0\0ok");
    fs.close(vnode);
}

#[test]
fn test_write_file_updates_open_vnodes() {
    let fs = MemFS::with_capacity(10);
    fs.write_file(Path::new("/f"), b"12345").unwrap();
    let vnode = fs
        .open(Path::new("/f"), OpenFlags::read_write(), OpenMode::default())
        .unwrap();

    fs.write_file(Path::new("/f"), b"").unwrap();
    assert_eq!(vnode.metadata().unwrap().size, 0);

    assert_eq!(vnode.write_at(0, b"0123456789").unwrap(), 10);
    assert_eq!(fs.read_file(Path::new("/f")).unwrap(), b"0123456789");
    assert!(matches!(
        fs.write_file(Path::new("/g"), b"x"),
        Err(VfsError::OutOfSpace)
    ));
    fs.close(vnode);
}
