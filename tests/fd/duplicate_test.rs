/*!
 * Table Duplication Tests
 * Fork-style sharing of handles between a parent and child table
 */

use fdtable_kernel::{CloseOutcome, FdConfig, FdTable, MemFS, OpenFlags, OpenMode};
use pretty_assertions::assert_eq;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;

fn setup() -> (MemFS, FdTable) {
    let fs = MemFS::new();
    fs.write_file(Path::new("data.txt"), b"abcdefghij").unwrap();
    let table = FdTable::init(Arc::new(fs.clone()), FdConfig::default()).unwrap();
    (fs, table)
}

#[test]
fn test_fork_close_scenario() {
    let (fs, parent) = setup();

    let fd = parent
        .open("data.txt", OpenFlags::read_only(), OpenMode::default())
        .unwrap();
    assert_eq!(fd, 3);

    let child = parent.duplicate().unwrap();
    let handle = parent.get(3).unwrap();
    assert!(Arc::ptr_eq(&handle, &child.get(3).unwrap()));
    assert_eq!(handle.refcount(), 2);

    assert_eq!(parent.close(3).unwrap(), CloseOutcome::StillReferenced);
    assert_eq!(handle.refcount(), 1);
    assert!(!handle.is_closed());
    assert_eq!(fs.open_vnodes(), 4);

    assert_eq!(child.close(3).unwrap(), CloseOutcome::Closed);
    assert_eq!(handle.refcount(), 0);
    assert!(handle.is_closed());
    assert_eq!(fs.open_vnodes(), 3);
}

#[test]
fn test_child_closes_first() {
    let (fs, parent) = setup();
    let fd = parent
        .open("data.txt", OpenFlags::read_only(), OpenMode::default())
        .unwrap();
    let child = parent.duplicate().unwrap();
    let closes_before = fs.close_calls();

    assert_eq!(child.close(fd).unwrap(), CloseOutcome::StillReferenced);
    assert_eq!(fs.close_calls(), closes_before);
    assert_eq!(parent.close(fd).unwrap(), CloseOutcome::Closed);
    assert_eq!(fs.close_calls(), closes_before + 1);
}

#[test]
fn test_duplicate_copies_layout_with_holes() {
    let (_fs, parent) = setup();
    for _ in 0..4 {
        parent
            .open("data.txt", OpenFlags::read_only(), OpenMode::default())
            .unwrap();
    }
    parent.close(4).unwrap();
    parent.close(1).unwrap();

    let child = parent.duplicate().unwrap();
    assert_eq!(child.descriptors(), vec![0, 2, 3, 5, 6]);
    assert_eq!(child.capacity(), parent.capacity());
    for fd in child.descriptors() {
        assert_eq!(parent.get(fd).unwrap().refcount(), 2);
    }

    // Tables evolve independently afterwards
    let next = child
        .open("data.txt", OpenFlags::read_only(), OpenMode::default())
        .unwrap();
    assert_eq!(next, 1);
    assert!(!parent.is_open(1));
}

#[test]
fn test_offset_is_shared_after_fork() {
    let (_fs, parent) = setup();
    let fd = parent
        .open("data.txt", OpenFlags::read_only(), OpenMode::default())
        .unwrap();
    let child = parent.duplicate().unwrap();

    let mut buf = [0u8; 3];
    child.read(fd, &mut buf).unwrap();
    assert_eq!(&buf, b"abc");

    parent.read(fd, &mut buf).unwrap();
    assert_eq!(&buf, b"def");

    child.seek(fd, SeekFrom::End(-1)).unwrap();
    assert_eq!(parent.get(fd).unwrap().offset(), 9);
}

#[test]
fn test_grandchild_counts_accumulate() {
    let (fs, parent) = setup();
    let child = parent.duplicate().unwrap();
    let grandchild = child.duplicate().unwrap();

    let stdout = parent.get(1).unwrap();
    assert_eq!(stdout.refcount(), 3);

    parent.destroy();
    assert_eq!(stdout.refcount(), 2);
    grandchild.destroy();
    assert_eq!(stdout.refcount(), 1);
    assert_eq!(fs.open_vnodes(), 3);

    child.destroy();
    assert!(stdout.is_closed());
    assert_eq!(fs.open_vnodes(), 0);
    assert_eq!(fs.close_calls(), 3);
}

#[test]
fn test_destroy_parent_keeps_child_usable() {
    let (fs, parent) = setup();
    let fd = parent
        .open("data.txt", OpenFlags::read_only(), OpenMode::default())
        .unwrap();
    let child = parent.duplicate().unwrap();
    parent.destroy();

    let mut buf = [0u8; 10];
    assert_eq!(child.read(fd, &mut buf).unwrap(), 10);
    child.write(1, b"still here").unwrap();
    assert_eq!(fs.console().output(), b"still here");
}
