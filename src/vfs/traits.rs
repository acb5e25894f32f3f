/*!
 * VFS Traits
 * Contract between the descriptor subsystem and the filesystem layer
 */

use std::path::Path;

use super::types::*;

/// Filesystem collaborator
///
/// The descriptor subsystem only ever asks a filesystem to open a named
/// object and, later, to close it again. Every vnode returned by `open`
/// is handed back to `close` exactly once.
pub trait FileSystem: Send + Sync {
    /// Open the object named by `path`
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn Vnode>>;

    /// Release a vnode previously returned by `open`
    fn close(&self, vnode: Box<dyn Vnode>);
}

/// An opened filesystem object
///
/// Vnodes are positionless: the caller supplies the offset on every
/// access, so a single vnode can back a shared file position.
pub trait Vnode: Send + Sync {
    /// Read into `buf` starting at `offset`, returning bytes read (0 at end)
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> VfsResult<usize>;

    /// Write `data` at `offset`, returning bytes written
    fn write_at(&self, offset: u64, data: &[u8]) -> VfsResult<usize>;

    /// Current metadata
    fn metadata(&self) -> VfsResult<Metadata>;
}
