/*!
 * Open File Handles
 * Reference-counted open-file sessions shared by descriptor slots
 *
 * An `OpenFile` owns one vnode, its access flags and the current offset.
 * Its refcount counts descriptor slots, across every table, that point at
 * it. Each such slot holds exactly one `FileRef`; `FileRef`s are minted
 * only by `OpenFile::create` (count starts at 1) and `FileRef::retain`,
 * and consumed only by `FileRef::release`, so those three are the sole
 * mutators of the count.
 *
 * Two locks:
 * - `refs` guards the count and is the lock taken under a table lock. It
 *   is never held across vnode I/O.
 * - `io` guards the vnode and the offset, serializing reads, writes and
 *   seeks. It is never taken while a table lock or `refs` is held.
 */

use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::io::SeekFrom;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::table::Slots;
use crate::core::{FdError, FdResult};
use crate::vfs::{FileSystem, Metadata, OpenFlags, VfsError, Vnode};

/// Vnode and position, guarded by the I/O lock
struct IoState {
    vnode: Option<Box<dyn Vnode>>,
    offset: u64,
}

/// One open-file session
pub struct OpenFile {
    path: PathBuf,
    flags: OpenFlags,
    fs: Arc<dyn FileSystem>,
    refs: Mutex<usize>,
    io: Mutex<IoState>,
}

impl OpenFile {
    /// Wrap a freshly opened vnode; the returned reference is the only one
    pub fn create(
        fs: Arc<dyn FileSystem>,
        path: impl Into<PathBuf>,
        vnode: Box<dyn Vnode>,
        flags: OpenFlags,
    ) -> FileRef {
        let file = Arc::new(Self {
            path: path.into(),
            flags,
            fs,
            refs: Mutex::new(1),
            io: Mutex::new(IoState {
                vnode: Some(vnode),
                offset: 0,
            }),
        });
        FileRef { file }
    }

    /// Path the handle was opened with
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Access flags fixed at open time
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// Number of descriptor slots referencing this handle
    pub fn refcount(&self) -> usize {
        *self.refs.lock()
    }

    /// Current shared offset
    pub fn offset(&self) -> u64 {
        self.io.lock().offset
    }

    /// True once the last slot has let go of the handle
    pub fn is_closed(&self) -> bool {
        *self.refs.lock() == 0
    }

    /// Metadata of the underlying object
    pub fn metadata(&self) -> FdResult<Metadata> {
        let io = self.io.lock();
        Ok(self.vnode(&io)?.metadata()?)
    }

    /// Read at the shared offset, advancing it by the bytes read
    pub fn read(&self, buf: &mut [u8]) -> FdResult<usize> {
        if !self.flags.read {
            return Err(VfsError::PermissionDenied(format!(
                "{} not open for reading",
                self.path.display()
            ))
            .into());
        }

        let mut io = self.io.lock();
        let offset = io.offset;
        let count = self.vnode(&io)?.read_at(offset, buf)?;
        io.offset = offset.saturating_add(count as u64);
        Ok(count)
    }

    /// Write at the shared offset (end of file in append mode), advancing it
    pub fn write(&self, data: &[u8]) -> FdResult<usize> {
        if !self.flags.is_writable() {
            return Err(VfsError::PermissionDenied(format!(
                "{} not open for writing",
                self.path.display()
            ))
            .into());
        }

        let mut io = self.io.lock();
        let vnode = self.vnode(&io)?;
        let offset = if self.flags.append {
            vnode.metadata()?.size
        } else {
            io.offset
        };
        let count = vnode.write_at(offset, data)?;
        io.offset = offset.saturating_add(count as u64);
        Ok(count)
    }

    /// Reposition the shared offset
    pub fn seek(&self, pos: SeekFrom) -> FdResult<u64> {
        let mut io = self.io.lock();
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::Current(delta) => io.offset.checked_add_signed(delta),
            SeekFrom::End(delta) => self.vnode(&io)?.metadata()?.size.checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            FdError::InvalidArgument(format!("seek to {:?} leaves valid range", pos))
        })?;
        io.offset = target;
        Ok(target)
    }

    fn vnode<'a>(&self, io: &'a IoState) -> FdResult<&'a dyn Vnode> {
        io.vnode.as_deref().ok_or_else(|| {
            FdError::Vfs(VfsError::IoError(format!(
                "{} is closed",
                self.path.display()
            )))
        })
    }
}

impl fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("OpenFile");
        s.field("path", &self.path).field("flags", &self.flags);
        match self.refs.try_lock() {
            Some(refs) => s.field("refcount", &*refs),
            None => s.field("refcount", &"<locked>"),
        };
        match self.io.try_lock() {
            Some(io) => s.field("offset", &io.offset),
            None => s.field("offset", &"<busy>"),
        };
        s.finish()
    }
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        let refcount = *self.refs.get_mut();
        if let Some(vnode) = self.io.get_mut().vnode.take() {
            warn!(
                path = %self.path.display(),
                refcount,
                "open file dropped while still holding its vnode"
            );
            self.fs.close(vnode);
        }
    }
}

/// A descriptor slot's counted reference to an [`OpenFile`]
///
/// Deliberately not `Clone`: a second slot must go through `retain`.
pub struct FileRef {
    file: Arc<OpenFile>,
}

impl FileRef {
    /// Count one more slot against this handle
    ///
    /// Callable only while a table lock is held, which fixes the lock order
    /// as table before handle.
    pub(super) fn retain(&self, _table: &MutexGuard<'_, Slots>) -> FileRef {
        *self.file.refs.lock() += 1;
        FileRef {
            file: Arc::clone(&self.file),
        }
    }

    /// Drop this slot's count
    ///
    /// The call that takes the count to zero gets [`Release::Last`]; the
    /// vnode is detached and closed by [`Closing`] so that waiting out any
    /// in-flight I/O happens outside every table lock.
    pub fn release(self) -> Release {
        let mut refs = self.file.refs.lock();
        debug_assert!(*refs > 0, "released a handle with no references");
        *refs -= 1;
        if *refs > 0 {
            return Release::Shared { remaining: *refs };
        }
        drop(refs);

        Release::Last(Closing {
            file: Some(self.file),
        })
    }

    /// Release and close immediately; true if this call freed the handle
    pub fn release_now(self) -> bool {
        match self.release() {
            Release::Last(closing) => {
                closing.complete();
                true
            }
            Release::Shared { .. } => false,
        }
    }

    /// The shared handle
    pub fn file(&self) -> &Arc<OpenFile> {
        &self.file
    }
}

impl Deref for FileRef {
    type Target = OpenFile;

    fn deref(&self) -> &OpenFile {
        &self.file
    }
}

impl fmt::Debug for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileRef").field(&self.file).finish()
    }
}

/// Outcome of [`FileRef::release`]
#[must_use = "a final release carries a vnode that must be closed"]
#[derive(Debug)]
pub enum Release {
    /// Other slots still reference the handle
    Shared { remaining: usize },
    /// This was the last reference
    Last(Closing),
}

impl Release {
    pub fn is_last(&self) -> bool {
        matches!(self, Release::Last(_))
    }
}

/// A released handle whose vnode still has to go back to its filesystem
///
/// Closed by [`Closing::complete`], or on drop.
pub struct Closing {
    file: Option<Arc<OpenFile>>,
}

impl Closing {
    pub fn complete(mut self) {
        self.close();
    }

    fn close(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        // Waits for a read or write still running on another thread
        let vnode = file.io.lock().vnode.take();
        if let Some(vnode) = vnode {
            file.fs.close(vnode);
            debug!(path = %file.path.display(), "open file closed");
        }
    }
}

impl Drop for Closing {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Closing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closing")
            .field("path", &self.file.as_ref().map(|file| file.path()))
            .finish()
    }
}
