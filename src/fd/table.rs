/*!
 * File Descriptor Table
 * Fixed-capacity per-process slot arena with two-level locking
 *
 * Lock order is table lock, then a handle's refcount lock. Vnodes are
 * opened before the table lock is taken and closed after it is dropped;
 * reads and writes never hold a table lock.
 */

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::SeekFrom;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::config::FdConfig;
use super::handle::{Closing, FileRef, OpenFile, Release};
use crate::core::types::{Fd, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use crate::core::{FdError, FdResult};
use crate::vfs::{FileSystem, OpenFlags, OpenMode};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Result of a successful close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseOutcome {
    /// The slot held the last reference; the vnode has been closed
    Closed,
    /// The slot was cleared but other slots still reference the handle
    StillReferenced,
}

/// Slot storage guarded by the table lock
pub(super) struct Slots {
    entries: Vec<Option<FileRef>>,
}

impl Slots {
    /// Allocate `capacity` empty slots, reporting allocation failure
    pub(super) fn with_capacity(capacity: usize) -> FdResult<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity)?;
        entries.resize_with(capacity, || None);
        Ok(Self { entries })
    }

    fn lowest_free(&self) -> Option<Fd> {
        self.entries.iter().position(Option::is_none)
    }

    fn get(&self, fd: Fd) -> Option<&FileRef> {
        self.entries.get(fd).and_then(Option::as_ref)
    }

    fn take(&mut self, fd: Fd) -> Option<FileRef> {
        self.entries.get_mut(fd).and_then(Option::take)
    }

    fn occupied(&self) -> impl Iterator<Item = (Fd, &FileRef)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(fd, slot)| slot.as_ref().map(|file| (fd, file)))
    }

    fn drain(&mut self) -> impl Iterator<Item = (Fd, FileRef)> + '_ {
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(fd, slot)| slot.take().map(|file| (fd, file)))
    }
}

/// Per-process descriptor table
pub struct FdTable {
    id: u64,
    slots: Mutex<Slots>,
    fs: Arc<dyn FileSystem>,
    config: FdConfig,
}

impl FdTable {
    /// Allocate an empty table
    fn empty(fs: Arc<dyn FileSystem>, config: FdConfig) -> FdResult<Self> {
        let slots = Slots::with_capacity(config.capacity)?;
        Ok(Self {
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            slots: Mutex::new(slots),
            fs,
            config,
        })
    }

    /// Create a table with descriptors 0, 1 and 2 bound to the console
    ///
    /// Standard input is read-only; standard output and error are
    /// write-only. On failure nothing opened so far survives.
    pub fn init(fs: Arc<dyn FileSystem>, config: FdConfig) -> FdResult<Self> {
        config.validate()?;
        let table = Self::empty(fs, config)?;

        let standard = [
            (STDIN_FILENO, OpenFlags::read_only()),
            (STDOUT_FILENO, OpenFlags::write_only()),
            (STDERR_FILENO, OpenFlags::write_only()),
        ];
        for (expected, flags) in standard {
            let console = table.config.console_path.clone();
            match table.open(&console, flags, OpenMode::default()) {
                Ok(fd) => debug_assert_eq!(fd, expected),
                Err(err) => {
                    warn!(table = table.id, error = %err, "standard descriptor setup failed");
                    table.destroy();
                    return Err(err);
                }
            }
        }

        debug!(table = table.id, capacity = table.capacity(), "descriptor table initialized");
        Ok(table)
    }

    /// Open `path` and install it at the lowest free descriptor
    pub fn open(&self, path: impl AsRef<Path>, flags: OpenFlags, mode: OpenMode) -> FdResult<Fd> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(FdError::InvalidArgument("empty path".into()));
        }
        if path.to_string_lossy().contains('\0') {
            return Err(FdError::InvalidArgument(format!(
                "path contains NUL: {}",
                path.display()
            )));
        }

        let vnode = self.fs.open(path, flags, mode)?;
        let file = OpenFile::create(Arc::clone(&self.fs), path, vnode, flags);

        let mut slots = self.slots.lock();
        match slots.lowest_free() {
            Some(fd) => {
                slots.entries[fd] = Some(file);
                drop(slots);
                debug!(table = self.id, fd, path = %path.display(), "descriptor opened");
                Ok(fd)
            }
            None => {
                drop(slots);
                warn!(table = self.id, path = %path.display(), "descriptor table full");
                file.release_now();
                Err(FdError::DescriptorTableFull {
                    capacity: self.capacity(),
                })
            }
        }
    }

    /// Clear `fd`, closing the handle if this was its last slot
    pub fn close(&self, fd: Fd) -> FdResult<CloseOutcome> {
        let mut slots = self.slots.lock();
        let file = slots.take(fd).ok_or(FdError::BadDescriptor(fd))?;
        let release = file.release();
        drop(slots);

        match release {
            Release::Last(closing) => {
                closing.complete();
                debug!(table = self.id, fd, "descriptor closed");
                Ok(CloseOutcome::Closed)
            }
            Release::Shared { remaining } => {
                debug!(table = self.id, fd, remaining, "descriptor closed, handle still shared");
                Ok(CloseOutcome::StillReferenced)
            }
        }
    }

    /// Build a table whose slots alias every handle of this one
    ///
    /// The new slot arena is allocated before any count is touched, so an
    /// allocation failure has no side effects. The source lock is held for
    /// the whole copy.
    #[instrument(level = "debug", skip(self), fields(table = self.id))]
    pub fn duplicate(&self) -> FdResult<FdTable> {
        let mut child = Self::empty(Arc::clone(&self.fs), self.config.clone())?;
        let target = child.slots.get_mut();

        let source = self.slots.lock();
        for (fd, file) in source.occupied() {
            target.entries[fd] = Some(file.retain(&source));
        }
        drop(source);

        debug!(child = child.id, descriptors = child.open_count(), "descriptor table duplicated");
        Ok(child)
    }

    /// Close every descriptor and free the table
    pub fn destroy(self) {
        let closed = self.close_all();
        debug!(table = self.id, closed, "descriptor table destroyed");
    }

    /// Release every slot, returning how many handles were freed
    fn close_all(&self) -> usize {
        let mut slots = self.slots.lock();
        let pending: Vec<Closing> = slots
            .drain()
            .filter_map(|(_, file)| match file.release() {
                Release::Last(closing) => Some(closing),
                Release::Shared { .. } => None,
            })
            .collect();
        drop(slots);

        let freed = pending.len();
        pending.into_iter().for_each(Closing::complete);
        freed
    }

    /// Handle behind `fd`
    pub fn get(&self, fd: Fd) -> FdResult<Arc<OpenFile>> {
        self.slots
            .lock()
            .get(fd)
            .map(|file| Arc::clone(file.file()))
            .ok_or(FdError::BadDescriptor(fd))
    }

    /// Read from `fd` at its shared offset
    pub fn read(&self, fd: Fd, buf: &mut [u8]) -> FdResult<usize> {
        self.get(fd)?.read(buf)
    }

    /// Write to `fd` at its shared offset
    pub fn write(&self, fd: Fd, data: &[u8]) -> FdResult<usize> {
        self.get(fd)?.write(data)
    }

    /// Reposition the shared offset of `fd`
    pub fn seek(&self, fd: Fd, pos: SeekFrom) -> FdResult<u64> {
        self.get(fd)?.seek(pos)
    }

    /// Whether `fd` currently holds a handle
    pub fn is_open(&self, fd: Fd) -> bool {
        self.slots.lock().get(fd).is_some()
    }

    /// Occupied descriptors in ascending order
    pub fn descriptors(&self) -> Vec<Fd> {
        self.slots.lock().occupied().map(|(fd, _)| fd).collect()
    }

    /// Number of occupied slots
    pub fn open_count(&self) -> usize {
        self.slots.lock().occupied().count()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn config(&self) -> &FdConfig {
        &self.config
    }

    pub fn filesystem(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Identifier used in log output
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Debug for FdTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FdTable")
            .field("id", &self.id)
            .field("capacity", &self.config.capacity)
            .field("descriptors", &self.descriptors())
            .finish()
    }
}

impl Drop for FdTable {
    fn drop(&mut self) {
        let freed = self.close_all();
        if freed > 0 {
            debug!(table = self.id, freed, "descriptor table dropped with open descriptors");
        }
    }
}
