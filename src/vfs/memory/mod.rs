/*!
 * In-Memory Filesystem Backend
 * Flat, volatile namespace of files plus named console devices
 */

mod file_handle;
mod node;

use ahash::RandomState;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::console::{Console, ConsoleVnode};
use super::traits::{FileSystem, Vnode};
use super::types::*;
use crate::core::limits::{CONSOLE_PATH, MAX_FILE_SIZE};
use file_handle::MemVnode;
use node::Node;

/// In-memory filesystem implementation
///
/// Paths are normalized and looked up in a flat map; directories are not
/// modelled. Device names (such as `con:`) are matched verbatim before any
/// normalization.
#[derive(Debug, Clone)]
pub struct MemFS {
    nodes: Arc<DashMap<PathBuf, Arc<Node>, RandomState>>,
    devices: Arc<DashMap<String, Arc<Console>, RandomState>>,
    max_size: Option<usize>,
    current_size: Arc<AtomicUsize>,
    live_vnodes: Arc<AtomicUsize>,
    close_calls: Arc<AtomicUsize>,
}

impl MemFS {
    /// Create new in-memory filesystem with the console registered at `con:`
    pub fn new() -> Self {
        let fs = Self {
            nodes: Arc::new(DashMap::with_hasher(RandomState::new())),
            devices: Arc::new(DashMap::with_hasher(RandomState::new())),
            max_size: None,
            current_size: Arc::new(AtomicUsize::new(0)),
            live_vnodes: Arc::new(AtomicUsize::new(0)),
            close_calls: Arc::new(AtomicUsize::new(0)),
        };
        fs.register_console(CONSOLE_PATH);
        fs
    }

    /// Create with size limit
    pub fn with_capacity(max_size: usize) -> Self {
        let mut fs = Self::new();
        fs.max_size = Some(max_size);
        fs
    }

    /// Register a console device under `name`, returning it
    ///
    /// Registering an existing name returns the device already there.
    pub fn register_console(&self, name: &str) -> Arc<Console> {
        self.devices
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Console::new()))
            .clone()
    }

    /// The console registered under the default name
    pub fn console(&self) -> Arc<Console> {
        self.register_console(CONSOLE_PATH)
    }

    /// Create a file, or overwrite an existing one in place, with `data`
    ///
    /// Vnodes already open on the file observe the new contents.
    pub fn write_file(&self, path: &Path, data: &[u8]) -> VfsResult<()> {
        if data.len() > MAX_FILE_SIZE {
            return Err(VfsError::FileTooLarge);
        }
        let path = self.normalize(path)?;
        let node = Arc::clone(
            &self
                .nodes
                .entry(path)
                .or_insert_with(|| Arc::new(Node::new(Permissions::default()))),
        );

        let mut contents = node.data.write();
        let old_len = contents.len();
        if data.len() > old_len {
            self.check_and_reserve_space(data.len() - old_len)?;
        } else {
            self.release_space(old_len - data.len());
        }
        contents.clear();
        contents.extend_from_slice(data);
        Ok(())
    }

    /// Read an entire file
    pub fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let path = self.normalize(path)?;
        self.nodes
            .get(&path)
            .map(|node| node.data.read().clone())
            .ok_or_else(|| VfsError::NotFound(path.display().to_string()))
    }

    /// Check if a file exists
    pub fn exists(&self, path: &Path) -> bool {
        self.normalize(path)
            .map(|p| self.nodes.contains_key(&p))
            .unwrap_or(false)
    }

    /// Number of vnodes opened and not yet closed
    pub fn open_vnodes(&self) -> usize {
        self.live_vnodes.load(Ordering::SeqCst)
    }

    /// Number of `close` calls received
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Normalize path (make absolute and clean)
    fn normalize(&self, path: &Path) -> VfsResult<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(VfsError::InvalidPath("empty path".into()));
        }
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new("/").join(path)
        };
        Ok(PathBuf::from(path_clean::clean(&path)))
    }

    /// Reserve `additional` bytes against the size limit
    pub(super) fn check_and_reserve_space(&self, additional: usize) -> VfsResult<()> {
        let max = self.max_size.unwrap_or(usize::MAX);
        self.current_size
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                current.checked_add(additional).filter(|total| *total <= max)
            })
            .map(|_| ())
            .map_err(|_| VfsError::OutOfSpace)
    }

    /// Return space previously reserved
    fn release_space(&self, amount: usize) {
        let _ = self
            .current_size
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_sub(amount))
            });
    }

    fn open_file(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Arc<Node>> {
        let path = self.normalize(path)?;
        if path == Path::new("/") {
            return Err(VfsError::IsADirectory("/".into()));
        }

        let entry = self.nodes.entry(path.clone());
        let node = match entry {
            dashmap::mapref::entry::Entry::Occupied(occupied) => {
                if flags.create_new {
                    return Err(VfsError::AlreadyExists(path.display().to_string()));
                }
                // Mode bits only gate opens of an existing file
                if flags.is_writable() && occupied.get().permissions.is_readonly() {
                    return Err(VfsError::PermissionDenied(path.display().to_string()));
                }
                occupied.get().clone()
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                if !flags.will_create() {
                    return Err(VfsError::NotFound(path.display().to_string()));
                }
                vacant.insert(Arc::new(Node::new(mode.permissions))).clone()
            }
        };

        if flags.truncate {
            let mut data = node.data.write();
            self.release_space(data.len());
            data.clear();
        }

        Ok(node)
    }
}

impl Default for MemFS {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemFS {
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn Vnode>> {
        flags.validate()?;

        let device = path
            .to_str()
            .and_then(|name| self.devices.get(name).map(|d| d.clone()));

        let vnode: Box<dyn Vnode> = match device {
            Some(console) => Box::new(ConsoleVnode::new(console)),
            None => Box::new(MemVnode {
                fs: self.clone(),
                node: self.open_file(path, flags, mode)?,
            }),
        };

        self.live_vnodes.fetch_add(1, Ordering::SeqCst);
        debug!(path = %path.display(), "memfs open");
        Ok(vnode)
    }

    fn close(&self, vnode: Box<dyn Vnode>) {
        drop(vnode);
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.live_vnodes.fetch_sub(1, Ordering::SeqCst);
    }
}
