/*!
 * Process Lifecycle Hooks
 *
 * Ties a process's descriptor table to its lifetime: spawn creates the
 * table with the standard descriptors, fork duplicates it, exit destroys
 * it. Pid allocation, scheduling and wait/kill belong to callers.
 */

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::core::types::{Fd, Pid};
use crate::core::FdResult;
use crate::fd::{FdConfig, FdTable};
use crate::vfs::{FileSystem, OpenFlags, OpenMode};

/// A process as seen by the descriptor subsystem
#[derive(Debug)]
pub struct Process {
    pid: Pid,
    parent: Option<Pid>,
    files: FdTable,
}

impl Process {
    /// Start a process with a fresh table bound to the console
    pub fn spawn(pid: Pid, fs: Arc<dyn FileSystem>, config: FdConfig) -> FdResult<Self> {
        let files = FdTable::init(fs, config)?;
        info!(pid, table = files.id(), "process spawned");
        Ok(Self {
            pid,
            parent: None,
            files,
        })
    }

    /// Duplicate this process; the child shares every open file
    pub fn fork(&self, child_pid: Pid) -> FdResult<Process> {
        let files = self.files.duplicate()?;
        info!(
            pid = self.pid,
            child = child_pid,
            descriptors = files.open_count(),
            "process forked"
        );
        Ok(Self {
            pid: child_pid,
            parent: Some(self.pid),
            files,
        })
    }

    /// open(2): POSIX flag bits and a creation mode, lowest free descriptor
    pub fn open(&self, path: impl AsRef<Path>, flags: u32, mode: u32) -> FdResult<Fd> {
        self.files
            .open(path, OpenFlags::from_posix(flags), OpenMode::new(mode))
    }

    /// Tear the process down, closing every descriptor
    pub fn exit(self) {
        info!(pid = self.pid, "process exiting");
        self.files.destroy();
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn parent(&self) -> Option<Pid> {
        self.parent
    }

    pub fn files(&self) -> &FdTable {
        &self.files
    }
}
