/*!
 * File Descriptor Kernel Library
 * Per-process open-file handles and descriptor tables shared across fork
 */

pub mod core;
pub mod fd;
pub mod monitoring;
pub mod process;
pub mod vfs;

// Re-exports
pub use crate::core::{Fd, FdError, FdResult, Pid};
pub use fd::{CloseOutcome, FdConfig, FdTable, FileRef, OpenFile, Release};
pub use monitoring::init_tracing;
pub use process::Process;
pub use vfs::{Console, FileSystem, MemFS, OpenFlags, OpenMode, VfsError, Vnode};
