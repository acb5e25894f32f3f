/*!
 * Error Types
 * Descriptor-subsystem error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;
use thiserror::Error;

use super::limits::{EBADF, EINVAL, EMFILE, ENOMEM};
use super::types::Fd;
use crate::vfs::VfsError;

/// Result type for descriptor-table and handle operations
pub type FdResult<T> = Result<T, FdError>;

/// File descriptor errors with serialization support
///
/// Errors returned by the underlying filesystem on open are carried
/// unchanged in [`FdError::Vfs`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum FdError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(fd::invalid_argument),
        help("Paths must be non-empty and free of NUL bytes; offsets must stay non-negative.")
    )]
    InvalidArgument(String),

    #[error("Out of memory: {0}")]
    #[diagnostic(
        code(fd::out_of_memory),
        help("The kernel could not allocate descriptor-table storage. Free resources and retry.")
    )]
    OutOfMemory(String),

    #[error("Descriptor table full ({capacity} slots in use)")]
    #[diagnostic(
        code(fd::table_full),
        help("Close unused descriptors or raise KERNEL_FD_CAPACITY.")
    )]
    DescriptorTableFull { capacity: usize },

    #[error("Bad file descriptor: {0}")]
    #[diagnostic(
        code(fd::bad_descriptor),
        help("The descriptor is out of range or not open in this process.")
    )]
    BadDescriptor(Fd),

    #[error(transparent)]
    #[diagnostic(code(fd::vfs))]
    Vfs(#[from] VfsError),
}

impl FdError {
    /// POSIX errno equivalent for syscall return paths
    pub fn errno(&self) -> i32 {
        match self {
            FdError::InvalidArgument(_) => EINVAL,
            FdError::OutOfMemory(_) => ENOMEM,
            FdError::DescriptorTableFull { .. } => EMFILE,
            FdError::BadDescriptor(_) => EBADF,
            FdError::Vfs(err) => err.errno(),
        }
    }
}

impl From<TryReserveError> for FdError {
    fn from(err: TryReserveError) -> Self {
        FdError::OutOfMemory(err.to_string())
    }
}
