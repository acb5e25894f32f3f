/*!
 * VFS Error Types
 * Errors reported by the filesystem collaborator
 *
 * The descriptor layer passes these through unchanged, so each variant
 * maps onto the errno a syscall layer would hand back to user space.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::limits::{EACCES, EEXIST, EFBIG, EINVAL, EIO, EISDIR, ENOENT, ENOSPC};

/// VFS operation result
pub type VfsResult<T> = Result<T, VfsError>;

/// Why a filesystem call failed
///
/// String payloads name the offending path or describe the rejected input.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum VfsError {
    /// No object at the path and the open did not ask to create one
    #[error("Not found: {0}")]
    NotFound(String),

    /// Exclusive create of a path that already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Access mode not permitted by the object or by the open flags
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    /// Path cannot be normalized (for example, empty)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// I/O against a vnode that is gone or failed
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Out of space")]
    OutOfSpace,

    /// Inconsistent open flags
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Write would grow a file past its size limit
    #[error("File too large")]
    FileTooLarge,
}

impl VfsError {
    /// POSIX errno equivalent
    pub fn errno(&self) -> i32 {
        match self {
            VfsError::NotFound(_) => ENOENT,
            VfsError::AlreadyExists(_) => EEXIST,
            VfsError::PermissionDenied(_) => EACCES,
            VfsError::IsADirectory(_) => EISDIR,
            VfsError::InvalidPath(_) | VfsError::InvalidArgument(_) => EINVAL,
            VfsError::IoError(_) => EIO,
            VfsError::OutOfSpace => ENOSPC,
            VfsError::FileTooLarge => EFBIG,
        }
    }
}
