/*!
 * VFS Open Flags and Mode
 * Access flags fixed at open time, and creation mode
 */

use super::errors::VfsError;
use super::permissions::Permissions;
use crate::core::serde::{is_default, is_false};
use serde::{Deserialize, Serialize};

/// Open for reading only
pub const O_RDONLY: u32 = 0o0;
/// Open for writing only
pub const O_WRONLY: u32 = 0o1;
/// Open for reading and writing
pub const O_RDWR: u32 = 0o2;
/// Mask for the access-mode bits
pub const O_ACCMODE: u32 = 0o3;
/// Create the file if it does not exist
pub const O_CREAT: u32 = 0o100;
/// With O_CREAT, fail if the file exists
pub const O_EXCL: u32 = 0o200;
/// Truncate to zero length on open
pub const O_TRUNC: u32 = 0o1000;
/// Every write goes to end of file
pub const O_APPEND: u32 = 0o2000;

/// File open flags (skips false values when serialized)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct OpenFlags {
    #[serde(skip_serializing_if = "is_false")]
    pub read: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub write: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub append: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub truncate: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub create: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub create_new: bool,
}

impl OpenFlags {
    /// Read-only access
    #[inline]
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Default::default()
        }
    }

    /// Write-only access
    #[inline]
    #[must_use]
    pub fn write_only() -> Self {
        Self {
            write: true,
            ..Default::default()
        }
    }

    /// Read-write access
    #[inline]
    #[must_use]
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            ..Default::default()
        }
    }

    /// Write access, creating the file if needed
    #[inline]
    #[must_use]
    pub fn create() -> Self {
        Self {
            write: true,
            create: true,
            ..Default::default()
        }
    }

    /// Write access positioned at end of file for every write
    #[inline]
    #[must_use]
    pub fn append_only() -> Self {
        Self {
            write: true,
            append: true,
            ..Default::default()
        }
    }

    /// Check if any write operation is possible
    #[inline]
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.write || self.append
    }

    /// Check if this open may create a file
    #[inline]
    #[must_use]
    pub const fn will_create(&self) -> bool {
        self.create || self.create_new
    }

    /// Convert from POSIX open(2) flags
    pub fn from_posix(flags: u32) -> Self {
        let access_mode = flags & O_ACCMODE;
        let create = flags & O_CREAT != 0;
        Self {
            read: access_mode == O_RDONLY || access_mode == O_RDWR,
            write: access_mode == O_WRONLY || access_mode == O_RDWR,
            append: flags & O_APPEND != 0,
            truncate: flags & O_TRUNC != 0,
            create,
            create_new: create && flags & O_EXCL != 0,
        }
    }

    /// Validate flag combinations
    #[must_use = "validation result must be checked"]
    pub fn validate(&self) -> Result<(), VfsError> {
        if !self.read && !self.is_writable() {
            return Err(VfsError::InvalidArgument(
                "open requires read or write access".into(),
            ));
        }
        if self.create_new && !self.is_writable() {
            return Err(VfsError::InvalidArgument(
                "exclusive create requires write access".into(),
            ));
        }
        if self.truncate && !self.is_writable() {
            return Err(VfsError::InvalidArgument(
                "truncate requires write access".into(),
            ));
        }
        Ok(())
    }
}

/// File open mode (permissions for newly created files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenMode {
    #[serde(skip_serializing_if = "is_default", default)]
    pub permissions: Permissions,
}

impl OpenMode {
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            permissions: Permissions::new(mode),
        }
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        Self {
            permissions: Permissions::readwrite(),
        }
    }
}
