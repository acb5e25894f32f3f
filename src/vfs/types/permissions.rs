/*!
 * VFS Permissions
 * Unix-style file permissions
 */

use serde::{Deserialize, Serialize};

/// File permissions (Unix-style)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    pub mode: u32,
}

impl Permissions {
    /// Create permissions, masking to valid bits
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            mode: mode & 0o7777,
        }
    }

    /// Read-write permissions (0o644)
    #[inline]
    #[must_use]
    pub const fn readwrite() -> Self {
        Self { mode: 0o644 }
    }

    /// Check if permissions are read-only (no owner write bit)
    #[inline(always)]
    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.mode & 0o200 == 0
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::readwrite()
    }
}
