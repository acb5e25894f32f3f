/*!
 * System Limits and Constants
 *
 * Centralized location for descriptor-table limits and well-known names.
 * [LINUX-COMPAT] marks values chosen to match conventional Unix numbers.
 */

// =============================================================================
// FILE DESCRIPTOR LIMITS
// =============================================================================

/// Default per-process descriptor table capacity
pub const OPEN_MAX: usize = 128;

/// Number of descriptors pre-populated at table creation (stdin, stdout, stderr)
pub const STANDARD_DESCRIPTORS: usize = 3;

/// Smallest capacity a table may be configured with
pub const MIN_TABLE_CAPACITY: usize = STANDARD_DESCRIPTORS;

/// Largest capacity a table may be configured with
pub const MAX_TABLE_CAPACITY: usize = 64 * 1024;

// =============================================================================
// DEVICES
// =============================================================================

/// Well-known name of the console device bound to descriptors 0, 1 and 2
pub const CONSOLE_PATH: &str = "con:";

// =============================================================================
// IN-MEMORY FILESYSTEM
// =============================================================================

/// Largest size a single in-memory file may grow to (1 GiB)
pub const MAX_FILE_SIZE: usize = 1 << 30;

// =============================================================================
// ERRNO VALUES [LINUX-COMPAT]
// =============================================================================

pub const ENOENT: i32 = 2;
pub const EIO: i32 = 5;
pub const EBADF: i32 = 9;
pub const ENOMEM: i32 = 12;
pub const EACCES: i32 = 13;
pub const EEXIST: i32 = 17;
pub const EISDIR: i32 = 21;
pub const EINVAL: i32 = 22;
pub const EMFILE: i32 = 24;
pub const EFBIG: i32 = 27;
pub const ENOSPC: i32 = 28;
