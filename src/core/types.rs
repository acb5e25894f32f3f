/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
pub type Pid = u32;

/// File descriptor type
///
/// Index into a process's descriptor table.
pub type Fd = usize;

/// Standard input descriptor
pub const STDIN_FILENO: Fd = 0;

/// Standard output descriptor
pub const STDOUT_FILENO: Fd = 1;

/// Standard error descriptor
pub const STDERR_FILENO: Fd = 2;
