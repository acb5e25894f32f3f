/*!
 * Virtual File System Module
 * Filesystem collaborator used by the descriptor subsystem
 */

pub mod console;
pub mod memory;
pub mod traits;
pub mod types;

// Re-exports
pub use console::Console;
pub use memory::MemFS;
pub use traits::{FileSystem, Vnode};
pub use types::{FileType, Metadata, OpenFlags, OpenMode, Permissions, VfsError, VfsResult};
