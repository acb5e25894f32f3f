/*!
 * Process Lifecycle Management
 * Descriptor-table setup, duplication and teardown across a process's life
 */

pub mod lifecycle;

pub use lifecycle::Process;
