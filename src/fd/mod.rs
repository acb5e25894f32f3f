/*!
 * File Descriptor Subsystem
 * Open-file handles and per-process descriptor tables
 *
 * Operations exposed to process lifecycle code:
 * - `FdTable::init` at process start
 * - `FdTable::open` / `FdTable::close` for open(2) and close(2)
 * - `FdTable::duplicate` when a process forks
 * - `FdTable::destroy` at process exit
 */

pub mod config;
pub mod handle;
pub mod table;

pub use config::FdConfig;
pub use handle::{Closing, FileRef, OpenFile, Release};
pub use table::{CloseOutcome, FdTable};
