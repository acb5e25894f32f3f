/*!
 * Process Module
 * Process-level entry points into the descriptor subsystem
 */

pub mod lifecycle;

pub use lifecycle::Process;
