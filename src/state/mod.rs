//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskState`: Tracks one crawl task from claim to its terminal outcome
//! - `SupervisorState`: Tracks the run as a whole (idle, running, stopping, drained)

mod supervisor_state;
mod task_state;

// Re-export main types
pub use supervisor_state::SupervisorState;
pub use task_state::TaskState;
