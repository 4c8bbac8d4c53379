//! Periodic shipping of the buffered log queue
//!
//! - [`FlushWorker`] runs one move/drain/upload/confirm-or-rollback cycle
//! - [`FlushScheduler`] runs the worker on a fixed interval in a background
//!   task, one cycle at a time, until shutdown

pub mod scheduler;
pub mod worker;

pub use scheduler::FlushScheduler;
pub use worker::{FlushOutcome, FlushPolicy, FlushState, FlushWorker};
