//! # taskforge-worker
//!
//! Background maintenance for the identity core: the expiry sweeper
//! that deletes dead sessions and ephemeral tokens, the cron scheduler
//! that drives it, and logging setup for long-running processes.

pub mod scheduler;
pub mod sweeper;
pub mod telemetry;

pub use scheduler::SweepScheduler;
pub use sweeper::{ExpirySweeper, SweepReport};
