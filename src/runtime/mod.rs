//! Async runtime glue: the periodic tick driver and the live game session

pub mod scheduler;
pub mod session;

pub use scheduler::{SchedulerError, TickScheduler};
pub use session::{GameSession, StateChanges};
