mod error;
mod task;

pub use error::TickError;
pub use task::{
    RecomputeScheduler, SchedulerHandle, ShutdownOutcome, TickOutcome, DEFAULT_BUCKET_THRESHOLD,
    DEFAULT_SHUTDOWN_GRACE,
};
