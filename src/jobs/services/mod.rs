//! Job scheduling and execution services.

mod runner;
mod scheduler;

pub use runner::{JobError, JobReport, JobRunner, JobRunnerResult};
pub use scheduler::{DEFAULT_DEDUPE_WINDOW_SECS, JobScheduler};
