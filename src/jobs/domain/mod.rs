//! Job requests and idempotency keys.

mod error;
mod request;

pub use error::ParseJobKindError;
pub use request::{EnqueueOutcome, JobKey, JobKind, JobRequest, QueuedJob};
