//! Job-run ledger service.

mod job_ledger;

pub use job_ledger::{
    CompleteJobRun, JobRunLedger, LedgerServiceError, LedgerServiceResult, StartJobRun,
};
