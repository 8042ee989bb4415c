//! Unit tests for run records and the job-run ledger.
