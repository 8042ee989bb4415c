//! Unit tests for background jobs.
