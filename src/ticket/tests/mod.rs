//! Unit tests for tickets and SLA evaluation.
