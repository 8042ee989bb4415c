//! Unit tests for the organization directory.
