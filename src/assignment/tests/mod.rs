//! Unit tests for auto-assignment.
