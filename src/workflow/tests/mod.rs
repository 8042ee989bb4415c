//! Unit tests for workflow scans.
