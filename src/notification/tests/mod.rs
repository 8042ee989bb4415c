//! Unit tests for notifications and the email outbox.

mod flush_tests;
