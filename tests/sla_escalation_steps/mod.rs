//! Step definitions for SLA escalation scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
