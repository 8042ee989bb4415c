//! Workflow and job run records.
//!
//! Every orchestrator pass and background job leaves a run record that is
//! created before work starts and finished exactly once.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
