//! Workflow automation for the service desk.
//!
//! The orchestrator scans an organization's active tickets, auto-assigns
//! unassigned ones, refreshes SLA flags, and escalates each newly crossed
//! threshold exactly once. Every scan is recorded as a workflow run. The
//! SLA-only scan performs the flag refresh and escalations without
//! assignment.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
