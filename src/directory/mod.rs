//! Organization directory: tenants, memberships, teams.
//!
//! Automation only reads from the directory (organizations to iterate,
//! agent members of a team to rotate through) apart from allocating ticket
//! numbers. Provisioning lives in [`services`] so tests and seed tooling can
//! build realistic fixtures.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
