//! Rule-based auto-assignment with round-robin rotation.
//!
//! Rule selection and agent picking are pure functions in [`domain`]. The
//! [`services::AutoAssignResolver`] runs them inside one
//! [`ports::AssignmentStore`] unit of work so the rule cursor and the ticket
//! assignment commit together.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
