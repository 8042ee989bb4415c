//! In-app notifications, the audit trail, and the email outbox.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
