//! Adapter implementations of the auto-assignment ports.

pub mod memory;
pub mod postgres;
