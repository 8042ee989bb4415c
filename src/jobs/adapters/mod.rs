//! Job queue implementations.

pub mod channel;
pub mod inline;
