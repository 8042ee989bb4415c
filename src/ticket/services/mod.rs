//! Ticket intake services.

mod intake;

pub use intake::{OpenTicketRequest, TicketIntakeError, TicketIntakeResult, TicketIntakeService};
