mod lifecycle;
mod ticket_service;
mod ticket_store;
mod validators;

pub use lifecycle::TicketLifecycle;
pub use ticket_service::TicketService;
pub use ticket_store::TicketStore;
pub use validators::CategoryValidators;
