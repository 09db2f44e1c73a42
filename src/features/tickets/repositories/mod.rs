#[cfg(test)]
mod memory_ticket_repository;
mod pg_ticket_repository;
mod ticket_repository;

#[cfg(test)]
pub use memory_ticket_repository::InMemoryTicketRepository;
pub use pg_ticket_repository::PgTicketRepository;
pub use ticket_repository::{
    AppointmentStatusCount, StatusCategoryCount, TicketFilter, TicketRepository,
};
