pub mod statistics_handler;

pub use statistics_handler::{__path_get_ticket_statistics, get_ticket_statistics};
