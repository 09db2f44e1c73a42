//! Tickets: one base record plus exactly one category extension.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/tickets` | Create a ticket of any category |
//! | GET | `/api/tickets` | List with `category`, `status`, `page`, `page_size` |
//! | GET | `/api/tickets/{id}` | Get by id |
//! | GET | `/api/tickets/number/{ticket_number}` | Get by ticket number |
//! | PUT | `/api/tickets/{id}` | Update editable fields |
//! | PATCH | `/api/tickets/{id}/status` | Lifecycle transition |
//! | POST | `/api/tickets/{id}/documents` | Attach a blotter supporting document |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use repositories::PgTicketRepository;
pub use services::{TicketService, TicketStore};
