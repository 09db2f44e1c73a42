//! Lookup into the external resident directory, used to fill `resident_id`
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/residents/resolve?q=` | Resolve a search term to a resident id |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::{HttpResidentDirectory, ResidentDirectory};
