//! Read-only ticket counts, recomputed on every request
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/tickets/statistics` | Counts per status, category and appointment status |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::StatisticsService;
