//! Appointment booking over the shared schedule index.
//!
//! Booking itself happens through `POST /api/tickets` with an APPOINTMENT
//! envelope; these endpoints cover availability and the appointment lifecycle.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/appointments/slots` | Free slots for a department and day |
//! | POST | `/api/appointments/{id}/confirm` | PENDING → CONFIRMED |
//! | POST | `/api/appointments/{id}/cancel` | Cancel and free the slot |
//! | POST | `/api/appointments/{id}/reschedule` | Move to another free slot |
//! | POST | `/api/appointments/{id}/complete` | CONFIRMED → COMPLETED |
//! | POST | `/api/appointments/{id}/follow-ups` | Append a follow-up note |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod schedule;
pub mod services;

pub use services::AppointmentScheduler;
