//! Feature modules, one per area of the help desk

pub mod appointments;
pub mod auth;
pub mod residents;
pub mod statistics;
pub mod tickets;
