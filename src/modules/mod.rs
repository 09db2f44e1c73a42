//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for blob storage and outbound notifications.

pub mod notifications;
pub mod storage;
