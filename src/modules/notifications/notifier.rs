use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::features::tickets::models::TicketCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketEventKind {
    Created,
    Confirmed,
    Cancelled,
    Rescheduled,
}

/// Outbound event about a ticket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketEvent {
    pub kind: TicketEventKind,
    pub ticket_id: Uuid,
    pub ticket_number: String,
    pub category: TicketCategory,
    pub occurred_at: DateTime<Utc>,
}

/// Fire-and-forget delivery of ticket events.
///
/// `notify` never blocks the caller and never fails it: implementations
/// hand the event off and deal with delivery errors themselves.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: TicketEvent);
}

/// Notifier used when no webhook is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: TicketEvent) {
        tracing::info!(
            "Ticket event {:?}: ticket={}, number={}",
            event.kind,
            event.ticket_id,
            event.ticket_number
        );
    }
}
