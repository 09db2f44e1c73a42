//! Outbound ticket event notifications

mod notifier;
mod webhook_notifier;

pub use notifier::{LogNotifier, Notifier, TicketEvent, TicketEventKind};
pub use webhook_notifier::WebhookNotifier;
