use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::validation::ClosedSet;

/// Help-desk category, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "ticket_category", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketCategory {
    Appointment,
    Blotter,
    Complaint,
    Suggestion,
}

impl TicketCategory {
    /// Prefix of the human-readable ticket number
    pub fn prefix(self) -> &'static str {
        match self {
            TicketCategory::Appointment => "APT",
            TicketCategory::Blotter => "BLT",
            TicketCategory::Complaint => "CMP",
            TicketCategory::Suggestion => "SUG",
        }
    }

    /// Key of the extension object in the request/response envelope
    pub fn envelope_key(self) -> &'static str {
        match self {
            TicketCategory::Appointment => "appointment",
            TicketCategory::Blotter => "blotter",
            TicketCategory::Complaint => "complaint",
            TicketCategory::Suggestion => "suggestion",
        }
    }
}

impl ClosedSet for TicketCategory {
    const ALL: &'static [Self] = &[
        TicketCategory::Appointment,
        TicketCategory::Blotter,
        TicketCategory::Complaint,
        TicketCategory::Suggestion,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::Appointment => "APPOINTMENT",
            TicketCategory::Blotter => "BLOTTER",
            TicketCategory::Complaint => "COMPLAINT",
            TicketCategory::Suggestion => "SUGGESTION",
        }
    }
}

impl std::fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "ticket_priority", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl ClosedSet for TicketPriority {
    const ALL: &'static [Self] = &[
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Critical,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "LOW",
            TicketPriority::Medium => "MEDIUM",
            TicketPriority::High => "HIGH",
            TicketPriority::Critical => "CRITICAL",
        }
    }
}

/// Ticket status shared by every category.
///
/// Appointment tickets overlay their own meaning: PENDING is "awaiting
/// confirmation", IN_PROGRESS is "confirmed" and CLOSED follows a
/// cancellation or a completed visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Pending,
    Resolved,
    Closed,
}

impl ClosedSet for TicketStatus {
    const ALL: &'static [Self] = &[
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Pending,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Pending => "PENDING",
            TicketStatus::Resolved => "RESOLVED",
            TicketStatus::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for the category-agnostic part of a ticket
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BaseTicket {
    pub id: Uuid,
    pub ticket_number: String,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub requester_name: String,
    pub resident_id: Option<Uuid>,
    pub contact_number: String,
    pub email_address: Option<String>,
    pub complete_address: String,
    pub category: TicketCategory,
    pub status: TicketStatus,
    /// Optimistic concurrency token, bumped on every write
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied base ticket fields after validation
#[derive(Debug, Clone, PartialEq)]
pub struct TicketFields {
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub requester_name: String,
    pub resident_id: Option<Uuid>,
    pub contact_number: String,
    pub email_address: Option<String>,
    pub complete_address: String,
    pub category: TicketCategory,
}

impl BaseTicket {
    /// Overwrite the editable fields. Category is immutable and left untouched.
    pub fn apply_fields(&mut self, fields: TicketFields) {
        self.subject = fields.subject;
        self.description = fields.description;
        self.priority = fields.priority;
        self.requester_name = fields.requester_name;
        self.resident_id = fields.resident_id;
        self.contact_number = fields.contact_number;
        self.email_address = fields.email_address;
        self.complete_address = fields.complete_address;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(TicketStatus::parse("in_progress"), Some(TicketStatus::InProgress));
        assert_eq!(TicketStatus::parse("DONE"), None);
    }

    #[test]
    fn test_category_prefixes_are_distinct() {
        let mut prefixes: Vec<&str> = TicketCategory::ALL.iter().map(|c| c.prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), TicketCategory::ALL.len());
    }
}
