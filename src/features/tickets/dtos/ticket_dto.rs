use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::tickets::models::{
    Appointment, BaseTicket, Blotter, Complaint, Suggestion, TicketCategory, TicketExtension,
    TicketPriority, TicketRecord, TicketStatus,
};

// =============================================================================
// REQUEST ENVELOPE
// =============================================================================

/// Create/update envelope: the base ticket plus exactly one category object.
///
/// Every field is optional at the wire level so that a single validation pass
/// can report all missing and malformed fields at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TicketEnvelopeDto {
    pub ticket: Option<TicketFieldsDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<AppointmentFieldsDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blotter: Option<BlotterFieldsDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complaint: Option<ComplaintFieldsDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<SuggestionFieldsDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct TicketFieldsDto {
    #[validate(length(max = 200, message = "Subject must not exceed 200 characters"))]
    pub subject: Option<String>,

    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,

    /// LOW, MEDIUM, HIGH or CRITICAL
    pub priority: Option<String>,

    #[validate(length(max = 150, message = "Requester name must not exceed 150 characters"))]
    pub requester_name: Option<String>,

    /// Optional reference into the resident directory
    pub resident_id: Option<Uuid>,

    #[validate(regex(
        path = "*crate::shared::validation::CONTACT_NUMBER_REGEX",
        message = "Contact number must be 7-20 digits, spaces or dashes with an optional leading +"
    ))]
    pub contact_number: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email_address: Option<String>,

    #[validate(length(max = 500, message = "Address must not exceed 500 characters"))]
    pub complete_address: Option<String>,

    /// APPOINTMENT, BLOTTER, COMPLAINT or SUGGESTION
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AppointmentFieldsDto {
    /// e.g. "Engineering Department"
    pub department: Option<String>,
    /// YYYY-MM-DD
    pub date: Option<String>,
    /// One of the bookable slots, e.g. "10:00"
    pub time: Option<String>,
    #[validate(length(max = 1000, message = "Additional notes must not exceed 1000 characters"))]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BlotterFieldsDto {
    pub type_of_incident: Option<String>,
    /// YYYY-MM-DD
    pub date_of_incident: Option<String>,
    /// EARLY_MORNING, MORNING, AFTERNOON, EVENING or NIGHT
    pub time_of_incident: Option<String>,
    #[validate(length(max = 500, message = "Location must not exceed 500 characters"))]
    pub location_of_incident: Option<String>,
    #[serde(default)]
    pub other_people_involved: Vec<InvolvedPersonDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct InvolvedPersonDto {
    #[validate(length(max = 150, message = "Full name must not exceed 150 characters"))]
    pub full_name: Option<String>,
    #[validate(length(max = 500, message = "Address must not exceed 500 characters"))]
    pub address: Option<String>,
    #[validate(regex(
        path = "*crate::shared::validation::CONTACT_NUMBER_REGEX",
        message = "Contact number must be 7-20 digits, spaces or dashes with an optional leading +"
    ))]
    pub contact_number: Option<String>,
    /// RESPONDENT, WITNESS, VICTIM or SUSPECT
    pub involvement: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ComplaintFieldsDto {
    pub feedback_category: Option<String>,
    pub department: Option<String>,
    #[validate(length(max = 500, message = "Location must not exceed 500 characters"))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SuggestionFieldsDto {
    pub category: Option<String>,
    #[validate(length(max = 2000, message = "Benefits must not exceed 2000 characters"))]
    pub benefits: Option<String>,
    #[validate(length(
        max = 2000,
        message = "Implementation notes must not exceed 2000 characters"
    ))]
    pub implementation_notes: Option<String>,
    #[validate(length(max = 2000, message = "Resources needed must not exceed 2000 characters"))]
    pub resources_needed: Option<String>,
    #[serde(default)]
    pub allow_contact: bool,
}

/// Trim every free-text value and drop the blank ones
fn tidy(value: &Option<String>) -> Option<String> {
    crate::shared::validation::non_blank(value).map(str::to_string)
}

impl TicketFieldsDto {
    pub fn normalized(&self) -> Self {
        Self {
            subject: tidy(&self.subject),
            description: tidy(&self.description),
            priority: tidy(&self.priority),
            requester_name: tidy(&self.requester_name),
            resident_id: self.resident_id,
            contact_number: tidy(&self.contact_number),
            email_address: tidy(&self.email_address),
            complete_address: tidy(&self.complete_address),
            category: tidy(&self.category),
        }
    }
}

impl AppointmentFieldsDto {
    pub fn normalized(&self) -> Self {
        Self {
            department: tidy(&self.department),
            date: tidy(&self.date),
            time: tidy(&self.time),
            additional_notes: tidy(&self.additional_notes),
        }
    }
}

impl BlotterFieldsDto {
    pub fn normalized(&self) -> Self {
        Self {
            type_of_incident: tidy(&self.type_of_incident),
            date_of_incident: tidy(&self.date_of_incident),
            time_of_incident: tidy(&self.time_of_incident),
            location_of_incident: tidy(&self.location_of_incident),
            other_people_involved: self
                .other_people_involved
                .iter()
                .map(|p| InvolvedPersonDto {
                    full_name: tidy(&p.full_name),
                    address: tidy(&p.address),
                    contact_number: tidy(&p.contact_number),
                    involvement: tidy(&p.involvement),
                })
                .collect(),
        }
    }
}

impl ComplaintFieldsDto {
    pub fn normalized(&self) -> Self {
        Self {
            feedback_category: tidy(&self.feedback_category),
            department: tidy(&self.department),
            location: tidy(&self.location),
        }
    }
}

impl SuggestionFieldsDto {
    pub fn normalized(&self) -> Self {
        Self {
            category: tidy(&self.category),
            benefits: tidy(&self.benefits),
            implementation_notes: tidy(&self.implementation_notes),
            resources_needed: tidy(&self.resources_needed),
            allow_contact: self.allow_contact,
        }
    }
}

// =============================================================================
// OTHER REQUESTS
// =============================================================================

/// Generic lifecycle transition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransitionStatusDto {
    pub status: TicketStatus,
    /// Logged with the transition, not stored
    pub note: Option<String>,
}

/// Multipart form for `POST /api/tickets/{id}/documents`
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentDto {
    /// JPEG, PNG, WebP or PDF, at most 10 MB
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Filters for listing tickets
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TicketListQuery {
    pub category: Option<TicketCategory>,
    pub status: Option<TicketStatus>,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketResponseDto {
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
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BaseTicket> for TicketResponseDto {
    fn from(t: BaseTicket) -> Self {
        Self {
            id: t.id,
            ticket_number: t.ticket_number,
            subject: t.subject,
            description: t.description,
            priority: t.priority,
            requester_name: t.requester_name,
            resident_id: t.resident_id,
            contact_number: t.contact_number,
            email_address: t.email_address,
            complete_address: t.complete_address,
            category: t.category,
            status: t.status,
            version: t.version,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Same envelope shape as the request, with generated fields populated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketEnvelopeResponseDto {
    pub ticket: TicketResponseDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Appointment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blotter: Option<Blotter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complaint: Option<Complaint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl From<TicketRecord> for TicketEnvelopeResponseDto {
    fn from(record: TicketRecord) -> Self {
        let (ticket, extension) = record.into_parts();
        let mut dto = Self {
            ticket: ticket.into(),
            appointment: None,
            blotter: None,
            complaint: None,
            suggestion: None,
        };
        match extension {
            TicketExtension::Appointment(a) => dto.appointment = Some(a),
            TicketExtension::Blotter(b) => dto.blotter = Some(b),
            TicketExtension::Complaint(c) => dto.complaint = Some(c),
            TicketExtension::Suggestion(s) => dto.suggestion = Some(s),
        }
        dto
    }
}
