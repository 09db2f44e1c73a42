use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, FieldError, Result};
use crate::features::appointments::models::{Department, SlotKey, TimeSlot};
use crate::features::tickets::models::{BaseTicket, TicketCategory, TicketFields, TicketStatus};
use crate::shared::validation::ClosedSet;

// =============================================================================
// APPOINTMENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }
}

impl ClosedSet for AppointmentStatus {
    const ALL: &'static [Self] = &[
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FollowUpNote {
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub base_ticket_id: Uuid,
    pub department: Department,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub additional_notes: Option<String>,
    pub status: AppointmentStatus,
    pub confirmation_note: Option<String>,
    pub cancellation_reason: Option<String>,
    pub completion_notes: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub follow_ups: Vec<FollowUpNote>,
}

impl Appointment {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.department, self.date, self.time)
    }
}

// =============================================================================
// BLOTTER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "incident_type", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentType {
    Theft,
    PhysicalAssault,
    VerbalAbuse,
    PropertyDamage,
    NoiseDisturbance,
    Trespassing,
    DomesticDispute,
    NeighborDispute,
    Vandalism,
    Other,
}

impl ClosedSet for IncidentType {
    const ALL: &'static [Self] = &[
        IncidentType::Theft,
        IncidentType::PhysicalAssault,
        IncidentType::VerbalAbuse,
        IncidentType::PropertyDamage,
        IncidentType::NoiseDisturbance,
        IncidentType::Trespassing,
        IncidentType::DomesticDispute,
        IncidentType::NeighborDispute,
        IncidentType::Vandalism,
        IncidentType::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Theft => "THEFT",
            IncidentType::PhysicalAssault => "PHYSICAL_ASSAULT",
            IncidentType::VerbalAbuse => "VERBAL_ABUSE",
            IncidentType::PropertyDamage => "PROPERTY_DAMAGE",
            IncidentType::NoiseDisturbance => "NOISE_DISTURBANCE",
            IncidentType::Trespassing => "TRESPASSING",
            IncidentType::DomesticDispute => "DOMESTIC_DISPUTE",
            IncidentType::NeighborDispute => "NEIGHBOR_DISPUTE",
            IncidentType::Vandalism => "VANDALISM",
            IncidentType::Other => "OTHER",
        }
    }
}

/// Coarse time of day an incident happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "incident_time_of_day", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentTimeOfDay {
    /// 00:00 - 05:59
    EarlyMorning,
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 17:59
    Afternoon,
    /// 18:00 - 20:59
    Evening,
    /// 21:00 - 23:59
    Night,
}

impl ClosedSet for IncidentTimeOfDay {
    const ALL: &'static [Self] = &[
        IncidentTimeOfDay::EarlyMorning,
        IncidentTimeOfDay::Morning,
        IncidentTimeOfDay::Afternoon,
        IncidentTimeOfDay::Evening,
        IncidentTimeOfDay::Night,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            IncidentTimeOfDay::EarlyMorning => "EARLY_MORNING",
            IncidentTimeOfDay::Morning => "MORNING",
            IncidentTimeOfDay::Afternoon => "AFTERNOON",
            IncidentTimeOfDay::Evening => "EVENING",
            IncidentTimeOfDay::Night => "NIGHT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Involvement {
    Respondent,
    Witness,
    Victim,
    Suspect,
}

impl ClosedSet for Involvement {
    const ALL: &'static [Self] = &[
        Involvement::Respondent,
        Involvement::Witness,
        Involvement::Victim,
        Involvement::Suspect,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Involvement::Respondent => "RESPONDENT",
            Involvement::Witness => "WITNESS",
            Involvement::Victim => "VICTIM",
            Involvement::Suspect => "SUSPECT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvolvedPerson {
    pub full_name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub involvement: Involvement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Blotter {
    pub id: Uuid,
    pub base_ticket_id: Uuid,
    pub type_of_incident: IncidentType,
    pub date_of_incident: NaiveDate,
    pub time_of_incident: IncidentTimeOfDay,
    pub location_of_incident: String,
    pub other_people_involved: Vec<InvolvedPerson>,
    /// Appended after creation through the document upload endpoint
    pub supporting_documents: Vec<String>,
}

// =============================================================================
// COMPLAINT & SUGGESTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "feedback_category", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackCategory {
    ServiceQuality,
    StaffConduct,
    Facilities,
    ProcessDelay,
    Sanitation,
    Infrastructure,
    Other,
}

impl ClosedSet for FeedbackCategory {
    const ALL: &'static [Self] = &[
        FeedbackCategory::ServiceQuality,
        FeedbackCategory::StaffConduct,
        FeedbackCategory::Facilities,
        FeedbackCategory::ProcessDelay,
        FeedbackCategory::Sanitation,
        FeedbackCategory::Infrastructure,
        FeedbackCategory::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::ServiceQuality => "SERVICE_QUALITY",
            FeedbackCategory::StaffConduct => "STAFF_CONDUCT",
            FeedbackCategory::Facilities => "FACILITIES",
            FeedbackCategory::ProcessDelay => "PROCESS_DELAY",
            FeedbackCategory::Sanitation => "SANITATION",
            FeedbackCategory::Infrastructure => "INFRASTRUCTURE",
            FeedbackCategory::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Complaint {
    pub id: Uuid,
    pub base_ticket_id: Uuid,
    pub feedback_category: FeedbackCategory,
    pub department: Department,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "suggestion_category", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionCategory {
    Infrastructure,
    Health,
    Education,
    Environment,
    PublicSafety,
    Livelihood,
    Governance,
    Other,
}

impl ClosedSet for SuggestionCategory {
    const ALL: &'static [Self] = &[
        SuggestionCategory::Infrastructure,
        SuggestionCategory::Health,
        SuggestionCategory::Education,
        SuggestionCategory::Environment,
        SuggestionCategory::PublicSafety,
        SuggestionCategory::Livelihood,
        SuggestionCategory::Governance,
        SuggestionCategory::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SuggestionCategory::Infrastructure => "INFRASTRUCTURE",
            SuggestionCategory::Health => "HEALTH",
            SuggestionCategory::Education => "EDUCATION",
            SuggestionCategory::Environment => "ENVIRONMENT",
            SuggestionCategory::PublicSafety => "PUBLIC_SAFETY",
            SuggestionCategory::Livelihood => "LIVELIHOOD",
            SuggestionCategory::Governance => "GOVERNANCE",
            SuggestionCategory::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Suggestion {
    pub id: Uuid,
    pub base_ticket_id: Uuid,
    pub category: SuggestionCategory,
    pub benefits: String,
    pub implementation_notes: Option<String>,
    pub resources_needed: Option<String>,
    pub allow_contact: bool,
}

// =============================================================================
// VALIDATED INPUT
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentFields {
    pub department: Department,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub additional_notes: Option<String>,
}

impl AppointmentFields {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.department, self.date, self.time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlotterFields {
    pub type_of_incident: IncidentType,
    pub date_of_incident: NaiveDate,
    pub time_of_incident: IncidentTimeOfDay,
    pub location_of_incident: String,
    pub other_people_involved: Vec<InvolvedPerson>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintFields {
    pub feedback_category: FeedbackCategory,
    pub department: Department,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionFields {
    pub category: SuggestionCategory,
    pub benefits: String,
    pub implementation_notes: Option<String>,
    pub resources_needed: Option<String>,
    pub allow_contact: bool,
}

/// Category payload that passed validation, not yet bound to a ticket
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionFields {
    Appointment(AppointmentFields),
    Blotter(BlotterFields),
    Complaint(ComplaintFields),
    Suggestion(SuggestionFields),
}

impl ExtensionFields {
    pub fn category(&self) -> TicketCategory {
        match self {
            ExtensionFields::Appointment(_) => TicketCategory::Appointment,
            ExtensionFields::Blotter(_) => TicketCategory::Blotter,
            ExtensionFields::Complaint(_) => TicketCategory::Complaint,
            ExtensionFields::Suggestion(_) => TicketCategory::Suggestion,
        }
    }
}

/// Output of the category validators: both halves agree on the category
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTicket {
    pub ticket: TicketFields,
    pub extension: ExtensionFields,
}

impl ValidatedTicket {
    pub fn category(&self) -> TicketCategory {
        self.ticket.category
    }
}

// =============================================================================
// TICKET + EXTENSION
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TicketExtension {
    Appointment(Appointment),
    Blotter(Blotter),
    Complaint(Complaint),
    Suggestion(Suggestion),
}

impl TicketExtension {
    /// Bind validated fields to a fresh extension row
    pub fn from_fields(fields: ExtensionFields, base_ticket_id: Uuid) -> Self {
        let id = Uuid::now_v7();
        match fields {
            ExtensionFields::Appointment(f) => TicketExtension::Appointment(Appointment {
                id,
                base_ticket_id,
                department: f.department,
                date: f.date,
                time: f.time,
                additional_notes: f.additional_notes,
                status: AppointmentStatus::Pending,
                confirmation_note: None,
                cancellation_reason: None,
                completion_notes: None,
                confirmed_at: None,
                cancelled_at: None,
                completed_at: None,
                follow_ups: Vec::new(),
            }),
            ExtensionFields::Blotter(f) => TicketExtension::Blotter(Blotter {
                id,
                base_ticket_id,
                type_of_incident: f.type_of_incident,
                date_of_incident: f.date_of_incident,
                time_of_incident: f.time_of_incident,
                location_of_incident: f.location_of_incident,
                other_people_involved: f.other_people_involved,
                supporting_documents: Vec::new(),
            }),
            ExtensionFields::Complaint(f) => TicketExtension::Complaint(Complaint {
                id,
                base_ticket_id,
                feedback_category: f.feedback_category,
                department: f.department,
                location: f.location,
            }),
            ExtensionFields::Suggestion(f) => TicketExtension::Suggestion(Suggestion {
                id,
                base_ticket_id,
                category: f.category,
                benefits: f.benefits,
                implementation_notes: f.implementation_notes,
                resources_needed: f.resources_needed,
                allow_contact: f.allow_contact,
            }),
        }
    }

    pub fn category(&self) -> TicketCategory {
        match self {
            TicketExtension::Appointment(_) => TicketCategory::Appointment,
            TicketExtension::Blotter(_) => TicketCategory::Blotter,
            TicketExtension::Complaint(_) => TicketCategory::Complaint,
            TicketExtension::Suggestion(_) => TicketCategory::Suggestion,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            TicketExtension::Appointment(a) => a.id,
            TicketExtension::Blotter(b) => b.id,
            TicketExtension::Complaint(c) => c.id,
            TicketExtension::Suggestion(s) => s.id,
        }
    }

    pub fn base_ticket_id(&self) -> Uuid {
        match self {
            TicketExtension::Appointment(a) => a.base_ticket_id,
            TicketExtension::Blotter(b) => b.base_ticket_id,
            TicketExtension::Complaint(c) => c.base_ticket_id,
            TicketExtension::Suggestion(s) => s.base_ticket_id,
        }
    }
}

/// A base ticket together with its single category extension.
///
/// Fields are private so the pair can only be built with a matching
/// category and back-reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRecord {
    ticket: BaseTicket,
    extension: TicketExtension,
}

impl TicketRecord {
    pub fn new(ticket: BaseTicket, extension: TicketExtension) -> Result<Self> {
        if extension.category() != ticket.category {
            return Err(AppError::Internal(format!(
                "Ticket {} is {} but its extension is {}",
                ticket.id,
                ticket.category,
                extension.category()
            )));
        }
        if extension.base_ticket_id() != ticket.id {
            return Err(AppError::Internal(format!(
                "Extension {} does not belong to ticket {}",
                extension.id(),
                ticket.id
            )));
        }
        Ok(Self { ticket, extension })
    }

    pub fn ticket(&self) -> &BaseTicket {
        &self.ticket
    }

    pub fn extension(&self) -> &TicketExtension {
        &self.extension
    }

    pub fn id(&self) -> Uuid {
        self.ticket.id
    }

    pub fn category(&self) -> TicketCategory {
        self.ticket.category
    }

    pub fn status(&self) -> TicketStatus {
        self.ticket.status
    }

    pub fn version(&self) -> i32 {
        self.ticket.version
    }

    pub fn appointment(&self) -> Option<&Appointment> {
        match &self.extension {
            TicketExtension::Appointment(a) => Some(a),
            _ => None,
        }
    }

    pub fn appointment_mut(&mut self) -> Option<&mut Appointment> {
        match &mut self.extension {
            TicketExtension::Appointment(a) => Some(a),
            _ => None,
        }
    }

    pub fn blotter(&self) -> Option<&Blotter> {
        match &self.extension {
            TicketExtension::Blotter(b) => Some(b),
            _ => None,
        }
    }

    pub fn blotter_mut(&mut self) -> Option<&mut Blotter> {
        match &mut self.extension {
            TicketExtension::Blotter(b) => Some(b),
            _ => None,
        }
    }

    pub fn set_status(&mut self, status: TicketStatus) {
        self.ticket.status = status;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.ticket.updated_at = now;
    }

    /// Version the next successful write will carry
    pub fn bump_version(&mut self) {
        self.ticket.version += 1;
    }

    pub fn set_ticket_number(&mut self, ticket_number: String) {
        self.ticket.ticket_number = ticket_number;
    }

    /// Apply an edit to the caller-editable fields.
    ///
    /// The category cannot change and an appointment keeps the slot it holds;
    /// the lifecycle fields of the extension and blotter documents survive.
    pub fn apply_update(&mut self, update: ValidatedTicket) -> Result<()> {
        if update.category() != self.ticket.category {
            return Err(AppError::field(
                "ticket.category",
                format!(
                    "Category is immutable (ticket is {})",
                    self.ticket.category
                ),
            ));
        }

        match (&mut self.extension, update.extension) {
            (TicketExtension::Appointment(current), ExtensionFields::Appointment(fields)) => {
                if fields.slot_key() != current.slot_key() {
                    let mut errors = Vec::new();
                    let message = "Use reschedule to change the appointment slot";
                    if fields.department != current.department {
                        errors.push(FieldError::new("appointment.department", message));
                    }
                    if fields.date != current.date {
                        errors.push(FieldError::new("appointment.date", message));
                    }
                    if fields.time != current.time {
                        errors.push(FieldError::new("appointment.time", message));
                    }
                    return Err(AppError::Validation(errors));
                }
                current.additional_notes = fields.additional_notes;
            }
            (TicketExtension::Blotter(current), ExtensionFields::Blotter(fields)) => {
                current.type_of_incident = fields.type_of_incident;
                current.date_of_incident = fields.date_of_incident;
                current.time_of_incident = fields.time_of_incident;
                current.location_of_incident = fields.location_of_incident;
                current.other_people_involved = fields.other_people_involved;
            }
            (TicketExtension::Complaint(current), ExtensionFields::Complaint(fields)) => {
                current.feedback_category = fields.feedback_category;
                current.department = fields.department;
                current.location = fields.location;
            }
            (TicketExtension::Suggestion(current), ExtensionFields::Suggestion(fields)) => {
                current.category = fields.category;
                current.benefits = fields.benefits;
                current.implementation_notes = fields.implementation_notes;
                current.resources_needed = fields.resources_needed;
                current.allow_contact = fields.allow_contact;
            }
            (_, fields) => {
                return Err(AppError::field(
                    fields.category().envelope_key(),
                    format!("Not allowed for a {} ticket", self.ticket.category),
                ));
            }
        }

        self.ticket.apply_fields(update.ticket);
        Ok(())
    }

    pub fn into_parts(self) -> (BaseTicket, TicketExtension) {
        (self.ticket, self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tickets::models::TicketPriority;

    fn base(category: TicketCategory) -> BaseTicket {
        let now = Utc::now();
        BaseTicket {
            id: Uuid::now_v7(),
            ticket_number: "CMP-2025-0621-001".to_string(),
            subject: "Broken streetlight".to_string(),
            description: "The light on Mabini St. is out".to_string(),
            priority: TicketPriority::Low,
            requester_name: "Ana Reyes".to_string(),
            resident_id: None,
            contact_number: "09171234567".to_string(),
            email_address: None,
            complete_address: "12 Mabini St.".to_string(),
            category,
            status: TicketStatus::Open,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn complaint_fields() -> ExtensionFields {
        ExtensionFields::Complaint(ComplaintFields {
            feedback_category: FeedbackCategory::Infrastructure,
            department: Department::Engineering,
            location: Some("Mabini St.".to_string()),
        })
    }

    #[test]
    fn test_record_rejects_mismatched_category() {
        let ticket = base(TicketCategory::Blotter);
        let extension = TicketExtension::from_fields(complaint_fields(), ticket.id);
        assert!(matches!(
            TicketRecord::new(ticket, extension),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_record_rejects_foreign_extension() {
        let ticket = base(TicketCategory::Complaint);
        let extension = TicketExtension::from_fields(complaint_fields(), Uuid::now_v7());
        assert!(TicketRecord::new(ticket, extension).is_err());
    }

    #[test]
    fn test_new_appointment_starts_pending() {
        let fields = ExtensionFields::Appointment(AppointmentFields {
            department: Department::Engineering,
            date: NaiveDate::from_ymd_opt(2025, 6, 21).unwrap(),
            time: TimeSlot::TenAm,
            additional_notes: None,
        });
        match TicketExtension::from_fields(fields, Uuid::now_v7()) {
            TicketExtension::Appointment(a) => {
                assert_eq!(a.status, AppointmentStatus::Pending);
                assert!(a.follow_ups.is_empty());
            }
            other => panic!("unexpected extension {:?}", other),
        }
    }

    #[test]
    fn test_update_cannot_change_category() {
        let ticket = base(TicketCategory::Complaint);
        let extension = TicketExtension::from_fields(complaint_fields(), ticket.id);
        let mut record = TicketRecord::new(ticket.clone(), extension).unwrap();

        let mut fields = TicketFields {
            subject: ticket.subject.clone(),
            description: ticket.description.clone(),
            priority: ticket.priority,
            requester_name: ticket.requester_name.clone(),
            resident_id: None,
            contact_number: ticket.contact_number.clone(),
            email_address: None,
            complete_address: ticket.complete_address.clone(),
            category: TicketCategory::Suggestion,
        };
        let err = record
            .apply_update(ValidatedTicket {
                ticket: fields.clone(),
                extension: ExtensionFields::Suggestion(SuggestionFields {
                    category: SuggestionCategory::Health,
                    benefits: "More clinics".to_string(),
                    implementation_notes: None,
                    resources_needed: None,
                    allow_contact: false,
                }),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f[0].field == "ticket.category"));

        fields.category = TicketCategory::Complaint;
        fields.subject = "Streetlight still broken".to_string();
        record
            .apply_update(ValidatedTicket {
                ticket: fields,
                extension: complaint_fields(),
            })
            .unwrap();
        assert_eq!(record.ticket().subject, "Streetlight still broken");
        assert_eq!(record.category(), TicketCategory::Complaint);
    }
}
