//! Fixtures shared by unit and handler tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, FixedOffset, Utc};
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::residents::ResidentDirectory;
use crate::features::tickets::dtos::{
    AppointmentFieldsDto, BlotterFieldsDto, ComplaintFieldsDto, InvolvedPersonDto,
    SuggestionFieldsDto, TicketEnvelopeDto, TicketFieldsDto,
};
use crate::features::tickets::models::{BaseTicket, TicketExtension, TicketRecord};
use crate::features::tickets::services::{CategoryValidators, TicketLifecycle};
use crate::modules::notifications::{Notifier, TicketEvent, TicketEventKind};
use crate::modules::storage::{BlobStorage, UploadedFile};
use crate::shared::constants::{ROLE_DESK_OFFICER, ROLE_RESIDENT};

// =============================================================================
// TIME
// =============================================================================

/// Clock that always reports the same instant
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn fixed_clock(rfc3339: &str) -> Arc<dyn Clock> {
    let instant = DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc);
    Arc::new(FixedClock(instant))
}

pub fn utc_plus_8() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

// =============================================================================
// USERS
// =============================================================================

pub fn create_desk_officer() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: format!("officer-{}", Uuid::now_v7()),
        roles: vec![ROLE_DESK_OFFICER.to_string()],
    }
}

pub fn create_resident() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: format!("resident-{}", Uuid::now_v7()),
        roles: vec![ROLE_RESIDENT.to_string()],
    }
}

async fn inject_desk_officer(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_desk_officer());
    next.run(request).await
}

async fn inject_resident(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_resident());
    next.run(request).await
}

pub fn with_desk_officer_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_desk_officer))
}

pub fn with_resident_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_resident))
}

// =============================================================================
// ENVELOPES
// =============================================================================

fn ticket_fields(category: &str) -> TicketFieldsDto {
    let street: String = StreetName().fake();
    let city: String = CityName().fake();
    TicketFieldsDto {
        subject: Some(format!("{} request", category.to_lowercase())),
        description: Some(Sentence(5..12).fake()),
        priority: Some("MEDIUM".to_string()),
        requester_name: Some(Name().fake()),
        resident_id: None,
        contact_number: Some("+63 917 123 4567".to_string()),
        email_address: Some(SafeEmail().fake()),
        complete_address: Some(format!("12 {}, {}", street, city)),
        category: Some(category.to_string()),
    }
}

pub fn appointment_envelope(department: &str, date: &str, time: &str) -> TicketEnvelopeDto {
    TicketEnvelopeDto {
        ticket: Some(ticket_fields("APPOINTMENT")),
        appointment: Some(AppointmentFieldsDto {
            department: Some(department.to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
            additional_notes: Some("Building permit consultation".to_string()),
        }),
        ..Default::default()
    }
}

/// Blotter with exactly one involved person
pub fn blotter_envelope() -> TicketEnvelopeDto {
    TicketEnvelopeDto {
        ticket: Some(ticket_fields("BLOTTER")),
        blotter: Some(BlotterFieldsDto {
            type_of_incident: Some("NOISE_DISTURBANCE".to_string()),
            date_of_incident: Some("2025-06-18".to_string()),
            time_of_incident: Some("NIGHT".to_string()),
            location_of_incident: Some("Purok 3 covered court".to_string()),
            other_people_involved: vec![InvolvedPersonDto {
                full_name: Some(Name().fake()),
                address: Some("Purok 3".to_string()),
                contact_number: Some("09171234567".to_string()),
                involvement: Some("RESPONDENT".to_string()),
            }],
        }),
        ..Default::default()
    }
}

pub fn complaint_envelope() -> TicketEnvelopeDto {
    TicketEnvelopeDto {
        ticket: Some(ticket_fields("COMPLAINT")),
        complaint: Some(ComplaintFieldsDto {
            feedback_category: Some("SANITATION".to_string()),
            department: Some("Environmental Services Department".to_string()),
            location: Some("Market road".to_string()),
        }),
        ..Default::default()
    }
}

pub fn suggestion_envelope() -> TicketEnvelopeDto {
    TicketEnvelopeDto {
        ticket: Some(ticket_fields("SUGGESTION")),
        suggestion: Some(SuggestionFieldsDto {
            category: Some("ENVIRONMENT".to_string()),
            benefits: Some("Shade along the main road".to_string()),
            implementation_notes: None,
            resources_needed: Some("Seedlings".to_string()),
            allow_contact: true,
        }),
        ..Default::default()
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// Unsaved record in its initial status
pub fn record_from(envelope: &TicketEnvelopeDto) -> TicketRecord {
    let validated = CategoryValidators::validate(envelope).unwrap();
    let now = Utc::now();
    let fields = validated.ticket;
    let ticket = BaseTicket {
        id: Uuid::now_v7(),
        ticket_number: format!("{}-2025-0621-001", fields.category.prefix()),
        subject: fields.subject,
        description: fields.description,
        priority: fields.priority,
        requester_name: fields.requester_name,
        resident_id: fields.resident_id,
        contact_number: fields.contact_number,
        email_address: fields.email_address,
        complete_address: fields.complete_address,
        category: fields.category,
        status: TicketLifecycle::initial_status(fields.category),
        version: 1,
        created_at: now,
        updated_at: now,
    };
    let extension = TicketExtension::from_fields(validated.extension, ticket.id);
    TicketRecord::new(ticket, extension).unwrap()
}

pub fn appointment_record() -> TicketRecord {
    record_from(&appointment_envelope(
        "Engineering Department",
        "2025-06-21",
        "10:00",
    ))
}

pub fn complaint_record() -> TicketRecord {
    record_from(&complaint_envelope())
}

// =============================================================================
// COLLABORATORS
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<TicketEvent>>,
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<TicketEventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: TicketEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Blob storage that keeps uploads in memory and hands back `memory://` URLs
#[derive(Default)]
pub struct InMemoryBlobStorage {
    objects: Mutex<Vec<(String, UploadedFile)>>,
}

impl InMemoryBlobStorage {
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn store(&self, key: &str, file: UploadedFile) -> Result<String> {
        self.objects.lock().unwrap().push((key.to_string(), file));
        Ok(format!("memory://{}", key))
    }
}

/// Directory answering from a fixed name table (case-insensitive)
pub struct StaticResidentDirectory {
    residents: HashMap<String, Uuid>,
}

impl StaticResidentDirectory {
    pub fn new(entries: &[(&str, Uuid)]) -> Self {
        Self {
            residents: entries
                .iter()
                .map(|(name, id)| (name.to_lowercase(), *id))
                .collect(),
        }
    }
}

#[async_trait]
impl ResidentDirectory for StaticResidentDirectory {
    async fn resolve(&self, search_term: &str) -> Result<Option<Uuid>> {
        Ok(self.residents.get(&search_term.to_lowercase()).copied())
    }
}
