use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::error::{AppError, Result};
use crate::features::tickets::models::{
    BaseTicket, TicketCategory, TicketExtension, TicketRecord, ValidatedTicket,
};
use crate::features::tickets::repositories::{TicketFilter, TicketRepository};
use crate::features::tickets::services::TicketLifecycle;
use crate::shared::types::PaginationQuery;

/// Format: `APT-2025-0621-001`
pub fn format_ticket_number(category: TicketCategory, day: NaiveDate, sequence: i32) -> String {
    format!(
        "{}-{}-{:03}",
        category.prefix(),
        day.format("%Y-%m%d"),
        sequence
    )
}

/// Persistence of a base ticket and its extension as one unit
pub struct TicketStore {
    repository: Arc<dyn TicketRepository>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl TicketStore {
    pub fn new(
        repository: Arc<dyn TicketRepository>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            repository,
            clock,
            offset,
        }
    }

    /// Build an unsaved record with generated ids and the initial status.
    /// The ticket number is assigned by [`TicketStore::insert`].
    pub fn draft(&self, validated: ValidatedTicket) -> Result<TicketRecord> {
        let now = self.clock.now();
        let fields = validated.ticket;
        let ticket = BaseTicket {
            id: Uuid::now_v7(),
            ticket_number: String::new(),
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
        TicketRecord::new(ticket, extension)
    }

    /// Assign the ticket number and persist ticket and extension together
    pub async fn insert(&self, mut record: TicketRecord) -> Result<TicketRecord> {
        let day = self
            .clock
            .now()
            .with_timezone(&self.offset)
            .date_naive();
        let sequence = self
            .repository
            .next_ticket_sequence(record.category(), day)
            .await?;
        record.set_ticket_number(format_ticket_number(record.category(), day, sequence));

        self.repository.insert(&record).await?;

        tracing::info!(
            "Ticket created: id={}, number={}, category={}",
            record.id(),
            record.ticket().ticket_number,
            record.category()
        );
        Ok(record)
    }

    pub async fn get(&self, id: Uuid) -> Result<TicketRecord> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' not found", id)))
    }

    pub async fn get_by_number(&self, ticket_number: &str) -> Result<TicketRecord> {
        self.repository
            .find_by_number(ticket_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' not found", ticket_number)))
    }

    pub async fn get_by_appointment(&self, appointment_id: Uuid) -> Result<TicketRecord> {
        self.repository
            .find_by_appointment(appointment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Appointment '{}' not found", appointment_id))
            })
    }

    pub async fn list(
        &self,
        filter: TicketFilter,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<TicketRecord>, i64)> {
        self.repository
            .list(filter, pagination.limit(), pagination.offset())
            .await
    }

    /// Persist an edit. A concurrent write surfaces as `Conflict`.
    pub async fn save_edit(&self, record: TicketRecord) -> Result<TicketRecord> {
        let id = record.id();
        self.write(record).await?.ok_or_else(|| {
            tracing::warn!("Stale edit rejected for ticket {}", id);
            AppError::Conflict(format!(
                "Ticket '{}' was modified by another request; reload and retry",
                id
            ))
        })
    }

    /// Persist a lifecycle change. A concurrent write surfaces as `InvalidTransition`.
    pub async fn save_transition(&self, record: TicketRecord) -> Result<TicketRecord> {
        let id = record.id();
        self.write(record).await?.ok_or_else(|| {
            tracing::warn!("Stale transition rejected for ticket {}", id);
            AppError::InvalidTransition(format!(
                "Ticket '{}' changed status concurrently; reload and retry",
                id
            ))
        })
    }

    async fn write(&self, mut record: TicketRecord) -> Result<Option<TicketRecord>> {
        let expected_version = record.version();
        record.bump_version();
        record.touch(self.clock.now());

        if self.repository.update(&record, expected_version).await? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::features::tickets::models::TicketStatus;
    use crate::features::tickets::repositories::InMemoryTicketRepository;
    use crate::features::tickets::services::CategoryValidators;
    use crate::shared::test_helpers::{
        complaint_envelope, fixed_clock, suggestion_envelope, utc_plus_8,
    };

    fn store() -> TicketStore {
        TicketStore::new(
            Arc::new(InMemoryTicketRepository::new()),
            fixed_clock("2025-06-20T01:00:00Z"),
            utc_plus_8(),
        )
    }

    #[test]
    fn test_ticket_number_format() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        assert_eq!(
            format_ticket_number(TicketCategory::Appointment, day, 1),
            "APT-2025-0621-001"
        );
        assert_eq!(
            format_ticket_number(TicketCategory::Blotter, day, 42),
            "BLT-2025-0621-042"
        );
    }

    #[tokio::test]
    async fn test_round_trip_preserves_caller_fields() {
        let store = store();
        let validated = CategoryValidators::validate(&complaint_envelope()).unwrap();
        let draft = store.draft(validated.clone()).unwrap();
        let created = store.insert(draft).await.unwrap();

        let fetched = store.get(created.id()).await.unwrap();
        assert_eq!(fetched, created);

        let t = fetched.ticket();
        assert_eq!(t.subject, validated.ticket.subject);
        assert_eq!(t.description, validated.ticket.description);
        assert_eq!(t.priority, validated.ticket.priority);
        assert_eq!(t.requester_name, validated.ticket.requester_name);
        assert_eq!(t.contact_number, validated.ticket.contact_number);
        assert_eq!(t.email_address, validated.ticket.email_address);
        assert_eq!(t.complete_address, validated.ticket.complete_address);
        assert_eq!(t.status, TicketStatus::Open);
        assert_eq!(t.version, 1);
        // 01:00 UTC is 09:00 on the 20th in UTC+8
        assert_eq!(t.ticket_number, "CMP-2025-0620-001");

        let by_number = store.get_by_number(&t.ticket_number).await.unwrap();
        assert_eq!(by_number.id(), created.id());
    }

    #[tokio::test]
    async fn test_ticket_numbers_are_unique() {
        let store = store();
        let mut numbers = HashSet::new();
        for envelope in [complaint_envelope(), complaint_envelope(), suggestion_envelope()] {
            let validated = CategoryValidators::validate(&envelope).unwrap();
            let record = store.insert(store.draft(validated).unwrap()).await.unwrap();
            assert!(numbers.insert(record.ticket().ticket_number.clone()));
        }
        assert!(numbers.contains("CMP-2025-0620-002"));
        assert!(numbers.contains("SUG-2025-0620-001"));
    }

    #[tokio::test]
    async fn test_stale_write_is_rejected() {
        let store = store();
        let validated = CategoryValidators::validate(&complaint_envelope()).unwrap();
        let created = store.insert(store.draft(validated).unwrap()).await.unwrap();

        let first = store.get(created.id()).await.unwrap();
        let second = store.get(created.id()).await.unwrap();

        let saved = store.save_edit(first).await.unwrap();
        assert_eq!(saved.version(), 2);

        assert!(matches!(
            store.save_transition(second.clone()).await,
            Err(AppError::InvalidTransition(_))
        ));
        assert!(matches!(
            store.save_edit(second).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let store = store();
        assert!(matches!(
            store.get(Uuid::now_v7()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.get_by_number("APT-2025-0621-999").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.get_by_appointment(Uuid::now_v7()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
