use std::sync::Arc;

use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::error::{AppError, Result};
use crate::features::appointments::services::AppointmentScheduler;
use crate::features::tickets::dtos::TicketEnvelopeDto;
use crate::features::tickets::models::{ExtensionFields, TicketRecord, TicketStatus};
use crate::features::tickets::repositories::TicketFilter;
use crate::features::tickets::services::{CategoryValidators, TicketLifecycle, TicketStore};
use crate::modules::notifications::{Notifier, TicketEvent, TicketEventKind};
use crate::modules::storage::{BlobStorage, UploadedFile};
use crate::shared::constants::{ALLOWED_DOCUMENT_TYPES, MAX_DOCUMENT_SIZE};
use crate::shared::types::PaginationQuery;

/// Category-agnostic ticket operations. Appointment bookings are handed to
/// the [`AppointmentScheduler`] so they always go through the schedule index.
pub struct TicketService {
    store: Arc<TicketStore>,
    scheduler: Arc<AppointmentScheduler>,
    storage: Arc<dyn BlobStorage>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl TicketService {
    pub fn new(
        store: Arc<TicketStore>,
        scheduler: Arc<AppointmentScheduler>,
        storage: Arc<dyn BlobStorage>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            scheduler,
            storage,
            notifier,
            clock,
        }
    }

    pub async fn create(&self, envelope: &TicketEnvelopeDto) -> Result<TicketRecord> {
        let validated = CategoryValidators::validate(envelope)?;

        if matches!(validated.extension, ExtensionFields::Appointment(_)) {
            return self.scheduler.book(validated).await;
        }

        let record = self.store.draft(validated)?;
        let record = self.store.insert(record).await?;
        self.emit(TicketEventKind::Created, &record);
        Ok(record)
    }

    pub async fn get(&self, id: Uuid) -> Result<TicketRecord> {
        self.store.get(id).await
    }

    pub async fn get_by_number(&self, ticket_number: &str) -> Result<TicketRecord> {
        self.store.get_by_number(ticket_number.trim()).await
    }

    pub async fn list(
        &self,
        filter: TicketFilter,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<TicketRecord>, i64)> {
        self.store.list(filter, pagination).await
    }

    /// Replace the editable fields of a ticket and its extension
    pub async fn update(&self, id: Uuid, envelope: &TicketEnvelopeDto) -> Result<TicketRecord> {
        let validated = CategoryValidators::validate(envelope)?;
        let mut record = self.store.get(id).await?;
        record.apply_update(validated)?;

        let record = self.store.save_edit(record).await?;
        tracing::info!("Ticket updated: {}", record.ticket().ticket_number);
        Ok(record)
    }

    /// Generic status change, checked against the lifecycle table
    pub async fn transition(
        &self,
        id: Uuid,
        to: TicketStatus,
        note: Option<&str>,
    ) -> Result<TicketRecord> {
        let mut record = self.store.get(id).await?;
        let from = record.status();

        if let Err(e) = TicketLifecycle::apply_transition(&mut record, to) {
            tracing::warn!(
                "Rejected transition of {} from {} to {}",
                record.ticket().ticket_number,
                from,
                to
            );
            return Err(e);
        }

        let record = self.store.save_transition(record).await?;
        tracing::info!(
            "Ticket {} moved from {} to {}{}",
            record.ticket().ticket_number,
            from,
            to,
            note.map(|n| format!(" ({})", n)).unwrap_or_default()
        );
        Ok(record)
    }

    /// Upload a supporting document for a blotter and append its URL
    pub async fn attach_document(&self, id: Uuid, file: UploadedFile) -> Result<TicketRecord> {
        check_document(&file)?;

        let mut record = self.store.get(id).await?;
        if record.blotter().is_none() {
            return Err(AppError::BadRequest(format!(
                "Ticket {} is not a blotter; only blotters take supporting documents",
                record.ticket().ticket_number
            )));
        }

        let key = format!(
            "{}/{}-{}",
            record.ticket().ticket_number,
            Uuid::now_v7(),
            sanitize_file_name(&file.file_name)
        );
        let url = self.storage.store(&key, file).await?;

        if let Some(blotter) = record.blotter_mut() {
            blotter.supporting_documents.push(url.clone());
        }

        let record = self.store.save_edit(record).await.map_err(|e| {
            tracing::warn!("Document {} stored but not linked: {}", url, e);
            e
        })?;

        tracing::info!(
            "Supporting document attached to {}: {}",
            record.ticket().ticket_number,
            url
        );
        Ok(record)
    }

    fn emit(&self, kind: TicketEventKind, record: &TicketRecord) {
        self.notifier.notify(TicketEvent {
            kind,
            ticket_id: record.id(),
            ticket_number: record.ticket().ticket_number.clone(),
            category: record.category(),
            occurred_at: self.clock.now(),
        });
    }
}

fn check_document(file: &UploadedFile) -> Result<()> {
    if file.data.is_empty() {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }

    if file.data.len() > MAX_DOCUMENT_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} MB",
            MAX_DOCUMENT_SIZE / 1024 / 1024
        )));
    }

    if !ALLOWED_DOCUMENT_TYPES.contains(&file.content_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            file.content_type,
            ALLOWED_DOCUMENT_TYPES.join(", ")
        )));
    }

    Ok(())
}

/// Keep object keys to a safe character set
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}
