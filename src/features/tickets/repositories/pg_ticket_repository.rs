use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::appointments::models::{Department, TimeSlot};
use crate::features::tickets::models::{
    Appointment, AppointmentStatus, BaseTicket, Blotter, Complaint, FollowUpNote,
    IncidentTimeOfDay, IncidentType, InvolvedPerson, Suggestion, TicketCategory,
    TicketExtension, TicketRecord, TicketStatus,
};
use crate::features::tickets::repositories::{
    AppointmentStatusCount, StatusCategoryCount, TicketFilter, TicketRepository,
};

const TICKET_COLUMNS: &str = r#"
    id, ticket_number, subject, description, priority, requester_name, resident_id,
    contact_number, email_address, complete_address, category, status, version,
    created_at, updated_at
"#;

const APPOINTMENT_COLUMNS: &str = r#"
    id, base_ticket_id, department, appointment_date, appointment_time, additional_notes,
    status, confirmation_note, cancellation_reason, completion_notes,
    confirmed_at, cancelled_at, completed_at, follow_ups
"#;

const BLOTTER_COLUMNS: &str = r#"
    id, base_ticket_id, type_of_incident, date_of_incident, time_of_incident,
    location_of_incident, other_people_involved, supporting_documents
"#;

#[derive(FromRow)]
struct AppointmentRow {
    id: Uuid,
    base_ticket_id: Uuid,
    department: Department,
    appointment_date: NaiveDate,
    appointment_time: TimeSlot,
    additional_notes: Option<String>,
    status: AppointmentStatus,
    confirmation_note: Option<String>,
    cancellation_reason: Option<String>,
    completion_notes: Option<String>,
    confirmed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    follow_ups: Json<Vec<FollowUpNote>>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Self {
            id: row.id,
            base_ticket_id: row.base_ticket_id,
            department: row.department,
            date: row.appointment_date,
            time: row.appointment_time,
            additional_notes: row.additional_notes,
            status: row.status,
            confirmation_note: row.confirmation_note,
            cancellation_reason: row.cancellation_reason,
            completion_notes: row.completion_notes,
            confirmed_at: row.confirmed_at,
            cancelled_at: row.cancelled_at,
            completed_at: row.completed_at,
            follow_ups: row.follow_ups.0,
        }
    }
}

#[derive(FromRow)]
struct BlotterRow {
    id: Uuid,
    base_ticket_id: Uuid,
    type_of_incident: IncidentType,
    date_of_incident: NaiveDate,
    time_of_incident: IncidentTimeOfDay,
    location_of_incident: String,
    other_people_involved: Json<Vec<InvolvedPerson>>,
    supporting_documents: Vec<String>,
}

impl From<BlotterRow> for Blotter {
    fn from(row: BlotterRow) -> Self {
        Self {
            id: row.id,
            base_ticket_id: row.base_ticket_id,
            type_of_incident: row.type_of_incident,
            date_of_incident: row.date_of_incident,
            time_of_incident: row.time_of_incident,
            location_of_incident: row.location_of_incident,
            other_people_involved: row.other_people_involved.0,
            supporting_documents: row.supporting_documents,
        }
    }
}

/// Map unique violations to Conflict, everything else to Database
fn handle_db_error(context: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            tracing::warn!("{}: unique constraint {:?}", context, db_err.constraint());
            return AppError::Conflict(
                "The ticket conflicts with an existing record".to_string(),
            );
        }
    }
    tracing::error!("{}: {:?}", context, e);
    AppError::Database(e)
}

/// Ticket repository on PostgreSQL: `tickets` plus one table per category
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_extension(
        tx: &mut Transaction<'_, Postgres>,
        extension: &TicketExtension,
    ) -> std::result::Result<(), sqlx::Error> {
        match extension {
            TicketExtension::Appointment(a) => {
                sqlx::query(
                    r#"
                    INSERT INTO appointments (
                        id, base_ticket_id, department, appointment_date, appointment_time,
                        additional_notes, status, confirmation_note, cancellation_reason,
                        completion_notes, confirmed_at, cancelled_at, completed_at, follow_ups
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                    "#,
                )
                .bind(a.id)
                .bind(a.base_ticket_id)
                .bind(a.department)
                .bind(a.date)
                .bind(a.time)
                .bind(&a.additional_notes)
                .bind(a.status)
                .bind(&a.confirmation_note)
                .bind(&a.cancellation_reason)
                .bind(&a.completion_notes)
                .bind(a.confirmed_at)
                .bind(a.cancelled_at)
                .bind(a.completed_at)
                .bind(Json(&a.follow_ups))
                .execute(&mut **tx)
                .await?;
            }
            TicketExtension::Blotter(b) => {
                sqlx::query(
                    r#"
                    INSERT INTO blotters (
                        id, base_ticket_id, type_of_incident, date_of_incident, time_of_incident,
                        location_of_incident, other_people_involved, supporting_documents
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    "#,
                )
                .bind(b.id)
                .bind(b.base_ticket_id)
                .bind(b.type_of_incident)
                .bind(b.date_of_incident)
                .bind(b.time_of_incident)
                .bind(&b.location_of_incident)
                .bind(Json(&b.other_people_involved))
                .bind(b.supporting_documents.clone())
                .execute(&mut **tx)
                .await?;
            }
            TicketExtension::Complaint(c) => {
                sqlx::query(
                    r#"
                    INSERT INTO complaints (id, base_ticket_id, feedback_category, department, location)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(c.id)
                .bind(c.base_ticket_id)
                .bind(c.feedback_category)
                .bind(c.department)
                .bind(&c.location)
                .execute(&mut **tx)
                .await?;
            }
            TicketExtension::Suggestion(s) => {
                sqlx::query(
                    r#"
                    INSERT INTO suggestions (
                        id, base_ticket_id, category, benefits, implementation_notes,
                        resources_needed, allow_contact
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(s.id)
                .bind(s.base_ticket_id)
                .bind(s.category)
                .bind(&s.benefits)
                .bind(&s.implementation_notes)
                .bind(&s.resources_needed)
                .bind(s.allow_contact)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }

    async fn update_extension(
        tx: &mut Transaction<'_, Postgres>,
        extension: &TicketExtension,
    ) -> std::result::Result<(), sqlx::Error> {
        match extension {
            TicketExtension::Appointment(a) => {
                sqlx::query(
                    r#"
                    UPDATE appointments SET
                        department = $2, appointment_date = $3, appointment_time = $4,
                        additional_notes = $5, status = $6, confirmation_note = $7,
                        cancellation_reason = $8, completion_notes = $9, confirmed_at = $10,
                        cancelled_at = $11, completed_at = $12, follow_ups = $13
                    WHERE id = $1
                    "#,
                )
                .bind(a.id)
                .bind(a.department)
                .bind(a.date)
                .bind(a.time)
                .bind(&a.additional_notes)
                .bind(a.status)
                .bind(&a.confirmation_note)
                .bind(&a.cancellation_reason)
                .bind(&a.completion_notes)
                .bind(a.confirmed_at)
                .bind(a.cancelled_at)
                .bind(a.completed_at)
                .bind(Json(&a.follow_ups))
                .execute(&mut **tx)
                .await?;
            }
            TicketExtension::Blotter(b) => {
                sqlx::query(
                    r#"
                    UPDATE blotters SET
                        type_of_incident = $2, date_of_incident = $3, time_of_incident = $4,
                        location_of_incident = $5, other_people_involved = $6,
                        supporting_documents = $7
                    WHERE id = $1
                    "#,
                )
                .bind(b.id)
                .bind(b.type_of_incident)
                .bind(b.date_of_incident)
                .bind(b.time_of_incident)
                .bind(&b.location_of_incident)
                .bind(Json(&b.other_people_involved))
                .bind(b.supporting_documents.clone())
                .execute(&mut **tx)
                .await?;
            }
            TicketExtension::Complaint(c) => {
                sqlx::query(
                    r#"
                    UPDATE complaints SET feedback_category = $2, department = $3, location = $4
                    WHERE id = $1
                    "#,
                )
                .bind(c.id)
                .bind(c.feedback_category)
                .bind(c.department)
                .bind(&c.location)
                .execute(&mut **tx)
                .await?;
            }
            TicketExtension::Suggestion(s) => {
                sqlx::query(
                    r#"
                    UPDATE suggestions SET
                        category = $2, benefits = $3, implementation_notes = $4,
                        resources_needed = $5, allow_contact = $6
                    WHERE id = $1
                    "#,
                )
                .bind(s.id)
                .bind(s.category)
                .bind(&s.benefits)
                .bind(&s.implementation_notes)
                .bind(&s.resources_needed)
                .bind(s.allow_contact)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }

    /// Attach each ticket's extension, with at most one query per category
    async fn load_extensions(&self, tickets: Vec<BaseTicket>) -> Result<Vec<TicketRecord>> {
        let mut ids: HashMap<TicketCategory, Vec<Uuid>> = HashMap::new();
        for ticket in &tickets {
            ids.entry(ticket.category).or_default().push(ticket.id);
        }

        let mut extensions: HashMap<Uuid, TicketExtension> = HashMap::new();

        if let Some(ids) = ids.remove(&TicketCategory::Appointment) {
            let sql = format!(
                "SELECT {} FROM appointments WHERE base_ticket_id = ANY($1)",
                APPOINTMENT_COLUMNS
            );
            let rows = sqlx::query_as::<_, AppointmentRow>(&sql)
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| handle_db_error("Failed to load appointments", e))?;
            for row in rows {
                extensions.insert(row.base_ticket_id, TicketExtension::Appointment(row.into()));
            }
        }

        if let Some(ids) = ids.remove(&TicketCategory::Blotter) {
            let sql = format!(
                "SELECT {} FROM blotters WHERE base_ticket_id = ANY($1)",
                BLOTTER_COLUMNS
            );
            let rows = sqlx::query_as::<_, BlotterRow>(&sql)
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| handle_db_error("Failed to load blotters", e))?;
            for row in rows {
                extensions.insert(row.base_ticket_id, TicketExtension::Blotter(row.into()));
            }
        }

        if let Some(ids) = ids.remove(&TicketCategory::Complaint) {
            let rows = sqlx::query_as::<_, Complaint>(
                r#"
                SELECT id, base_ticket_id, feedback_category, department, location
                FROM complaints WHERE base_ticket_id = ANY($1)
                "#,
            )
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to load complaints", e))?;
            for row in rows {
                extensions.insert(row.base_ticket_id, TicketExtension::Complaint(row));
            }
        }

        if let Some(ids) = ids.remove(&TicketCategory::Suggestion) {
            let rows = sqlx::query_as::<_, Suggestion>(
                r#"
                SELECT id, base_ticket_id, category, benefits, implementation_notes,
                       resources_needed, allow_contact
                FROM suggestions WHERE base_ticket_id = ANY($1)
                "#,
            )
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to load suggestions", e))?;
            for row in rows {
                extensions.insert(row.base_ticket_id, TicketExtension::Suggestion(row));
            }
        }

        tickets
            .into_iter()
            .map(|ticket| {
                let extension = extensions.remove(&ticket.id).ok_or_else(|| {
                    AppError::Internal(format!(
                        "Ticket {} has no {} extension row",
                        ticket.id, ticket.category
                    ))
                })?;
                TicketRecord::new(ticket, extension)
            })
            .collect()
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn next_ticket_sequence(&self, category: TicketCategory, day: NaiveDate) -> Result<i32> {
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO ticket_number_counters (category, day, last_value)
            VALUES ($1, $2, 1)
            ON CONFLICT (category, day)
            DO UPDATE SET last_value = ticket_number_counters.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(category)
        .bind(day)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to advance ticket number counter", e))
    }

    async fn insert(&self, record: &TicketRecord) -> Result<()> {
        let t = record.ticket();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| handle_db_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, ticket_number, subject, description, priority, requester_name, resident_id,
                contact_number, email_address, complete_address, category, status, version,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(t.id)
        .bind(&t.ticket_number)
        .bind(&t.subject)
        .bind(&t.description)
        .bind(t.priority)
        .bind(&t.requester_name)
        .bind(t.resident_id)
        .bind(&t.contact_number)
        .bind(&t.email_address)
        .bind(&t.complete_address)
        .bind(t.category)
        .bind(t.status)
        .bind(t.version)
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| handle_db_error("Failed to insert ticket", e))?;

        Self::insert_extension(&mut tx, record.extension())
            .await
            .map_err(|e| handle_db_error("Failed to insert ticket extension", e))?;

        tx.commit()
            .await
            .map_err(|e| handle_db_error("Failed to commit ticket insert", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketRecord>> {
        let sql = format!("SELECT {} FROM tickets WHERE id = $1", TICKET_COLUMNS);
        let ticket = sqlx::query_as::<_, BaseTicket>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to get ticket by ID", e))?;

        match ticket {
            Some(ticket) => Ok(self.load_extensions(vec![ticket]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_number(&self, ticket_number: &str) -> Result<Option<TicketRecord>> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE ticket_number = $1",
            TICKET_COLUMNS
        );
        let ticket = sqlx::query_as::<_, BaseTicket>(&sql)
            .bind(ticket_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to get ticket by number", e))?;

        match ticket {
            Some(ticket) => Ok(self.load_extensions(vec![ticket]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Option<TicketRecord>> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE id = (SELECT base_ticket_id FROM appointments WHERE id = $1)",
            TICKET_COLUMNS
        );
        let ticket = sqlx::query_as::<_, BaseTicket>(&sql)
            .bind(appointment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to get ticket by appointment", e))?;

        match ticket {
            Some(ticket) => Ok(self.load_extensions(vec![ticket]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TicketRecord>, i64)> {
        let sql = format!(
            r#"
            SELECT {} FROM tickets
            WHERE ($1::ticket_category IS NULL OR category = $1)
              AND ($2::ticket_status IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
            TICKET_COLUMNS
        );
        let tickets = sqlx::query_as::<_, BaseTicket>(&sql)
            .bind(filter.category)
            .bind(filter.status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error("Failed to list tickets", e))?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tickets
            WHERE ($1::ticket_category IS NULL OR category = $1)
              AND ($2::ticket_status IS NULL OR status = $2)
            "#,
        )
        .bind(filter.category)
        .bind(filter.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to count tickets", e))?;

        Ok((self.load_extensions(tickets).await?, total))
    }

    async fn update(&self, record: &TicketRecord, expected_version: i32) -> Result<bool> {
        let t = record.ticket();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| handle_db_error("Failed to begin transaction", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE tickets SET
                subject = $3, description = $4, priority = $5, requester_name = $6,
                resident_id = $7, contact_number = $8, email_address = $9,
                complete_address = $10, status = $11, version = $12, updated_at = $13
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(t.id)
        .bind(expected_version)
        .bind(&t.subject)
        .bind(&t.description)
        .bind(t.priority)
        .bind(&t.requester_name)
        .bind(t.resident_id)
        .bind(&t.contact_number)
        .bind(&t.email_address)
        .bind(&t.complete_address)
        .bind(t.status)
        .bind(t.version)
        .bind(t.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| handle_db_error("Failed to update ticket", e))?;

        if updated.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| handle_db_error("Failed to roll back ticket update", e))?;
            return Ok(false);
        }

        Self::update_extension(&mut tx, record.extension())
            .await
            .map_err(|e| handle_db_error("Failed to update ticket extension", e))?;

        tx.commit()
            .await
            .map_err(|e| handle_db_error("Failed to commit ticket update", e))?;

        Ok(true)
    }

    async fn count_by_status_and_category(&self) -> Result<Vec<StatusCategoryCount>> {
        let rows = sqlx::query_as::<_, (TicketStatus, TicketCategory, i64)>(
            "SELECT status, category, COUNT(*) FROM tickets GROUP BY status, category",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to count tickets", e))?;

        Ok(rows
            .into_iter()
            .map(|(status, category, count)| StatusCategoryCount {
                status,
                category,
                count,
            })
            .collect())
    }

    async fn count_appointments_by_status(&self) -> Result<Vec<AppointmentStatusCount>> {
        let rows = sqlx::query_as::<_, (AppointmentStatus, i64)>(
            "SELECT status, COUNT(*) FROM appointments GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error("Failed to count appointments", e))?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| AppointmentStatusCount { status, count })
            .collect())
    }
}
