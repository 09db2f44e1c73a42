use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::error::{AppError, FieldError, Result};
use crate::features::appointments::models::{Department, SlotKey, TimeSlot};
use crate::features::appointments::schedule::ScheduleIndex;
use crate::features::tickets::models::{
    Appointment, AppointmentStatus, ExtensionFields, FollowUpNote, TicketRecord, ValidatedTicket,
};
use crate::features::tickets::services::{TicketLifecycle, TicketStore};
use crate::modules::notifications::{Notifier, TicketEvent, TicketEventKind};

/// Booking and lifecycle operations for appointment tickets.
///
/// The schedule index and the ticket store are kept consistent by ordering:
/// a slot is reserved before any row that claims it is written, and a slot
/// is released only after the row stopped claiming it. Failed writes undo
/// the reservation they made.
pub struct AppointmentScheduler {
    store: Arc<TicketStore>,
    schedule: Arc<dyn ScheduleIndex>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl AppointmentScheduler {
    pub fn new(
        store: Arc<TicketStore>,
        schedule: Arc<dyn ScheduleIndex>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            schedule,
            notifier,
            clock,
            offset,
        }
    }

    /// Office wall-clock time
    fn local_now(&self) -> NaiveDateTime {
        self.clock.now().with_timezone(&self.offset).naive_local()
    }

    /// Bookable slots for a department and day. Past days have none, and on
    /// the current day slots that already started are left out.
    pub async fn get_available_slots(
        &self,
        department: Department,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        let now = self.local_now();
        if date < now.date() {
            return Ok(Vec::new());
        }

        let mut slots = self.schedule.list_available(department, date).await?;
        if date == now.date() {
            slots.retain(|slot| slot.starts_at(date) > now);
        }

        Ok(slots)
    }

    /// Validate the envelope and book it
    #[cfg(test)]
    pub async fn create_appointment(
        &self,
        envelope: &crate::features::tickets::dtos::TicketEnvelopeDto,
    ) -> Result<TicketRecord> {
        let validated = crate::features::tickets::services::CategoryValidators::validate(envelope)?;
        self.book(validated).await
    }

    /// Reserve the slot, then persist the ticket. Nothing is persisted unless
    /// the reservation succeeded, and the reservation is undone if persisting fails.
    pub async fn book(&self, validated: ValidatedTicket) -> Result<TicketRecord> {
        let ExtensionFields::Appointment(fields) = &validated.extension else {
            return Err(AppError::field(
                "ticket.category",
                "Only APPOINTMENT tickets can be booked",
            ));
        };
        let key = fields.slot_key();
        self.ensure_future(key, "appointment")?;

        let record = self.store.draft(validated)?;
        let appointment_id = appointment_of(&record)?.id;

        self.schedule.reserve(key, appointment_id).await?;

        let record = match self.store.insert(record).await {
            Ok(record) => record,
            Err(e) => {
                self.undo_reservation(key, appointment_id).await;
                return Err(e);
            }
        };

        tracing::info!(
            "Appointment booked: ticket={}, appointment={}, slot={}",
            record.ticket().ticket_number,
            appointment_id,
            key
        );
        self.emit(TicketEventKind::Created, &record);
        Ok(record)
    }

    pub async fn confirm_appointment(
        &self,
        appointment_id: Uuid,
        note: Option<String>,
    ) -> Result<TicketRecord> {
        let mut record = self.store.get_by_appointment(appointment_id).await?;
        let now = self.clock.now();

        let appointment = appointment_of_mut(&mut record)?;
        if appointment.status != AppointmentStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Appointment '{}' is {}; only PENDING appointments can be confirmed",
                appointment_id, appointment.status
            )));
        }
        appointment.status = AppointmentStatus::Confirmed;
        appointment.confirmation_note = note;
        appointment.confirmed_at = Some(now);

        TicketLifecycle::sync_with_appointment(&mut record)?;
        let record = self.store.save_transition(record).await?;

        tracing::info!(
            "Appointment confirmed: ticket={}, appointment={}",
            record.ticket().ticket_number,
            appointment_id
        );
        self.emit(TicketEventKind::Confirmed, &record);
        Ok(record)
    }

    /// Terminal. The ticket row stops claiming the slot first, then the slot is
    /// freed. A failed release is logged and does not fail the cancellation.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        reason: Option<String>,
    ) -> Result<TicketRecord> {
        let mut record = self.store.get_by_appointment(appointment_id).await?;
        let now = self.clock.now();

        let appointment = appointment_of_mut(&mut record)?;
        ensure_not_terminal(appointment, "cancelled")?;
        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancellation_reason = reason;
        appointment.cancelled_at = Some(now);
        let key = appointment.slot_key();

        TicketLifecycle::sync_with_appointment(&mut record)?;
        let record = self.store.save_transition(record).await?;

        // The cancellation is committed; a stale slot only blocks new bookings
        if let Err(e) = self.schedule.release(appointment_id).await {
            tracing::error!(
                "Appointment {} cancelled but slot {} was not released: {}",
                appointment_id,
                key,
                e
            );
        }

        tracing::info!(
            "Appointment cancelled: ticket={}, appointment={}, freed={}",
            record.ticket().ticket_number,
            appointment_id,
            key
        );
        self.emit(TicketEventKind::Cancelled, &record);
        Ok(record)
    }

    /// Move to another slot of the same department.
    ///
    /// The new slot is reserved first; only once the ticket points at it is
    /// the old slot released. A failed reservation leaves the appointment on
    /// its original slot. Once the move is saved, failing to release the old
    /// slot is logged rather than returned.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        date: NaiveDate,
        time: TimeSlot,
    ) -> Result<TicketRecord> {
        let mut record = self.store.get_by_appointment(appointment_id).await?;

        let appointment = appointment_of_mut(&mut record)?;
        ensure_not_terminal(appointment, "rescheduled")?;
        let old_key = appointment.slot_key();
        let new_key = SlotKey::new(appointment.department, date, time);

        if new_key == old_key {
            return Ok(record);
        }
        self.ensure_future(new_key, "")?;

        self.schedule.reserve(new_key, appointment_id).await?;

        appointment.date = date;
        appointment.time = time;

        let record = match self.store.save_transition(record).await {
            Ok(record) => record,
            Err(e) => {
                self.undo_reservation(new_key, appointment_id).await;
                return Err(e);
            }
        };

        if let Err(e) = self.schedule.release_slot(old_key, appointment_id).await {
            tracing::error!(
                "Appointment {} moved to {} but {} was not released: {}",
                appointment_id,
                new_key,
                old_key,
                e
            );
        }

        tracing::info!(
            "Appointment rescheduled: ticket={}, appointment={}, from={}, to={}",
            record.ticket().ticket_number,
            appointment_id,
            old_key,
            new_key
        );
        self.emit(TicketEventKind::Rescheduled, &record);
        Ok(record)
    }

    /// Terminal. The slot record is kept as history.
    pub async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        notes: Option<String>,
    ) -> Result<TicketRecord> {
        let mut record = self.store.get_by_appointment(appointment_id).await?;
        let now = self.clock.now();

        let appointment = appointment_of_mut(&mut record)?;
        if appointment.status != AppointmentStatus::Confirmed {
            return Err(AppError::InvalidTransition(format!(
                "Appointment '{}' is {}; only CONFIRMED appointments can be completed",
                appointment_id, appointment.status
            )));
        }
        appointment.status = AppointmentStatus::Completed;
        appointment.completion_notes = notes;
        appointment.completed_at = Some(now);

        TicketLifecycle::sync_with_appointment(&mut record)?;
        let record = self.store.save_transition(record).await?;

        tracing::info!(
            "Appointment completed: ticket={}, appointment={}",
            record.ticket().ticket_number,
            appointment_id
        );
        Ok(record)
    }

    /// Append a note; status and slot are untouched
    pub async fn add_follow_up(&self, appointment_id: Uuid, note: String) -> Result<TicketRecord> {
        let note = note.trim().to_string();
        if note.is_empty() {
            return Err(AppError::field("note", "Note is required"));
        }

        let mut record = self.store.get_by_appointment(appointment_id).await?;
        let created_at = self.clock.now();
        appointment_of_mut(&mut record)?
            .follow_ups
            .push(FollowUpNote { note, created_at });

        let record = self.store.save_edit(record).await?;

        tracing::info!(
            "Follow-up added: ticket={}, appointment={}",
            record.ticket().ticket_number,
            appointment_id
        );
        Ok(record)
    }

    /// Reject slots whose start is not in the future
    fn ensure_future(&self, key: SlotKey, prefix: &str) -> Result<()> {
        let now = self.local_now();
        if key.time.starts_at(key.date) > now {
            return Ok(());
        }

        let field = if key.date < now.date() { "date" } else { "time" };
        let field = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        Err(AppError::Validation(vec![FieldError::new(
            field,
            format!("The {} slot has already passed", key),
        )]))
    }

    async fn undo_reservation(&self, key: SlotKey, appointment_id: Uuid) {
        if let Err(e) = self.schedule.release_slot(key, appointment_id).await {
            tracing::error!(
                "Failed to roll back reservation of {} for appointment {}: {}",
                key,
                appointment_id,
                e
            );
        }
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

fn appointment_of(record: &TicketRecord) -> Result<&Appointment> {
    record
        .appointment()
        .ok_or_else(|| AppError::Internal(format!("Ticket {} has no appointment", record.id())))
}

fn appointment_of_mut(record: &mut TicketRecord) -> Result<&mut Appointment> {
    let id = record.id();
    record
        .appointment_mut()
        .ok_or_else(|| AppError::Internal(format!("Ticket {} has no appointment", id)))
}

fn ensure_not_terminal(appointment: &Appointment, action: &str) -> Result<()> {
    if appointment.status.is_terminal() {
        return Err(AppError::InvalidTransition(format!(
            "Appointment '{}' is {} and can no longer be {}",
            appointment.id, appointment.status, action
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::features::appointments::schedule::InMemoryScheduleIndex;
    use crate::features::tickets::models::{TicketCategory, TicketStatus};
    use crate::features::tickets::repositories::{
        AppointmentStatusCount, InMemoryTicketRepository, StatusCategoryCount, TicketFilter,
        TicketRepository,
    };
    use crate::shared::test_helpers::{
        appointment_envelope, complaint_envelope, fixed_clock, utc_plus_8, RecordingNotifier,
    };
    use crate::shared::validation::ClosedSet;

    const ENGINEERING: &str = "Engineering Department";

    struct Harness {
        scheduler: Arc<AppointmentScheduler>,
        schedule: Arc<InMemoryScheduleIndex>,
        repository: Arc<InMemoryTicketRepository>,
        notifier: Arc<RecordingNotifier>,
    }

    /// Clock pinned to 2025-06-21 09:30 local time (UTC+8)
    fn harness() -> Harness {
        harness_at("2025-06-21T01:30:00Z")
    }

    fn harness_at(now: &str) -> Harness {
        let clock = fixed_clock(now);
        let repository = Arc::new(InMemoryTicketRepository::new());
        let schedule = Arc::new(InMemoryScheduleIndex::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let store = Arc::new(TicketStore::new(
            repository.clone(),
            clock.clone(),
            utc_plus_8(),
        ));
        let scheduler = Arc::new(AppointmentScheduler::new(
            store,
            schedule.clone(),
            notifier.clone(),
            clock,
            utc_plus_8(),
        ));
        Harness {
            scheduler,
            schedule,
            repository,
            notifier,
        }
    }

    fn day(d: &str) -> NaiveDate {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()
    }

    fn slot(d: &str, time: TimeSlot) -> SlotKey {
        SlotKey::new(Department::Engineering, day(d), time)
    }

    async fn book(h: &Harness, date: &str, time: &str) -> TicketRecord {
        h.scheduler
            .create_appointment(&appointment_envelope(ENGINEERING, date, time))
            .await
            .unwrap()
    }

    fn appointment_id(record: &TicketRecord) -> Uuid {
        record.appointment().unwrap().id
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_concurrent_bookings_for_one_slot() {
        let h = harness();
        let envelope = appointment_envelope(ENGINEERING, "2025-06-21", "10:00");

        let first = {
            let scheduler = h.scheduler.clone();
            let envelope = envelope.clone();
            tokio::spawn(async move { scheduler.create_appointment(&envelope).await })
        };
        let second = {
            let scheduler = h.scheduler.clone();
            tokio::spawn(async move { scheduler.create_appointment(&envelope).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let created: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::Conflict(_))))
            .count();

        assert_eq!(created.len(), 1);
        assert_eq!(conflicts, 1);
        let appointment = created[0].appointment().unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(created[0].status(), TicketStatus::Pending);
        assert_eq!(h.repository.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_many_concurrent_bookings_yield_one_winner() {
        let h = harness();
        let attempts: Vec<_> = (0..20)
            .map(|_| {
                let scheduler = h.scheduler.clone();
                tokio::spawn(async move {
                    scheduler
                        .create_appointment(&appointment_envelope(ENGINEERING, "2025-06-24", "13:00"))
                        .await
                })
            })
            .collect();

        let mut wins = 0;
        let mut conflicts = 0;
        for outcome in futures::future::join_all(attempts).await {
            match outcome.unwrap() {
                Ok(_) => wins += 1,
                Err(AppError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }
        assert_eq!((wins, conflicts), (1, 19));
        assert_eq!(h.repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_booking_rejects_past_slots() {
        let h = harness();
        // 09:00 already started at 09:30 local
        let err = h
            .scheduler
            .create_appointment(&appointment_envelope(ENGINEERING, "2025-06-21", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f[0].field == "appointment.time"));

        let err = h
            .scheduler
            .create_appointment(&appointment_envelope(ENGINEERING, "2025-06-20", "15:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f[0].field == "appointment.date"));
        assert_eq!(h.repository.len().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_envelope_reserves_nothing() {
        let h = harness();
        let mut envelope = appointment_envelope(ENGINEERING, "2025-06-23", "10:00");
        envelope.ticket.as_mut().unwrap().subject = None;

        assert!(matches!(
            h.scheduler.create_appointment(&envelope).await,
            Err(AppError::Validation(_))
        ));
        assert!(h
            .schedule
            .is_available(slot("2025-06-23", TimeSlot::TenAm))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_only_appointments_are_booked() {
        let h = harness();
        let err = h
            .scheduler
            .create_appointment(&complaint_envelope())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f[0].field == "ticket.category"));
    }

    /// Delegates to the in-memory repository; inserts can be made to fail and
    /// updates to report a concurrent write
    struct FaultyRepository {
        inner: InMemoryTicketRepository,
        fail_inserts: AtomicBool,
        stale_updates: AtomicBool,
    }

    impl FaultyRepository {
        fn new() -> Self {
            Self {
                inner: InMemoryTicketRepository::new(),
                fail_inserts: AtomicBool::new(false),
                stale_updates: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl TicketRepository for FaultyRepository {
        async fn next_ticket_sequence(&self, category: TicketCategory, day: NaiveDate) -> Result<i32> {
            self.inner.next_ticket_sequence(category, day).await
        }
        async fn insert(&self, record: &TicketRecord) -> Result<()> {
            if self.fail_inserts.load(Ordering::SeqCst) {
                return Err(AppError::Internal("disk full".to_string()));
            }
            self.inner.insert(record).await
        }
        async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketRecord>> {
            self.inner.find_by_id(id).await
        }
        async fn find_by_number(&self, n: &str) -> Result<Option<TicketRecord>> {
            self.inner.find_by_number(n).await
        }
        async fn find_by_appointment(&self, id: Uuid) -> Result<Option<TicketRecord>> {
            self.inner.find_by_appointment(id).await
        }
        async fn list(
            &self,
            filter: TicketFilter,
            limit: i64,
            offset: i64,
        ) -> Result<(Vec<TicketRecord>, i64)> {
            self.inner.list(filter, limit, offset).await
        }
        async fn update(&self, record: &TicketRecord, expected: i32) -> Result<bool> {
            if self.stale_updates.load(Ordering::SeqCst) {
                return Ok(false);
            }
            self.inner.update(record, expected).await
        }
        async fn count_by_status_and_category(&self) -> Result<Vec<StatusCategoryCount>> {
            self.inner.count_by_status_and_category().await
        }
        async fn count_appointments_by_status(&self) -> Result<Vec<AppointmentStatusCount>> {
            self.inner.count_appointments_by_status().await
        }
    }

    /// Reserves through the in-memory index but cannot free anything
    struct StuckSlots(Arc<InMemoryScheduleIndex>);

    #[async_trait]
    impl ScheduleIndex for StuckSlots {
        async fn reserve(&self, key: SlotKey, appointment_id: Uuid) -> Result<()> {
            self.0.reserve(key, appointment_id).await
        }
        async fn release(&self, _appointment_id: Uuid) -> Result<()> {
            Err(AppError::Internal("schedule store unavailable".to_string()))
        }
        async fn release_slot(&self, _key: SlotKey, _appointment_id: Uuid) -> Result<()> {
            Err(AppError::Internal("schedule store unavailable".to_string()))
        }
        async fn reserved_slots(
            &self,
            department: Department,
            date: NaiveDate,
        ) -> Result<Vec<TimeSlot>> {
            self.0.reserved_slots(department, date).await
        }
    }

    fn scheduler_with(
        repository: Arc<dyn TicketRepository>,
        schedule: Arc<dyn ScheduleIndex>,
    ) -> AppointmentScheduler {
        let clock = fixed_clock("2025-06-21T01:30:00Z");
        let store = Arc::new(TicketStore::new(repository, clock.clone(), utc_plus_8()));
        AppointmentScheduler::new(
            store,
            schedule,
            Arc::new(RecordingNotifier::default()),
            clock,
            utc_plus_8(),
        )
    }

    #[tokio::test]
    async fn test_failed_insert_releases_the_reservation() {
        let repository = Arc::new(FaultyRepository::new());
        repository.fail_inserts.store(true, Ordering::SeqCst);
        let schedule = Arc::new(InMemoryScheduleIndex::new());
        let scheduler = scheduler_with(repository, schedule.clone());

        let err = scheduler
            .create_appointment(&appointment_envelope(ENGINEERING, "2025-06-23", "10:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(schedule
            .is_available(slot("2025-06-23", TimeSlot::TenAm))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_stale_reschedule_gives_back_the_new_slot() {
        let repository = Arc::new(FaultyRepository::new());
        let schedule = Arc::new(InMemoryScheduleIndex::new());
        let scheduler = scheduler_with(repository.clone(), schedule.clone());
        let booked = scheduler
            .create_appointment(&appointment_envelope(ENGINEERING, "2025-06-23", "08:00"))
            .await
            .unwrap();
        let id = appointment_id(&booked);

        repository.stale_updates.store(true, Ordering::SeqCst);
        let err = scheduler
            .reschedule_appointment(id, day("2025-06-24"), TimeSlot::NineAm)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        assert_eq!(
            schedule.held_by(id).await,
            vec![slot("2025-06-23", TimeSlot::EightAm)]
        );
        let stored = scheduler.store.get_by_appointment(id).await.unwrap();
        assert_eq!(
            stored.appointment().unwrap().slot_key(),
            slot("2025-06-23", TimeSlot::EightAm)
        );
    }

    #[tokio::test]
    async fn test_committed_changes_survive_a_failed_release() {
        let inner = Arc::new(InMemoryScheduleIndex::new());
        let scheduler = scheduler_with(
            Arc::new(InMemoryTicketRepository::new()),
            Arc::new(StuckSlots(inner.clone())),
        );

        let moving = scheduler
            .create_appointment(&appointment_envelope(ENGINEERING, "2025-06-23", "08:00"))
            .await
            .unwrap();
        let id = appointment_id(&moving);
        let moved = scheduler
            .reschedule_appointment(id, day("2025-06-24"), TimeSlot::NineAm)
            .await
            .unwrap();
        assert_eq!(
            moved.appointment().unwrap().slot_key(),
            slot("2025-06-24", TimeSlot::NineAm)
        );
        let stored = scheduler.store.get_by_appointment(id).await.unwrap();
        assert_eq!(
            stored.appointment().unwrap().slot_key(),
            slot("2025-06-24", TimeSlot::NineAm)
        );
        assert!(inner
            .held_by(id)
            .await
            .contains(&slot("2025-06-24", TimeSlot::NineAm)));

        let cancelling = scheduler
            .create_appointment(&appointment_envelope(ENGINEERING, "2025-06-23", "10:00"))
            .await
            .unwrap();
        let id = appointment_id(&cancelling);
        let cancelled = scheduler.cancel_appointment(id, None).await.unwrap();
        assert_eq!(
            cancelled.appointment().unwrap().status,
            AppointmentStatus::Cancelled
        );
        let stored = scheduler.store.get_by_appointment(id).await.unwrap();
        assert_eq!(stored.status(), TicketStatus::Closed);
    }

    #[tokio::test]
    async fn test_confirm_then_complete() {
        let h = harness();
        let booked = book(&h, "2025-06-23", "10:00").await;
        let id = appointment_id(&booked);

        let confirmed = h
            .scheduler
            .confirm_appointment(id, Some("Bring valid ID".to_string()))
            .await
            .unwrap();
        assert_eq!(confirmed.status(), TicketStatus::InProgress);
        let appointment = confirmed.appointment().unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(appointment.confirmation_note.as_deref(), Some("Bring valid ID"));
        assert!(appointment.confirmed_at.is_some());

        assert!(matches!(
            h.scheduler.confirm_appointment(id, None).await,
            Err(AppError::InvalidTransition(_))
        ));

        let completed = h
            .scheduler
            .complete_appointment(id, Some("Permit issued".to_string()))
            .await
            .unwrap();
        assert_eq!(completed.status(), TicketStatus::Resolved);
        assert_eq!(
            completed.appointment().unwrap().status,
            AppointmentStatus::Completed
        );
        // history kept
        assert_eq!(
            h.schedule.holder(slot("2025-06-23", TimeSlot::TenAm)).await,
            Some(id)
        );
    }

    #[tokio::test]
    async fn test_complete_requires_confirmation() {
        let h = harness();
        let booked = book(&h, "2025-06-23", "11:00").await;
        assert!(matches!(
            h.scheduler
                .complete_appointment(appointment_id(&booked), None)
                .await,
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_confirmed_appointment_frees_slot() {
        let h = harness();
        let booked = book(&h, "2025-06-23", "15:00").await;
        let id = appointment_id(&booked);
        h.scheduler.confirm_appointment(id, None).await.unwrap();

        let before = h
            .scheduler
            .get_available_slots(Department::Engineering, day("2025-06-23"))
            .await
            .unwrap();
        assert!(!before.contains(&TimeSlot::ThreePm));

        let cancelled = h
            .scheduler
            .cancel_appointment(id, Some("Schedule conflict".to_string()))
            .await
            .unwrap();
        assert_eq!(cancelled.status(), TicketStatus::Closed);
        assert_eq!(
            cancelled.appointment().unwrap().status,
            AppointmentStatus::Cancelled
        );

        let after = h
            .scheduler
            .get_available_slots(Department::Engineering, day("2025-06-23"))
            .await
            .unwrap();
        assert!(after.contains(&TimeSlot::ThreePm));

        assert!(matches!(
            h.scheduler.cancel_appointment(id, None).await,
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_reschedule_moves_to_the_new_slot_only() {
        let h = harness();
        let booked = book(&h, "2025-06-23", "08:00").await;
        let id = appointment_id(&booked);

        let moved = h
            .scheduler
            .reschedule_appointment(id, day("2025-06-24"), TimeSlot::FourPm)
            .await
            .unwrap();
        let appointment = moved.appointment().unwrap();
        assert_eq!(appointment.date, day("2025-06-24"));
        assert_eq!(appointment.time, TimeSlot::FourPm);
        assert_eq!(appointment.status, AppointmentStatus::Pending);

        assert_eq!(
            h.schedule.held_by(id).await,
            vec![slot("2025-06-24", TimeSlot::FourPm)]
        );
    }

    #[tokio::test]
    async fn test_reschedule_into_taken_slot_keeps_original() {
        let h = harness();
        let mine = book(&h, "2025-06-23", "08:00").await;
        book(&h, "2025-06-23", "13:00").await;
        let id = appointment_id(&mine);

        let err = h
            .scheduler
            .reschedule_appointment(id, day("2025-06-23"), TimeSlot::OnePm)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        assert_eq!(
            h.schedule.held_by(id).await,
            vec![slot("2025-06-23", TimeSlot::EightAm)]
        );
        let stored = h.scheduler.store.get_by_appointment(id).await.unwrap();
        assert_eq!(stored.appointment().unwrap().time, TimeSlot::EightAm);
    }

    #[tokio::test]
    async fn test_reschedule_to_same_slot_is_a_no_op() {
        let h = harness();
        let booked = book(&h, "2025-06-23", "08:00").await;
        let same = h
            .scheduler
            .reschedule_appointment(appointment_id(&booked), day("2025-06-23"), TimeSlot::EightAm)
            .await
            .unwrap();
        assert_eq!(same.version(), booked.version());
    }

    #[tokio::test]
    async fn test_terminal_appointments_cannot_be_rescheduled() {
        let h = harness();
        let booked = book(&h, "2025-06-23", "08:00").await;
        let id = appointment_id(&booked);
        h.scheduler.cancel_appointment(id, None).await.unwrap();

        assert!(matches!(
            h.scheduler
                .reschedule_appointment(id, day("2025-06-25"), TimeSlot::NineAm)
                .await,
            Err(AppError::InvalidTransition(_))
        ));
        assert!(h.schedule.held_by(id).await.is_empty());
    }

    #[tokio::test]
    async fn test_follow_ups_append_without_status_change() {
        let h = harness();
        let booked = book(&h, "2025-06-23", "14:00").await;
        let id = appointment_id(&booked);

        h.scheduler
            .add_follow_up(id, "Called the resident".to_string())
            .await
            .unwrap();
        let record = h
            .scheduler
            .add_follow_up(id, "Documents received".to_string())
            .await
            .unwrap();

        let notes: Vec<&str> = record
            .appointment()
            .unwrap()
            .follow_ups
            .iter()
            .map(|f| f.note.as_str())
            .collect();
        assert_eq!(notes, vec!["Called the resident", "Documents received"]);
        assert_eq!(record.status(), TicketStatus::Pending);

        assert!(matches!(
            h.scheduler.add_follow_up(id, "   ".to_string()).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_appointment_is_not_found() {
        let h = harness();
        assert!(matches!(
            h.scheduler.confirm_appointment(Uuid::now_v7(), None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_available_slots_never_include_lunch() {
        let h = harness();
        book(&h, "2025-06-23", "10:00").await;

        let slots = h
            .scheduler
            .get_available_slots(Department::Engineering, day("2025-06-23"))
            .await
            .unwrap();
        let expected: Vec<TimeSlot> = TimeSlot::ALL
            .iter()
            .copied()
            .filter(|s| *s != TimeSlot::TenAm)
            .collect();
        assert_eq!(slots, expected);
        assert!(slots.iter().all(|s| s.as_str() != "12:00"));
    }

    #[tokio::test]
    async fn test_available_slots_today_skip_started_ones() {
        // 13:30 local
        let h = harness_at("2025-06-21T05:30:00Z");
        let slots = h
            .scheduler
            .get_available_slots(Department::Health, day("2025-06-21"))
            .await
            .unwrap();
        assert_eq!(
            slots,
            vec![
                TimeSlot::TwoPm,
                TimeSlot::ThreePm,
                TimeSlot::FourPm,
                TimeSlot::FivePm
            ]
        );
    }

    #[tokio::test]
    async fn test_notifications_are_emitted() {
        let h = harness();
        let booked = book(&h, "2025-06-23", "10:00").await;
        let id = appointment_id(&booked);
        h.scheduler.confirm_appointment(id, None).await.unwrap();
        h.scheduler
            .reschedule_appointment(id, day("2025-06-23"), TimeSlot::ElevenAm)
            .await
            .unwrap();
        h.scheduler.cancel_appointment(id, None).await.unwrap();

        assert_eq!(
            h.notifier.kinds(),
            vec![
                TicketEventKind::Created,
                TicketEventKind::Confirmed,
                TicketEventKind::Rescheduled,
                TicketEventKind::Cancelled,
            ]
        );
    }

    #[tokio::test]
    async fn test_available_slots_for_past_days_are_empty() {
        let h = harness();
        let slots = h
            .scheduler
            .get_available_slots(Department::Engineering, day("2025-06-20"))
            .await
            .unwrap();
        assert!(slots.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_racing_reschedule_leaves_consistent_slots() {
        let h = harness();
        let times = [
            TimeSlot::EightAm,
            TimeSlot::NineAm,
            TimeSlot::TenAm,
            TimeSlot::ElevenAm,
        ];

        for offset in 0..5 {
            let date = day("2025-06-23") + chrono::Days::new(offset);
            for time in times {
                let booked = h
                    .scheduler
                    .create_appointment(&appointment_envelope(
                        ENGINEERING,
                        &date.to_string(),
                        time.as_str(),
                    ))
                    .await
                    .unwrap();
                let id = appointment_id(&booked);

                let cancel = {
                    let scheduler = h.scheduler.clone();
                    tokio::spawn(async move { scheduler.cancel_appointment(id, None).await })
                };
                let target = date + chrono::Days::new(7);
                let reschedule = {
                    let scheduler = h.scheduler.clone();
                    tokio::spawn(async move {
                        scheduler.reschedule_appointment(id, target, time).await
                    })
                };
                let (cancel, reschedule) = tokio::join!(cancel, reschedule);
                assert!(cancel.unwrap().is_ok() || reschedule.unwrap().is_ok());

                let stored = h.scheduler.store.get_by_appointment(id).await.unwrap();
                let appointment = stored.appointment().unwrap();
                let held = h.schedule.held_by(id).await;
                if appointment.status == AppointmentStatus::Cancelled {
                    assert!(held.is_empty(), "cancelled {} still holds {:?}", id, held);
                } else {
                    assert_eq!(held, vec![appointment.slot_key()]);
                }
            }
        }
    }
}
