use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::appointments::models::{Department, SlotKey, TimeSlot};
use crate::shared::validation::ClosedSet;

/// Authoritative map of booked (department, date, time) slots.
///
/// `reserve` is a compare-and-insert on the composite key: of any number of
/// concurrent callers for the same key exactly one succeeds, the rest get
/// `AppError::Conflict` immediately.
#[async_trait]
pub trait ScheduleIndex: Send + Sync {
    async fn reserve(&self, key: SlotKey, appointment_id: Uuid) -> Result<()>;

    /// Free every slot held by the appointment. Releasing nothing is not an error.
    async fn release(&self, appointment_id: Uuid) -> Result<()>;

    /// Free `key` only if `appointment_id` holds it
    async fn release_slot(&self, key: SlotKey, appointment_id: Uuid) -> Result<()>;

    /// Reserved start times for one department and day
    async fn reserved_slots(&self, department: Department, date: NaiveDate)
        -> Result<Vec<TimeSlot>>;

    /// Catalogue order, minus reserved slots
    async fn list_available(
        &self,
        department: Department,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        let reserved = self.reserved_slots(department, date).await?;
        Ok(TimeSlot::ALL
            .iter()
            .copied()
            .filter(|slot| !reserved.contains(slot))
            .collect())
    }
}
