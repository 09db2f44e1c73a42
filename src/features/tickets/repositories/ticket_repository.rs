use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::tickets::models::{
    AppointmentStatus, TicketCategory, TicketRecord, TicketStatus,
};

/// Optional filters for listing tickets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub category: Option<TicketCategory>,
    pub status: Option<TicketStatus>,
}

#[cfg(test)]
impl TicketFilter {
    pub fn matches(&self, record: &TicketRecord) -> bool {
        self.category.map_or(true, |c| c == record.category())
            && self.status.map_or(true, |s| s == record.status())
    }
}

/// Grouped ticket counts, one entry per non-empty (status, category) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCategoryCount {
    pub status: TicketStatus,
    pub category: TicketCategory,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentStatusCount {
    pub status: AppointmentStatus,
    pub count: i64,
}

/// Persistence of a base ticket together with its extension.
///
/// Every write covers both rows or neither.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Next value of the per-(category, day) ticket number counter, starting at 1
    async fn next_ticket_sequence(&self, category: TicketCategory, day: NaiveDate) -> Result<i32>;

    async fn insert(&self, record: &TicketRecord) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TicketRecord>>;

    async fn find_by_number(&self, ticket_number: &str) -> Result<Option<TicketRecord>>;

    async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Option<TicketRecord>>;

    /// Newest first, with the total number of matching tickets
    async fn list(
        &self,
        filter: TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TicketRecord>, i64)>;

    /// Write `record` only if the stored version still equals `expected_version`.
    ///
    /// Returns `false` when another write got there first.
    async fn update(&self, record: &TicketRecord, expected_version: i32) -> Result<bool>;

    async fn count_by_status_and_category(&self) -> Result<Vec<StatusCategoryCount>>;

    async fn count_appointments_by_status(&self) -> Result<Vec<AppointmentStatusCount>>;
}
