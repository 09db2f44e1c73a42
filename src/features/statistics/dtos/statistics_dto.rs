use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Every key of each map is present, with zero for empty groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketStatisticsDto {
    pub total: i64,
    /// Keyed by ticket status (OPEN, IN_PROGRESS, ...)
    pub by_status: BTreeMap<String, i64>,
    /// Keyed by ticket category (APPOINTMENT, BLOTTER, ...)
    pub by_category: BTreeMap<String, i64>,
    /// Keyed by appointment status (PENDING, CONFIRMED, ...)
    pub appointments_by_status: BTreeMap<String, i64>,
}
