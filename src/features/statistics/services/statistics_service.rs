use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::statistics::dtos::TicketStatisticsDto;
use crate::features::tickets::models::{AppointmentStatus, TicketCategory, TicketStatus};
use crate::features::tickets::repositories::{
    AppointmentStatusCount, StatusCategoryCount, TicketRepository,
};
use crate::shared::validation::ClosedSet;

pub struct StatisticsService {
    repository: Arc<dyn TicketRepository>,
}

impl StatisticsService {
    pub fn new(repository: Arc<dyn TicketRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_statistics(&self) -> Result<TicketStatisticsDto> {
        let counts = self.repository.count_by_status_and_category().await?;
        let appointments = self.repository.count_appointments_by_status().await?;
        Ok(aggregate(&counts, &appointments))
    }
}

fn zeroed<T: ClosedSet>() -> BTreeMap<String, i64> {
    T::ALL.iter().map(|v| (v.as_str().to_string(), 0)).collect()
}

/// Fold grouped counts into the zero-filled statistics shape
pub fn aggregate(
    counts: &[StatusCategoryCount],
    appointments: &[AppointmentStatusCount],
) -> TicketStatisticsDto {
    let mut by_status = zeroed::<TicketStatus>();
    let mut by_category = zeroed::<TicketCategory>();
    let mut appointments_by_status = zeroed::<AppointmentStatus>();
    let mut total = 0;

    for row in counts {
        total += row.count;
        *by_status.entry(row.status.as_str().to_string()).or_default() += row.count;
        *by_category
            .entry(row.category.as_str().to_string())
            .or_default() += row.count;
    }

    for row in appointments {
        *appointments_by_status
            .entry(row.status.as_str().to_string())
            .or_default() += row.count;
    }

    TicketStatisticsDto {
        total,
        by_status,
        by_category,
        appointments_by_status,
    }
}
