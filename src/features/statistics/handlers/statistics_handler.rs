use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::guards::RequireDeskOfficer;
use crate::features::statistics::dtos::TicketStatisticsDto;
use crate::features::statistics::services::StatisticsService;
use crate::shared::types::ApiResponse;

/// Ticket counts per status, category and appointment status
#[utoipa::path(
    get,
    path = "/api/tickets/statistics",
    responses(
        (status = 200, description = "Current ticket statistics", body = ApiResponse<TicketStatisticsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Desk officer access required")
    ),
    tag = "statistics",
    security(("bearer_auth" = []))
)]
pub async fn get_ticket_statistics(
    RequireDeskOfficer(_user): RequireDeskOfficer,
    State(service): State<Arc<StatisticsService>>,
) -> Result<Json<ApiResponse<TicketStatisticsDto>>> {
    let stats = service.get_statistics().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
