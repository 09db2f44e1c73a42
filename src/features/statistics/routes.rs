use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::statistics::handlers;
use crate::features::statistics::services::StatisticsService;

pub fn routes(service: Arc<StatisticsService>) -> Router {
    Router::new()
        .route("/api/tickets/statistics", get(handlers::get_ticket_statistics))
        .with_state(service)
}
