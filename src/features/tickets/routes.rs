use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::features::tickets::handlers;
use crate::features::tickets::services::TicketService;
use crate::shared::constants::MAX_DOCUMENT_SIZE;

/// Ticket routes; every handler requires an authenticated caller
pub fn routes(service: Arc<TicketService>) -> Router {
    Router::new()
        .route(
            "/api/tickets",
            post(handlers::create_ticket).get(handlers::list_tickets),
        )
        .route(
            "/api/tickets/{id}",
            get(handlers::get_ticket).put(handlers::update_ticket),
        )
        .route(
            "/api/tickets/number/{ticket_number}",
            get(handlers::get_ticket_by_number),
        )
        .route(
            "/api/tickets/{id}/status",
            patch(handlers::transition_ticket),
        )
        .route(
            "/api/tickets/{id}/documents",
            post(handlers::attach_document)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_SIZE + 1024 * 1024)),
        )
        .with_state(service)
}
