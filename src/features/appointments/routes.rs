use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::appointments::handlers;
use crate::features::appointments::services::AppointmentScheduler;

pub fn routes(scheduler: Arc<AppointmentScheduler>) -> Router {
    Router::new()
        .route("/api/appointments/slots", get(handlers::get_available_slots))
        .route(
            "/api/appointments/{id}/confirm",
            post(handlers::confirm_appointment),
        )
        .route(
            "/api/appointments/{id}/cancel",
            post(handlers::cancel_appointment),
        )
        .route(
            "/api/appointments/{id}/reschedule",
            post(handlers::reschedule_appointment),
        )
        .route(
            "/api/appointments/{id}/complete",
            post(handlers::complete_appointment),
        )
        .route(
            "/api/appointments/{id}/follow-ups",
            post(handlers::add_follow_up),
        )
        .with_state(scheduler)
}
