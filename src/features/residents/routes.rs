use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::residents::handlers;
use crate::features::residents::services::ResidentDirectory;

pub fn routes(directory: Arc<dyn ResidentDirectory>) -> Router {
    Router::new()
        .route("/api/residents/resolve", get(handlers::resolve_resident))
        .with_state(directory)
}
