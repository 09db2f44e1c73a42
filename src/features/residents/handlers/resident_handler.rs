use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::auth::guards::RequireResident;
use crate::features::residents::dtos::{ResidentLookupDto, ResolveResidentQuery};
use crate::features::residents::services::ResidentDirectory;
use crate::shared::types::ApiResponse;
use crate::shared::validation::non_blank;

/// Resolve a search term to a resident id
#[utoipa::path(
    get,
    path = "/api/residents/resolve",
    params(ResolveResidentQuery),
    responses(
        (status = 200, description = "Lookup result (resident_id is null when nothing matched)", body = ApiResponse<ResidentLookupDto>),
        (status = 400, description = "Missing search term"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Resident directory unavailable")
    ),
    tag = "residents",
    security(("bearer_auth" = []))
)]
pub async fn resolve_resident(
    RequireResident(_user): RequireResident,
    State(directory): State<Arc<dyn ResidentDirectory>>,
    AppQuery(query): AppQuery<ResolveResidentQuery>,
) -> Result<Json<ApiResponse<ResidentLookupDto>>> {
    let term = non_blank(&query.q)
        .ok_or_else(|| AppError::field("q", "Search term is required"))?
        .to_string();

    let resident_id = directory.resolve(&term).await?;

    Ok(Json(ApiResponse::success(
        Some(ResidentLookupDto {
            search_term: term,
            resident_id,
        }),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use uuid::Uuid;

    use super::*;
    use crate::features::residents::routes;
    use crate::shared::test_helpers::{with_resident_auth, StaticResidentDirectory};

    fn server() -> (TestServer, Uuid) {
        let id = Uuid::now_v7();
        let directory: Arc<dyn ResidentDirectory> =
            Arc::new(StaticResidentDirectory::new(&[("Juan Dela Cruz", id)]));
        let app = with_resident_auth(routes::routes(directory));
        (TestServer::new(app).unwrap(), id)
    }

    #[tokio::test]
    async fn test_resolve_known_resident() {
        let (server, id) = server();
        let response = server
            .get("/api/residents/resolve")
            .add_query_param("q", "Juan Dela Cruz")
            .await;

        response.assert_status_ok();
        let body: ApiResponse<ResidentLookupDto> = response.json();
        assert_eq!(body.data.unwrap().resident_id, Some(id));
    }

    #[tokio::test]
    async fn test_unknown_resident_is_null() {
        let (server, _) = server();
        let response = server
            .get("/api/residents/resolve")
            .add_query_param("q", "Nobody")
            .await;

        response.assert_status_ok();
        let body: ApiResponse<ResidentLookupDto> = response.json();
        assert_eq!(body.data.unwrap().resident_id, None);
    }

    #[tokio::test]
    async fn test_blank_term_is_rejected() {
        let (server, _) = server();
        let response = server
            .get("/api/residents/resolve")
            .add_query_param("q", "  ")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
