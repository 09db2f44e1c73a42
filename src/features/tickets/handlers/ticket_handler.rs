use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::{RequireDeskOfficer, RequireResident};
use crate::features::tickets::dtos::{
    TicketEnvelopeDto, TicketEnvelopeResponseDto, TicketListQuery, TransitionStatusDto,
    UploadDocumentDto,
};
use crate::features::tickets::repositories::TicketFilter;
use crate::features::tickets::services::TicketService;
use crate::modules::storage::UploadedFile;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Create a ticket of any category
///
/// The body carries `ticket` plus exactly one of `appointment`, `blotter`,
/// `complaint` or `suggestion`, matching `ticket.category`.
#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = TicketEnvelopeDto,
    responses(
        (status = 201, description = "Ticket created", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 400, description = "Validation failed; errors list every rejected field"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Appointment slot already booked")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn create_ticket(
    RequireResident(user): RequireResident,
    State(service): State<Arc<TicketService>>,
    AppJson(envelope): AppJson<TicketEnvelopeDto>,
) -> Result<(StatusCode, Json<ApiResponse<TicketEnvelopeResponseDto>>)> {
    let record = service.create(&envelope).await?;
    debug!(
        "Ticket {} filed by {}",
        record.ticket().ticket_number,
        user.sub
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(record.into()),
            Some("Ticket created successfully".to_string()),
            None,
        )),
    ))
}

/// List tickets, newest first
#[utoipa::path(
    get,
    path = "/api/tickets",
    params(TicketListQuery, PaginationQuery),
    responses(
        (status = 200, description = "Tickets with total count in meta", body = ApiResponse<Vec<TicketEnvelopeResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn list_tickets(
    RequireResident(_user): RequireResident,
    State(service): State<Arc<TicketService>>,
    AppQuery(query): AppQuery<TicketListQuery>,
    AppQuery(pagination): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<TicketEnvelopeResponseDto>>>> {
    let filter = TicketFilter {
        category: query.category,
        status: query.status,
    };
    let (records, total) = service.list(filter, &pagination).await?;
    let items = records.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a ticket with its category details
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket found", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn get_ticket(
    RequireResident(_user): RequireResident,
    State(service): State<Arc<TicketService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    let record = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(record.into()), None, None)))
}

/// Get a ticket by its ticket number
#[utoipa::path(
    get,
    path = "/api/tickets/number/{ticket_number}",
    params(
        ("ticket_number" = String, Path, description = "Ticket number (e.g., APT-2025-0621-001)")
    ),
    responses(
        (status = 200, description = "Ticket found", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn get_ticket_by_number(
    RequireResident(_user): RequireResident,
    State(service): State<Arc<TicketService>>,
    Path(ticket_number): Path<String>,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    let record = service.get_by_number(&ticket_number).await?;
    Ok(Json(ApiResponse::success(Some(record.into()), None, None)))
}

/// Replace a ticket's editable fields
///
/// The category cannot change, and appointment slots move only through
/// the reschedule endpoint.
#[utoipa::path(
    put,
    path = "/api/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = TicketEnvelopeDto,
    responses(
        (status = 200, description = "Ticket updated", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Ticket was modified concurrently")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn update_ticket(
    RequireResident(_user): RequireResident,
    State(service): State<Arc<TicketService>>,
    Path(id): Path<Uuid>,
    AppJson(envelope): AppJson<TicketEnvelopeDto>,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    let record = service.update(id, &envelope).await?;
    Ok(Json(ApiResponse::success(
        Some(record.into()),
        Some("Ticket updated successfully".to_string()),
        None,
    )))
}

/// Move a ticket through its lifecycle
#[utoipa::path(
    patch,
    path = "/api/tickets/{id}/status",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = TransitionStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 403, description = "Desk officer access required"),
        (status = 404, description = "Ticket not found"),
        (status = 422, description = "Transition not allowed from the current status")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn transition_ticket(
    RequireDeskOfficer(user): RequireDeskOfficer,
    State(service): State<Arc<TicketService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<TransitionStatusDto>,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    let record = service
        .transition(id, dto.status, dto.note.as_deref())
        .await?;
    debug!("Ticket {} moved to {} by {}", id, dto.status, user.sub);

    Ok(Json(ApiResponse::success(
        Some(record.into()),
        Some(format!("Ticket moved to {}", dto.status)),
        None,
    )))
}

/// Attach a supporting document to a blotter
///
/// Accepts multipart/form-data with a single `file` part.
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/documents",
    params(("id" = Uuid, Path, description = "Blotter ticket ID")),
    request_body(
        content = UploadDocumentDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Document attached", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 400, description = "Missing, oversized or disallowed file, or not a blotter"),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn attach_document(
    RequireResident(_user): RequireResident,
    State(service): State<Arc<TicketService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "document".to_string());
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        file = Some(UploadedFile {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    let file = file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let record = service.attach_document(id, file).await?;

    Ok(Json(ApiResponse::success(
        Some(record.into()),
        Some("Document attached".to_string()),
        None,
    )))
}
