use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::appointments::dtos::{
    AvailableSlotsQuery, AvailableSlotsResponseDto, CancelAppointmentDto, CompleteAppointmentDto,
    ConfirmAppointmentDto, FollowUpDto, RescheduleAppointmentDto,
};
use crate::features::appointments::services::AppointmentScheduler;
use crate::features::auth::guards::{RequireDeskOfficer, RequireResident};
use crate::features::tickets::dtos::TicketEnvelopeResponseDto;
use crate::shared::types::ApiResponse;
use crate::shared::validation::non_blank;

/// Free slots for a department on a day
///
/// Never includes 12:00. On the current day, slots that already started are left out.
#[utoipa::path(
    get,
    path = "/api/appointments/slots",
    params(AvailableSlotsQuery),
    responses(
        (status = 200, description = "Available slots in catalogue order", body = ApiResponse<AvailableSlotsResponseDto>),
        (status = 400, description = "Unknown department or malformed date"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn get_available_slots(
    RequireResident(_user): RequireResident,
    State(scheduler): State<Arc<AppointmentScheduler>>,
    AppQuery(query): AppQuery<AvailableSlotsQuery>,
) -> Result<Json<ApiResponse<AvailableSlotsResponseDto>>> {
    let (department, date) = query.parse()?;
    let slots = scheduler.get_available_slots(department, date).await?;

    Ok(Json(ApiResponse::success(
        Some(AvailableSlotsResponseDto {
            department,
            date,
            slots,
        }),
        None,
        None,
    )))
}

/// Confirm a pending appointment
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/confirm",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = ConfirmAppointmentDto,
    responses(
        (status = 200, description = "Appointment confirmed", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 403, description = "Desk officer access required"),
        (status = 404, description = "Appointment not found"),
        (status = 422, description = "Appointment is not pending")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn confirm_appointment(
    RequireDeskOfficer(user): RequireDeskOfficer,
    State(scheduler): State<Arc<AppointmentScheduler>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ConfirmAppointmentDto>,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    dto.validate()?;

    let record = scheduler
        .confirm_appointment(id, non_blank(&dto.note).map(str::to_string))
        .await?;
    tracing::debug!("Appointment {} confirmed by {}", id, user.sub);

    Ok(Json(ApiResponse::success(
        Some(record.into()),
        Some("Appointment confirmed".to_string()),
        None,
    )))
}

/// Cancel an appointment and free its slot
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/cancel",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = CancelAppointmentDto,
    responses(
        (status = 200, description = "Appointment cancelled", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 403, description = "Desk officer access required"),
        (status = 404, description = "Appointment not found"),
        (status = 422, description = "Appointment already completed or cancelled")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn cancel_appointment(
    RequireDeskOfficer(user): RequireDeskOfficer,
    State(scheduler): State<Arc<AppointmentScheduler>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CancelAppointmentDto>,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    dto.validate()?;

    let record = scheduler
        .cancel_appointment(id, non_blank(&dto.reason).map(str::to_string))
        .await?;
    tracing::debug!("Appointment {} cancelled by {}", id, user.sub);

    Ok(Json(ApiResponse::success(
        Some(record.into()),
        Some("Appointment cancelled".to_string()),
        None,
    )))
}

/// Move an appointment to another free slot in the same department
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/reschedule",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = RescheduleAppointmentDto,
    responses(
        (status = 200, description = "Appointment rescheduled", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 400, description = "Malformed or past date/time"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Target slot already booked"),
        (status = 422, description = "Appointment already completed or cancelled")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn reschedule_appointment(
    RequireResident(_user): RequireResident,
    State(scheduler): State<Arc<AppointmentScheduler>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RescheduleAppointmentDto>,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    let (date, time) = dto.parse()?;
    let record = scheduler.reschedule_appointment(id, date, time).await?;

    Ok(Json(ApiResponse::success(
        Some(record.into()),
        Some("Appointment rescheduled".to_string()),
        None,
    )))
}

/// Mark a confirmed appointment as completed
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/complete",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = CompleteAppointmentDto,
    responses(
        (status = 200, description = "Appointment completed", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 403, description = "Desk officer access required"),
        (status = 404, description = "Appointment not found"),
        (status = 422, description = "Appointment is not confirmed")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn complete_appointment(
    RequireDeskOfficer(_user): RequireDeskOfficer,
    State(scheduler): State<Arc<AppointmentScheduler>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CompleteAppointmentDto>,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    dto.validate()?;

    let record = scheduler
        .complete_appointment(id, non_blank(&dto.notes).map(str::to_string))
        .await?;

    Ok(Json(ApiResponse::success(
        Some(record.into()),
        Some("Appointment completed".to_string()),
        None,
    )))
}

/// Append a follow-up note
#[utoipa::path(
    post,
    path = "/api/appointments/{id}/follow-ups",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = FollowUpDto,
    responses(
        (status = 200, description = "Follow-up added", body = ApiResponse<TicketEnvelopeResponseDto>),
        (status = 400, description = "Empty note"),
        (status = 403, description = "Desk officer access required"),
        (status = 404, description = "Appointment not found")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn add_follow_up(
    RequireDeskOfficer(_user): RequireDeskOfficer,
    State(scheduler): State<Arc<AppointmentScheduler>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<FollowUpDto>,
) -> Result<Json<ApiResponse<TicketEnvelopeResponseDto>>> {
    dto.validate()?;

    let note = non_blank(&dto.note)
        .ok_or_else(|| AppError::field("note", "Note is required"))?
        .to_string();
    let record = scheduler.add_follow_up(id, note).await?;

    Ok(Json(ApiResponse::success(
        Some(record.into()),
        Some("Follow-up added".to_string()),
        None,
    )))
}
