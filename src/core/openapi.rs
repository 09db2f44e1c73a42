use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::error::FieldError;
use crate::features::appointments::{
    dtos as appointments_dtos, handlers as appointments_handlers, models as appointments_models,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::residents::{dtos as residents_dtos, handlers as residents_handlers};
use crate::features::statistics::{dtos as statistics_dtos, handlers as statistics_handlers};
use crate::features::tickets::{
    dtos as tickets_dtos, handlers as tickets_handlers, models as tickets_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Tickets
        tickets_handlers::create_ticket,
        tickets_handlers::list_tickets,
        tickets_handlers::get_ticket,
        tickets_handlers::get_ticket_by_number,
        tickets_handlers::update_ticket,
        tickets_handlers::transition_ticket,
        tickets_handlers::attach_document,
        // Appointments
        appointments_handlers::get_available_slots,
        appointments_handlers::confirm_appointment,
        appointments_handlers::cancel_appointment,
        appointments_handlers::reschedule_appointment,
        appointments_handlers::complete_appointment,
        appointments_handlers::add_follow_up,
        // Statistics
        statistics_handlers::get_ticket_statistics,
        // Residents
        residents_handlers::resolve_resident,
    ),
    components(
        schemas(
            Meta,
            FieldError,
            AuthenticatedUser,
            // Ticket envelopes
            tickets_dtos::TicketEnvelopeDto,
            tickets_dtos::TicketFieldsDto,
            tickets_dtos::AppointmentFieldsDto,
            tickets_dtos::BlotterFieldsDto,
            tickets_dtos::InvolvedPersonDto,
            tickets_dtos::ComplaintFieldsDto,
            tickets_dtos::SuggestionFieldsDto,
            tickets_dtos::TransitionStatusDto,
            tickets_dtos::UploadDocumentDto,
            tickets_dtos::TicketResponseDto,
            tickets_dtos::TicketEnvelopeResponseDto,
            // Ticket models
            tickets_models::TicketCategory,
            tickets_models::TicketPriority,
            tickets_models::TicketStatus,
            tickets_models::AppointmentStatus,
            tickets_models::Appointment,
            tickets_models::FollowUpNote,
            tickets_models::IncidentType,
            tickets_models::IncidentTimeOfDay,
            tickets_models::Involvement,
            tickets_models::InvolvedPerson,
            tickets_models::Blotter,
            tickets_models::FeedbackCategory,
            tickets_models::Complaint,
            tickets_models::SuggestionCategory,
            tickets_models::Suggestion,
            // Appointments
            appointments_models::Department,
            appointments_models::TimeSlot,
            appointments_dtos::ConfirmAppointmentDto,
            appointments_dtos::CancelAppointmentDto,
            appointments_dtos::CompleteAppointmentDto,
            appointments_dtos::FollowUpDto,
            appointments_dtos::RescheduleAppointmentDto,
            appointments_dtos::AvailableSlotsResponseDto,
            // Statistics
            statistics_dtos::TicketStatisticsDto,
            // Residents
            residents_dtos::ResidentLookupDto,
            // Wrapped responses
            ApiResponse<tickets_dtos::TicketEnvelopeResponseDto>,
            ApiResponse<Vec<tickets_dtos::TicketEnvelopeResponseDto>>,
            ApiResponse<appointments_dtos::AvailableSlotsResponseDto>,
            ApiResponse<statistics_dtos::TicketStatisticsDto>,
            ApiResponse<residents_dtos::ResidentLookupDto>,
        )
    ),
    tags(
        (name = "tickets", description = "Ticket intake, lookup and status changes"),
        (name = "appointments", description = "Slot availability and appointment lifecycle"),
        (name = "statistics", description = "Ticket counts for the desk dashboard"),
        (name = "residents", description = "Resident directory lookups"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Help Desk API",
        version = "0.1.0",
        description = "Ticketing and appointment scheduling for the municipal help desk"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
