pub mod appointment_dto;

pub use appointment_dto::{
    AvailableSlotsQuery, AvailableSlotsResponseDto, CancelAppointmentDto, CompleteAppointmentDto,
    ConfirmAppointmentDto, FollowUpDto, RescheduleAppointmentDto,
};
