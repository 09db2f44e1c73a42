pub mod appointment_handler;

pub use appointment_handler::{
    __path_add_follow_up, __path_cancel_appointment, __path_complete_appointment,
    __path_confirm_appointment, __path_get_available_slots, __path_reschedule_appointment,
    add_follow_up, cancel_appointment, complete_appointment, confirm_appointment,
    get_available_slots, reschedule_appointment,
};
