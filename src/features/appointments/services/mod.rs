mod appointment_scheduler;

pub use appointment_scheduler::AppointmentScheduler;
