use crate::core::error::{AppError, Result};
use crate::features::tickets::models::{AppointmentStatus, TicketCategory, TicketRecord, TicketStatus};

/// Status state machine shared by every ticket category
pub struct TicketLifecycle;

impl TicketLifecycle {
    pub fn initial_status(category: TicketCategory) -> TicketStatus {
        match category {
            TicketCategory::Appointment => TicketStatus::Pending,
            _ => TicketStatus::Open,
        }
    }

    pub fn allowed_targets(from: TicketStatus) -> &'static [TicketStatus] {
        use TicketStatus::*;
        match from {
            Open => &[InProgress, Pending, Resolved, Closed],
            InProgress => &[Resolved, Pending, Closed],
            Pending => &[InProgress, Resolved, Closed],
            Resolved => &[Closed],
            Closed => &[],
        }
    }

    pub fn can_transition(from: TicketStatus, to: TicketStatus) -> bool {
        Self::allowed_targets(from).contains(&to)
    }

    /// Ticket status an appointment status is represented by
    pub fn status_for_appointment(status: AppointmentStatus) -> TicketStatus {
        match status {
            AppointmentStatus::Pending => TicketStatus::Pending,
            AppointmentStatus::Confirmed => TicketStatus::InProgress,
            AppointmentStatus::Completed => TicketStatus::Resolved,
            AppointmentStatus::Cancelled => TicketStatus::Closed,
        }
    }

    /// Check a requested transition against the table and the appointment coupling rule
    pub fn check_transition(record: &TicketRecord, to: TicketStatus) -> Result<()> {
        let from = record.status();

        if !Self::can_transition(from, to) {
            return Err(AppError::InvalidTransition(format!(
                "Ticket {} cannot move from {} to {}",
                record.ticket().ticket_number,
                from,
                to
            )));
        }

        if to == TicketStatus::Closed {
            if let Some(appointment) = record.appointment() {
                if !appointment.status.is_terminal() {
                    return Err(AppError::InvalidTransition(format!(
                        "Appointment ticket {} cannot be closed while its appointment is {}",
                        record.ticket().ticket_number,
                        appointment.status
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn apply_transition(record: &mut TicketRecord, to: TicketStatus) -> Result<()> {
        Self::check_transition(record, to)?;
        record.set_status(to);
        Ok(())
    }

    /// Move the ticket to the status its appointment now maps to.
    ///
    /// Called after the appointment status changed; a ticket that already
    /// sits on the mapped status is left alone.
    pub fn sync_with_appointment(record: &mut TicketRecord) -> Result<()> {
        let Some(appointment) = record.appointment() else {
            return Err(AppError::Internal(format!(
                "Ticket {} has no appointment",
                record.id()
            )));
        };
        let target = Self::status_for_appointment(appointment.status);
        if record.status() == target {
            return Ok(());
        }
        Self::apply_transition(record, target)
    }
}
