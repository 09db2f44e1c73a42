mod extension;
mod ticket;

pub use extension::{
    Appointment, AppointmentFields, AppointmentStatus, Blotter, BlotterFields, Complaint,
    ComplaintFields, ExtensionFields, FeedbackCategory, FollowUpNote, IncidentTimeOfDay,
    IncidentType, InvolvedPerson, Involvement, Suggestion, SuggestionCategory, SuggestionFields,
    TicketExtension, TicketRecord, ValidatedTicket,
};
pub use ticket::{BaseTicket, TicketCategory, TicketFields, TicketPriority, TicketStatus};
