use validator::{Validate, ValidationErrors};

use crate::core::error::{AppError, FieldError, Result};
use crate::features::appointments::models::{Department, TimeSlot};
use crate::features::tickets::dtos::{
    AppointmentFieldsDto, BlotterFieldsDto, ComplaintFieldsDto, InvolvedPersonDto,
    SuggestionFieldsDto, TicketEnvelopeDto, TicketFieldsDto,
};
use crate::features::tickets::models::{
    AppointmentFields, BlotterFields, ComplaintFields, ExtensionFields, FeedbackCategory,
    IncidentTimeOfDay, IncidentType, InvolvedPerson, Involvement, SuggestionCategory,
    SuggestionFields, TicketCategory, TicketFields, TicketPriority, ValidatedTicket,
};
use crate::shared::validation::{non_blank, parse_calendar_date, ClosedSet};

/// Per-category admission checks.
///
/// Pure: no clock, no storage. Every problem in the envelope is reported in
/// one pass and nothing is accepted unless the whole envelope is clean.
pub struct CategoryValidators;

impl CategoryValidators {
    pub fn validate(envelope: &TicketEnvelopeDto) -> Result<ValidatedTicket> {
        let mut errors = Vec::new();

        let ticket = match &envelope.ticket {
            Some(dto) => validate_ticket_fields(&dto.normalized(), &mut errors),
            None => {
                errors.push(FieldError::new("ticket", "Ticket fields are required"));
                None
            }
        };

        // Resolved on its own so extension errors are reported even when
        // other base fields are broken
        let category = envelope
            .ticket
            .as_ref()
            .and_then(|t| non_blank(&t.category))
            .and_then(TicketCategory::parse);
        check_envelope_keys(envelope, category, &mut errors);

        let extension = match category {
            Some(TicketCategory::Appointment) => envelope
                .appointment
                .as_ref()
                .and_then(|dto| validate_appointment(&dto.normalized(), &mut errors))
                .map(ExtensionFields::Appointment),
            Some(TicketCategory::Blotter) => envelope
                .blotter
                .as_ref()
                .and_then(|dto| validate_blotter(&dto.normalized(), &mut errors))
                .map(ExtensionFields::Blotter),
            Some(TicketCategory::Complaint) => envelope
                .complaint
                .as_ref()
                .and_then(|dto| validate_complaint(&dto.normalized(), &mut errors))
                .map(ExtensionFields::Complaint),
            Some(TicketCategory::Suggestion) => envelope
                .suggestion
                .as_ref()
                .and_then(|dto| validate_suggestion(&dto.normalized(), &mut errors))
                .map(ExtensionFields::Suggestion),
            None => None,
        };

        match (ticket, extension) {
            (Some(ticket), Some(extension)) if errors.is_empty() => {
                Ok(ValidatedTicket { ticket, extension })
            }
            _ => {
                errors.sort_by(|a, b| a.field.cmp(&b.field));
                errors.dedup();
                Err(AppError::Validation(errors))
            }
        }
    }
}

/// The envelope must carry the category's object and no other
fn check_envelope_keys(
    envelope: &TicketEnvelopeDto,
    category: Option<TicketCategory>,
    errors: &mut Vec<FieldError>,
) {
    let present = [
        (TicketCategory::Appointment, envelope.appointment.is_some()),
        (TicketCategory::Blotter, envelope.blotter.is_some()),
        (TicketCategory::Complaint, envelope.complaint.is_some()),
        (TicketCategory::Suggestion, envelope.suggestion.is_some()),
    ];

    let Some(category) = category else {
        return;
    };

    for (candidate, is_present) in present {
        if candidate == category && !is_present {
            errors.push(FieldError::new(
                candidate.envelope_key(),
                format!("{} details are required for a {} ticket", candidate.envelope_key(), category),
            ));
        } else if candidate != category && is_present {
            errors.push(FieldError::new(
                candidate.envelope_key(),
                format!("Not allowed for a {} ticket", category),
            ));
        }
    }
}

fn validate_ticket_fields(dto: &TicketFieldsDto, errors: &mut Vec<FieldError>) -> Option<TicketFields> {
    collect_shape_errors("ticket", dto.validate(), errors);

    let subject = required(errors, "ticket.subject", &dto.subject, "Subject is required");
    let description = required(
        errors,
        "ticket.description",
        &dto.description,
        "Description is required",
    );
    let priority = closed_set::<TicketPriority>(errors, "ticket.priority", &dto.priority);
    let requester_name = required(
        errors,
        "ticket.requester_name",
        &dto.requester_name,
        "Requester name is required",
    );
    let contact_number = required(
        errors,
        "ticket.contact_number",
        &dto.contact_number,
        "Contact number is required",
    );
    let complete_address = required(
        errors,
        "ticket.complete_address",
        &dto.complete_address,
        "Complete address is required",
    );
    let category = closed_set::<TicketCategory>(errors, "ticket.category", &dto.category);

    Some(TicketFields {
        subject: subject?,
        description: description?,
        priority: priority?,
        requester_name: requester_name?,
        resident_id: dto.resident_id,
        contact_number: contact_number?,
        email_address: dto.email_address.clone(),
        complete_address: complete_address?,
        category: category?,
    })
}

fn validate_appointment(
    dto: &AppointmentFieldsDto,
    errors: &mut Vec<FieldError>,
) -> Option<AppointmentFields> {
    collect_shape_errors("appointment", dto.validate(), errors);

    let department = closed_set::<Department>(errors, "appointment.department", &dto.department);
    let date = calendar_date(errors, "appointment.date", &dto.date);
    let time = closed_set::<TimeSlot>(errors, "appointment.time", &dto.time);

    Some(AppointmentFields {
        department: department?,
        date: date?,
        time: time?,
        additional_notes: dto.additional_notes.clone(),
    })
}

fn validate_blotter(dto: &BlotterFieldsDto, errors: &mut Vec<FieldError>) -> Option<BlotterFields> {
    collect_shape_errors("blotter", dto.validate(), errors);

    let type_of_incident =
        closed_set::<IncidentType>(errors, "blotter.type_of_incident", &dto.type_of_incident);
    let date_of_incident = calendar_date(errors, "blotter.date_of_incident", &dto.date_of_incident);
    let time_of_incident =
        closed_set::<IncidentTimeOfDay>(errors, "blotter.time_of_incident", &dto.time_of_incident);
    let location_of_incident = required(
        errors,
        "blotter.location_of_incident",
        &dto.location_of_incident,
        "Location of incident is required",
    );

    let people: Vec<Option<InvolvedPerson>> = dto
        .other_people_involved
        .iter()
        .enumerate()
        .map(|(i, person)| validate_person(i, person, errors))
        .collect();

    Some(BlotterFields {
        type_of_incident: type_of_incident?,
        date_of_incident: date_of_incident?,
        time_of_incident: time_of_incident?,
        location_of_incident: location_of_incident?,
        other_people_involved: people.into_iter().collect::<Option<Vec<_>>>()?,
    })
}

fn validate_person(
    index: usize,
    dto: &InvolvedPersonDto,
    errors: &mut Vec<FieldError>,
) -> Option<InvolvedPerson> {
    let prefix = format!("blotter.other_people_involved[{}]", index);
    collect_shape_errors(&prefix, dto.validate(), errors);

    let full_name = required(
        errors,
        &format!("{}.full_name", prefix),
        &dto.full_name,
        "Full name is required",
    );
    let involvement =
        closed_set::<Involvement>(errors, &format!("{}.involvement", prefix), &dto.involvement);

    Some(InvolvedPerson {
        full_name: full_name?,
        address: dto.address.clone(),
        contact_number: dto.contact_number.clone(),
        involvement: involvement?,
    })
}

fn validate_complaint(
    dto: &ComplaintFieldsDto,
    errors: &mut Vec<FieldError>,
) -> Option<ComplaintFields> {
    collect_shape_errors("complaint", dto.validate(), errors);

    let feedback_category = closed_set::<FeedbackCategory>(
        errors,
        "complaint.feedback_category",
        &dto.feedback_category,
    );
    let department = closed_set::<Department>(errors, "complaint.department", &dto.department);

    Some(ComplaintFields {
        feedback_category: feedback_category?,
        department: department?,
        location: dto.location.clone(),
    })
}

fn validate_suggestion(
    dto: &SuggestionFieldsDto,
    errors: &mut Vec<FieldError>,
) -> Option<SuggestionFields> {
    collect_shape_errors("suggestion", dto.validate(), errors);

    let category = closed_set::<SuggestionCategory>(errors, "suggestion.category", &dto.category);
    let benefits = required(
        errors,
        "suggestion.benefits",
        &dto.benefits,
        "Benefits are required",
    );

    Some(SuggestionFields {
        category: category?,
        benefits: benefits?,
        implementation_notes: dto.implementation_notes.clone(),
        resources_needed: dto.resources_needed.clone(),
        allow_contact: dto.allow_contact,
    })
}

// =============================================================================
// HELPERS
// =============================================================================

/// Flatten `validator` derive output into prefixed field errors
fn collect_shape_errors(
    prefix: &str,
    result: std::result::Result<(), ValidationErrors>,
    errors: &mut Vec<FieldError>,
) {
    let Err(shape) = result else {
        return;
    };

    for (field, field_errors) in shape.field_errors() {
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value ({})", error.code));
            errors.push(FieldError::new(format!("{}.{}", prefix, field), message));
        }
    }
}

fn has_error(errors: &[FieldError], field: &str) -> bool {
    errors.iter().any(|e| e.field == field)
}

/// Present value, or a "required" error unless the field already failed a shape rule
fn required(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &Option<String>,
    message: &str,
) -> Option<String> {
    if has_error(errors, field) {
        return None;
    }
    match value {
        Some(v) => Some(v.clone()),
        None => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn closed_set<T: ClosedSet>(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &Option<String>,
) -> Option<T> {
    let Some(raw) = value else {
        errors.push(FieldError::new(field, "Value is required"));
        return None;
    };
    let parsed = T::parse(raw);
    if parsed.is_none() {
        errors.push(FieldError::new(
            field,
            format!("'{}' is not one of: {}", raw, T::allowed_values()),
        ));
    }
    parsed
}

fn calendar_date(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &Option<String>,
) -> Option<chrono::NaiveDate> {
    let Some(raw) = value else {
        errors.push(FieldError::new(field, "Date is required"));
        return None;
    };
    let parsed = parse_calendar_date(raw);
    if parsed.is_none() {
        errors.push(FieldError::new(
            field,
            format!("'{}' is not a valid calendar date (YYYY-MM-DD)", raw),
        ));
    }
    parsed
}
