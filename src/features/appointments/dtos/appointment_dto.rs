use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, FieldError, Result};
use crate::features::appointments::models::{Department, TimeSlot};
use crate::shared::validation::{non_blank, parse_calendar_date, ClosedSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ConfirmAppointmentDto {
    #[validate(length(max = 1000, message = "Note must not exceed 1000 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CancelAppointmentDto {
    #[validate(length(max = 1000, message = "Reason must not exceed 1000 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompleteAppointmentDto {
    #[validate(length(max = 2000, message = "Notes must not exceed 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct FollowUpDto {
    #[validate(length(max = 2000, message = "Note must not exceed 2000 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RescheduleAppointmentDto {
    /// YYYY-MM-DD
    pub date: Option<String>,
    /// One of the bookable slots, e.g. "14:00"
    pub time: Option<String>,
}

impl RescheduleAppointmentDto {
    pub fn parse(&self) -> Result<(NaiveDate, TimeSlot)> {
        let mut errors = Vec::new();
        let date = parse_date_field(&self.date, "date", &mut errors);
        let time = parse_closed_field::<TimeSlot>(&self.time, "time", &mut errors);
        match (date, time) {
            (Some(date), Some(time)) => Ok((date, time)),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AvailableSlotsQuery {
    /// e.g. "Engineering Department"
    pub department: Option<String>,
    /// YYYY-MM-DD
    pub date: Option<String>,
}

impl AvailableSlotsQuery {
    pub fn parse(&self) -> Result<(Department, NaiveDate)> {
        let mut errors = Vec::new();
        let department = parse_closed_field::<Department>(&self.department, "department", &mut errors);
        let date = parse_date_field(&self.date, "date", &mut errors);
        match (department, date) {
            (Some(department), Some(date)) => Ok((department, date)),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailableSlotsResponseDto {
    pub department: Department,
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

fn parse_date_field(
    value: &Option<String>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<NaiveDate> {
    let Some(raw) = non_blank(value) else {
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

fn parse_closed_field<T: ClosedSet>(
    value: &Option<String>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let Some(raw) = non_blank(value) else {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_query_rejects_lunch_hour_and_bad_dates() {
        let query = AvailableSlotsQuery {
            department: Some("Engineering Department".to_string()),
            date: Some("2025-02-30".to_string()),
        };
        match query.parse() {
            Err(AppError::Validation(fields)) => assert_eq!(fields[0].field, "date"),
            other => panic!("unexpected {:?}", other),
        }

        let reschedule = RescheduleAppointmentDto {
            date: Some("2025-06-21".to_string()),
            time: Some("12:00".to_string()),
        };
        match reschedule.parse() {
            Err(AppError::Validation(fields)) => assert_eq!(fields[0].field, "time"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_reschedule_parses_slot() {
        let dto = RescheduleAppointmentDto {
            date: Some("2025-06-23".to_string()),
            time: Some("14:00".to_string()),
        };
        let (date, time) = dto.parse().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 6, 23).unwrap());
        assert_eq!(time, TimeSlot::TwoPm);
    }
}
