use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;

use crate::shared::validation::ClosedSet;

/// Office departments that accept appointments and complaints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "department")]
pub enum Department {
    #[serde(rename = "Engineering Department")]
    #[sqlx(rename = "Engineering Department")]
    Engineering,
    #[serde(rename = "Health Department")]
    #[sqlx(rename = "Health Department")]
    Health,
    #[serde(rename = "Social Welfare Department")]
    #[sqlx(rename = "Social Welfare Department")]
    SocialWelfare,
    #[serde(rename = "Treasury Department")]
    #[sqlx(rename = "Treasury Department")]
    Treasury,
    #[serde(rename = "Civil Registry Department")]
    #[sqlx(rename = "Civil Registry Department")]
    CivilRegistry,
    #[serde(rename = "Peace and Order Department")]
    #[sqlx(rename = "Peace and Order Department")]
    PeaceAndOrder,
    #[serde(rename = "Environmental Services Department")]
    #[sqlx(rename = "Environmental Services Department")]
    EnvironmentalServices,
}

impl ClosedSet for Department {
    const ALL: &'static [Self] = &[
        Department::Engineering,
        Department::Health,
        Department::SocialWelfare,
        Department::Treasury,
        Department::CivilRegistry,
        Department::PeaceAndOrder,
        Department::EnvironmentalServices,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Department::Engineering => "Engineering Department",
            Department::Health => "Health Department",
            Department::SocialWelfare => "Social Welfare Department",
            Department::Treasury => "Treasury Department",
            Department::CivilRegistry => "Civil Registry Department",
            Department::PeaceAndOrder => "Peace and Order Department",
            Department::EnvironmentalServices => "Environmental Services Department",
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookable appointment start times.
///
/// There is no 12:00 slot: the office closes for lunch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "time_slot")]
pub enum TimeSlot {
    #[serde(rename = "08:00")]
    #[sqlx(rename = "08:00")]
    EightAm,
    #[serde(rename = "09:00")]
    #[sqlx(rename = "09:00")]
    NineAm,
    #[serde(rename = "10:00")]
    #[sqlx(rename = "10:00")]
    TenAm,
    #[serde(rename = "11:00")]
    #[sqlx(rename = "11:00")]
    ElevenAm,
    #[serde(rename = "13:00")]
    #[sqlx(rename = "13:00")]
    OnePm,
    #[serde(rename = "14:00")]
    #[sqlx(rename = "14:00")]
    TwoPm,
    #[serde(rename = "15:00")]
    #[sqlx(rename = "15:00")]
    ThreePm,
    #[serde(rename = "16:00")]
    #[sqlx(rename = "16:00")]
    FourPm,
    #[serde(rename = "17:00")]
    #[sqlx(rename = "17:00")]
    FivePm,
}

impl TimeSlot {
    pub fn hour(self) -> u32 {
        match self {
            TimeSlot::EightAm => 8,
            TimeSlot::NineAm => 9,
            TimeSlot::TenAm => 10,
            TimeSlot::ElevenAm => 11,
            TimeSlot::OnePm => 13,
            TimeSlot::TwoPm => 14,
            TimeSlot::ThreePm => 15,
            TimeSlot::FourPm => 16,
            TimeSlot::FivePm => 17,
        }
    }

    pub fn start_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Local start of this slot on `date`
    pub fn starts_at(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start_time())
    }
}

impl ClosedSet for TimeSlot {
    const ALL: &'static [Self] = &[
        TimeSlot::EightAm,
        TimeSlot::NineAm,
        TimeSlot::TenAm,
        TimeSlot::ElevenAm,
        TimeSlot::OnePm,
        TimeSlot::TwoPm,
        TimeSlot::ThreePm,
        TimeSlot::FourPm,
        TimeSlot::FivePm,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::EightAm => "08:00",
            TimeSlot::NineAm => "09:00",
            TimeSlot::TenAm => "10:00",
            TimeSlot::ElevenAm => "11:00",
            TimeSlot::OnePm => "13:00",
            TimeSlot::TwoPm => "14:00",
            TimeSlot::ThreePm => "15:00",
            TimeSlot::FourPm => "16:00",
            TimeSlot::FivePm => "17:00",
        }
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key of the schedule index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub department: Department,
    pub date: NaiveDate,
    pub time: TimeSlot,
}

impl SlotKey {
    pub fn new(department: Department, date: NaiveDate, time: TimeSlot) -> Self {
        Self {
            department,
            date,
            time,
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {} at {}", self.department, self.date, self.time)
    }
}
