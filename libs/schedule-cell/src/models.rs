use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    #[default]
    #[serde(alias = "in_person", alias = "inperson")]
    InPerson,
    #[serde(alias = "virtual", alias = "video")]
    Telehealth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: Uuid,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub appointment_type: AppointmentType,
}

impl TimeSlot {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime, appointment_type: AppointmentType) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time,
            end_time,
            is_available: true,
            appointment_type,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// One calendar day of a specialist's schedule. Slots are kept ordered by start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub is_working_day: bool,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddSlotRequest {
    #[serde(default, deserialize_with = "clock_time::option::deserialize")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "clock_time::option::deserialize")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub appointment_type: AppointmentType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeekQuery {
    pub from: Option<NaiveDate>,
}

#[derive(Error, Debug, PartialEq)]
pub enum ScheduleError {
    #[error("Both start and end time are required")]
    MissingTime,

    #[error("Start time must be before end time")]
    InvalidRange,

    #[error("{0} is not a working day")]
    DayOff(NaiveDate),

    #[error("Slot not found: {0}")]
    SlotNotFound(Uuid),

    #[error("A week starting {0} runs past the last supported date")]
    WeekOutOfRange(NaiveDate),
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::MissingTime | ScheduleError::InvalidRange | ScheduleError::WeekOutOfRange(_) => {
                AppError::ValidationError(err.to_string())
            }
            ScheduleError::DayOff(_) => AppError::Conflict(err.to_string()),
            ScheduleError::SlotNotFound(_) => AppError::NotFound(err.to_string()),
        }
    }
}

/// Wall-clock times as `HH:MM` on the wire; `HH:MM:SS` is accepted on input.
pub mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", raw))),
            }
        }
    }
}
