use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Approved,
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferralStatus::Pending => write!(f, "pending"),
            ReferralStatus::Approved => write!(f, "approved"),
            ReferralStatus::Scheduled => write!(f, "scheduled"),
            ReferralStatus::Completed => write!(f, "completed"),
            ReferralStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Routine,
    Urgent,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub title: String,
    /// Status the referral reaches when this step completes.
    pub status: ReferralStatus,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub patient_name: String,
    pub specialty: String,
    pub condition: String,
    pub status: ReferralStatus,
    pub urgency: Urgency,
    pub referring_doctor: String,
    pub receiving_doctor: Option<String>,
    pub notes: Option<String>,
    pub timeline: Vec<TimelineStep>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReferralRequest {
    pub patient_name: String,
    pub specialty: String,
    pub condition: String,
    #[serde(default)]
    pub urgency: Urgency,
    pub referring_doctor: String,
    pub receiving_doctor: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferralFilter {
    pub status: Option<ReferralStatus>,
    pub specialty: Option<String>,
}

#[derive(Error, Debug, PartialEq)]
pub enum ReferralError {
    #[error("Referral not found: {0}")]
    NotFound(Uuid),

    #[error("Referral is already {0} and cannot change")]
    Terminal(ReferralStatus),

    #[error("{0} is required")]
    MissingField(&'static str),
}

impl From<ReferralError> for AppError {
    fn from(err: ReferralError) -> Self {
        match err {
            ReferralError::NotFound(_) => AppError::NotFound(err.to_string()),
            ReferralError::Terminal(_) => AppError::Conflict(err.to_string()),
            ReferralError::MissingField(_) => AppError::ValidationError(err.to_string()),
        }
    }
}
