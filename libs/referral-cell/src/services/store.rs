use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::models::{CreateReferralRequest, Referral, ReferralError, ReferralFilter, ReferralStatus};
use crate::services::lifecycle::ReferralLifecycle;

fn required(value: String, field: &'static str) -> Result<String, ReferralError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReferralError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone, Default)]
pub struct ReferralStore {
    referrals: Arc<RwLock<HashMap<Uuid, Referral>>>,
}

impl ReferralStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(
        &self,
        created_by: &str,
        request: CreateReferralRequest,
    ) -> Result<Referral, ReferralError> {
        let now = Utc::now();
        let referral = Referral {
            id: Uuid::new_v4(),
            patient_name: required(request.patient_name, "patient_name")?,
            specialty: required(request.specialty, "specialty")?,
            condition: required(request.condition, "condition")?,
            status: ReferralStatus::Pending,
            urgency: request.urgency,
            referring_doctor: required(request.referring_doctor, "referring_doctor")?,
            receiving_doctor: optional(request.receiving_doctor),
            notes: optional(request.notes),
            timeline: ReferralLifecycle::initial_timeline(now),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.referrals.write().await.insert(referral.id, referral.clone());
        info!("Referral {} created by user {} for {}", referral.id, created_by, referral.specialty);
        Ok(referral)
    }

    pub async fn get(&self, id: Uuid) -> Result<Referral, ReferralError> {
        self.referrals
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ReferralError::NotFound(id))
    }

    /// Matching referrals, newest first.
    pub async fn list(&self, filter: &ReferralFilter) -> Vec<Referral> {
        let specialty = filter.specialty.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let mut matches: Vec<Referral> = self
            .referrals
            .read()
            .await
            .values()
            .filter(|r| filter.status.is_none_or(|status| r.status == status))
            .filter(|r| specialty.is_none_or(|s| r.specialty.eq_ignore_ascii_case(s)))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches
    }

    pub async fn advance(&self, id: Uuid) -> Result<Referral, ReferralError> {
        let mut referrals = self.referrals.write().await;
        let referral = referrals.get_mut(&id).ok_or(ReferralError::NotFound(id))?;

        let next = ReferralLifecycle::next_status(referral.status)?;
        let now = Utc::now();
        referral.status = next;
        referral.updated_at = now;
        ReferralLifecycle::complete_step(&mut referral.timeline, next, now);

        info!("Referral {} advanced to {}", id, next);
        Ok(referral.clone())
    }

    pub async fn cancel(&self, id: Uuid) -> Result<Referral, ReferralError> {
        let mut referrals = self.referrals.write().await;
        let referral = referrals.get_mut(&id).ok_or(ReferralError::NotFound(id))?;

        ReferralLifecycle::validate_cancel(referral.status)?;
        referral.status = ReferralStatus::Cancelled;
        referral.updated_at = Utc::now();

        info!("Referral {} cancelled", id);
        Ok(referral.clone())
    }
}
