use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{ReferralError, ReferralStatus, TimelineStep};

/// Timeline titles paired with the status each one marks as reached.
const TIMELINE: &[(&str, ReferralStatus)] = &[
    ("Referral created", ReferralStatus::Pending),
    ("Approved by PCP", ReferralStatus::Approved),
    ("Appointment scheduled", ReferralStatus::Scheduled),
    ("Consultation completed", ReferralStatus::Completed),
];

pub struct ReferralLifecycle;

impl ReferralLifecycle {
    /// The fresh four-step timeline with only the creation step complete.
    pub fn initial_timeline(created_at: DateTime<Utc>) -> Vec<TimelineStep> {
        TIMELINE
            .iter()
            .map(|&(title, status)| {
                let completed = status == ReferralStatus::Pending;
                TimelineStep {
                    title: title.to_string(),
                    status,
                    completed,
                    completed_at: completed.then_some(created_at),
                }
            })
            .collect()
    }

    pub fn is_terminal(status: ReferralStatus) -> bool {
        matches!(status, ReferralStatus::Completed | ReferralStatus::Cancelled)
    }

    /// Every status reachable in one move from `current`.
    pub fn valid_transitions(current: ReferralStatus) -> Vec<ReferralStatus> {
        match current {
            ReferralStatus::Pending => vec![ReferralStatus::Approved, ReferralStatus::Cancelled],
            ReferralStatus::Approved => vec![ReferralStatus::Scheduled, ReferralStatus::Cancelled],
            ReferralStatus::Scheduled => vec![ReferralStatus::Completed, ReferralStatus::Cancelled],
            ReferralStatus::Completed | ReferralStatus::Cancelled => vec![],
        }
    }

    /// Next status on the linear path.
    pub fn next_status(current: ReferralStatus) -> Result<ReferralStatus, ReferralError> {
        let next = match current {
            ReferralStatus::Pending => ReferralStatus::Approved,
            ReferralStatus::Approved => ReferralStatus::Scheduled,
            ReferralStatus::Scheduled => ReferralStatus::Completed,
            terminal => {
                warn!("Cannot advance referral that is already {}", terminal);
                return Err(ReferralError::Terminal(terminal));
            }
        };
        debug!("Referral transition {} -> {}", current, next);
        Ok(next)
    }

    pub fn validate_cancel(current: ReferralStatus) -> Result<(), ReferralError> {
        if Self::valid_transitions(current).contains(&ReferralStatus::Cancelled) {
            Ok(())
        } else {
            warn!("Cannot cancel referral that is already {}", current);
            Err(ReferralError::Terminal(current))
        }
    }

    /// Mark the step reached by `status` as complete.
    pub fn complete_step(timeline: &mut [TimelineStep], status: ReferralStatus, at: DateTime<Utc>) {
        if let Some(step) = timeline.iter_mut().find(|step| step.status == status) {
            step.completed = true;
            step.completed_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_initial_timeline() {
        let now = Utc::now();
        let timeline = ReferralLifecycle::initial_timeline(now);

        assert_eq!(timeline.len(), 4);
        assert_eq!(timeline[0].title, "Referral created");
        assert!(timeline[0].completed);
        assert_eq!(timeline[0].completed_at, Some(now));
        assert!(timeline[1..].iter().all(|step| !step.completed && step.completed_at.is_none()));
    }

    #[test]
    fn test_linear_path() {
        let mut status = ReferralStatus::Pending;
        let mut path = vec![status];
        while let Ok(next) = ReferralLifecycle::next_status(status) {
            status = next;
            path.push(status);
        }

        assert_eq!(
            path,
            vec![
                ReferralStatus::Pending,
                ReferralStatus::Approved,
                ReferralStatus::Scheduled,
                ReferralStatus::Completed,
            ]
        );
    }

    #[test]
    fn test_terminal_statuses_reject_changes() {
        for status in [ReferralStatus::Completed, ReferralStatus::Cancelled] {
            assert!(ReferralLifecycle::is_terminal(status));
            assert!(ReferralLifecycle::valid_transitions(status).is_empty());
            assert_matches!(ReferralLifecycle::next_status(status), Err(ReferralError::Terminal(s)) if s == status);
            assert_matches!(ReferralLifecycle::validate_cancel(status), Err(ReferralError::Terminal(_)));
        }
    }

    #[test]
    fn test_cancel_allowed_before_completion() {
        for status in [ReferralStatus::Pending, ReferralStatus::Approved, ReferralStatus::Scheduled] {
            assert!(ReferralLifecycle::validate_cancel(status).is_ok());
        }
    }

    #[test]
    fn test_complete_step() {
        let created = Utc::now();
        let mut timeline = ReferralLifecycle::initial_timeline(created);
        let later = created + chrono::Duration::minutes(5);

        ReferralLifecycle::complete_step(&mut timeline, ReferralStatus::Approved, later);

        assert!(timeline[1].completed);
        assert_eq!(timeline[1].completed_at, Some(later));
        assert!(!timeline[2].completed);
    }
}
