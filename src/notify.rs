//! Transient user notices.
//!
//! Each guarded action ends in exactly one notice. Successes disappear after
//! the success TTL, failures after the error TTL. A rejected concurrent
//! action is informational only.

use crate::collaborators::RemoteError;
use crate::config::EngineConfig;
use crate::error::LifecycleError;
use crate::visit::{ActionKind, Visit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeTone {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub tone: NoticeTone,
    pub message: String,
    pub ttl: Duration,
    pub created_at: DateTime<Utc>,
}

fn success_message(action: ActionKind) -> &'static str {
    match action {
        ActionKind::CheckIn => "Successfully checked in!",
        ActionKind::CheckOut => "Successfully checked out!",
        ActionKind::Cancel => "Schedule cancelled successfully!",
        ActionKind::UpdateTask => "Task updated.",
        ActionKind::SaveNote => "Service notes saved.",
        ActionKind::Refresh => "Visit refreshed.",
    }
}

fn capitalized(action: ActionKind) -> String {
    let label = action.to_string();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    }
}

fn remote_reason(error: &RemoteError) -> String {
    match error {
        RemoteError::Network(message) => message.clone(),
        RemoteError::Rejected { message, .. } => message.clone(),
        RemoteError::Malformed(detail) => format!("unexpected response from server ({detail})"),
    }
}

fn failure_message(action: ActionKind, error: &LifecycleError) -> String {
    match error {
        LifecycleError::InvalidTransition { subject, from, .. } => format!(
            "This {subject} is already {from}. Refresh to see its current state."
        ),
        LifecycleError::UnknownTask(id) => format!(
            "Task '{id}' is no longer part of this visit. Refresh to see its current state."
        ),
        LifecycleError::LocationUnavailable(reason) => reason.to_string(),
        LifecycleError::RemoteRejected(reason) => {
            format!("{} failed: {}", capitalized(action), remote_reason(reason))
        }
        LifecycleError::ActionInProgress { .. } => {
            "Please wait for the current action to finish.".to_string()
        }
    }
}

impl Notice {
    pub fn success(action: ActionKind, config: &EngineConfig, created_at: DateTime<Utc>) -> Self {
        Self {
            tone: NoticeTone::Success,
            message: success_message(action).to_string(),
            ttl: config.success_notice_ttl(),
            created_at,
        }
    }

    pub fn failure(
        action: ActionKind,
        error: &LifecycleError,
        config: &EngineConfig,
        created_at: DateTime<Utc>,
    ) -> Self {
        let (tone, ttl) = match error {
            LifecycleError::ActionInProgress { .. } => {
                (NoticeTone::Info, config.success_notice_ttl())
            }
            _ => (NoticeTone::Error, config.error_notice_ttl()),
        };
        Self {
            tone,
            message: failure_message(action, error),
            ttl,
            created_at,
        }
    }

    pub fn for_result(
        action: ActionKind,
        outcome: &Result<Visit, LifecycleError>,
        config: &EngineConfig,
        created_at: DateTime<Utc>,
    ) -> Self {
        match outcome {
            Ok(_) => Self::success(action, config, created_at),
            Err(error) => Self::failure(action, error, config, created_at),
        }
    }

    /// Whether the notice should have been cleared by `now`. A TTL that
    /// reaches past the representable range never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.created_at.checked_add_signed(ttl))
            .is_some_and(|end| now >= end)
    }

    pub fn is_error(&self) -> bool {
        self.tone == NoticeTone::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::LocationError;
    use crate::error::Subject;
    use crate::visit::{ScheduledSlot, VisitId, VisitStatus};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap()
    }

    fn visit() -> Visit {
        Visit::scheduled(
            "v1",
            ScheduledSlot::new(now(), now() + chrono::Duration::hours(1)).unwrap(),
        )
    }

    #[test]
    fn successes_use_short_ttl() {
        let config = EngineConfig::default();
        let notice = Notice::for_result(ActionKind::CheckIn, &Ok(visit()), &config, now());

        assert_eq!(notice.tone, NoticeTone::Success);
        assert_eq!(notice.message, "Successfully checked in!");
        assert_eq!(notice.ttl, Duration::from_secs(3));
    }

    #[test]
    fn remote_failures_name_the_action() {
        let config = EngineConfig::default();
        let err = LifecycleError::RemoteRejected(RemoteError::Rejected {
            status: 500,
            message: "database unavailable".into(),
        });
        let notice = Notice::failure(ActionKind::CheckOut, &err, &config, now());

        assert!(notice.is_error());
        assert_eq!(notice.message, "Check out failed: database unavailable");
        assert_eq!(notice.ttl, Duration::from_secs(5));
    }

    #[test]
    fn location_failures_use_device_message() {
        let err = LifecycleError::LocationUnavailable(LocationError::Timeout);
        let notice = Notice::failure(ActionKind::CheckIn, &err, &EngineConfig::default(), now());
        assert_eq!(notice.message, "Location request timed out. Please try again.");
    }

    #[test]
    fn stale_actions_suggest_refresh() {
        let err = LifecycleError::InvalidTransition {
            subject: Subject::Visit,
            action: ActionKind::Cancel,
            from: VisitStatus::InProgress.to_string(),
        };
        let notice = Notice::failure(ActionKind::Cancel, &err, &EngineConfig::default(), now());
        assert_eq!(
            notice.message,
            "This visit is already in progress. Refresh to see its current state."
        );
    }

    #[test]
    fn busy_is_informational() {
        let err = LifecycleError::ActionInProgress {
            visit_id: VisitId::new("v1"),
            requested: ActionKind::CheckIn,
            pending: ActionKind::CheckIn,
        };
        let notice = Notice::failure(ActionKind::CheckIn, &err, &EngineConfig::default(), now());
        assert_eq!(notice.tone, NoticeTone::Info);
        assert!(!notice.is_error());
    }

    #[test]
    fn expiry_follows_ttl() {
        let notice = Notice::success(ActionKind::SaveNote, &EngineConfig::default(), now());
        assert!(!notice.is_expired(now() + chrono::Duration::seconds(2)));
        assert!(notice.is_expired(now() + chrono::Duration::seconds(3)));
    }

    #[test]
    fn huge_ttl_never_expires() {
        let config =
            EngineConfig::from_json(r#"{"error_notice_ttl_ms": 9000000000000000000}"#).unwrap();
        let outcome = Err(LifecycleError::LocationUnavailable(LocationError::Timeout));
        let notice = Notice::for_result(ActionKind::CheckIn, &outcome, &config, now());

        assert!(notice.is_error());
        assert!(!notice.is_expired(now()));
        assert!(!notice.is_expired(now() + chrono::Duration::days(365 * 1000)));
    }
}
