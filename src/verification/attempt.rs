use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AttemptStatus {
    Capturing,
    Uploading,
    Submitting,
    Polling,
    Succeeded,
    Failed,
}

impl AttemptStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptStatus::Succeeded | AttemptStatus::Failed)
    }

    /// The pipeline is strictly linear. The only jump allowed is into
    /// Failed from any non-terminal stage.
    pub fn can_advance_to(&self, next: AttemptStatus) -> bool {
        if next == AttemptStatus::Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (AttemptStatus::Capturing, AttemptStatus::Uploading)
                | (AttemptStatus::Uploading, AttemptStatus::Submitting)
                | (AttemptStatus::Submitting, AttemptStatus::Polling)
                | (AttemptStatus::Polling, AttemptStatus::Succeeded)
        )
    }
}

/// One end-to-end run of capture → upload → submit → poll for a single
/// routine completion claim. Created per capture, discarded at a terminal
/// status or when the hosting screen goes away; never resumed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationAttempt {
    pub id: String,
    pub routine_id: String,
    pub status: AttemptStatus,
    pub verification_id: Option<String>,
    pub fail_reason: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl VerificationAttempt {
    pub fn new(routine_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            routine_id: routine_id.into(),
            status: AttemptStatus::Capturing,
            verification_id: None,
            fail_reason: None,
            started_at,
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to the next linear stage. An illegal jump is a programmer
    /// error in the pipeline, not a runtime condition.
    pub(crate) fn advance(&mut self, next: AttemptStatus) {
        debug_assert!(
            self.status.can_advance_to(next),
            "illegal attempt transition {:?} -> {:?}",
            self.status,
            next
        );
        self.status = next;
    }

    pub(crate) fn succeed(&mut self, at: DateTime<Utc>) {
        self.advance(AttemptStatus::Succeeded);
        self.finished_at = Some(at);
    }

    pub(crate) fn fail(&mut self, reason: String, at: DateTime<Utc>) {
        self.advance(AttemptStatus::Failed);
        self.fail_reason = Some(reason);
        self.finished_at = Some(at);
    }
}
