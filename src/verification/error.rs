use thiserror::Error;

/// Failure taxonomy for one verification attempt. Each variant carries
/// the most specific message available (backend-supplied when there is
/// one); the pipeline converts every error into the terminal Failed
/// status with this text as the reason.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Could not obtain a write location from the backend.
    #[error("could not get an upload slot: {0}")]
    UploadTarget(String),

    /// The direct write of the media bytes failed or was rejected.
    #[error("photo upload failed: {0}")]
    MediaWrite(String),

    /// The backend rejected the verification submission.
    #[error("verification submission rejected: {0}")]
    Submission(String),

    /// Transient network failure while checking status. Connectivity
    /// trouble, not an AI rejection; the user retries the network, not
    /// the physical action.
    #[error("connection problem while checking verification: {0}")]
    PollingTransport(String),

    /// The AI adjudicator explicitly returned a failed verdict.
    #[error("verification rejected: {0}")]
    AdjudicationRejected(String),
}

impl VerificationError {
    /// Reason text surfaced to the user. Never blank: this string is the
    /// only thing telling a retryable failure apart from a rejection.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Recoverable failures can be retried with a fresh attempt as-is;
    /// an adjudicated rejection means the physical action must be redone.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, VerificationError::AdjudicationRejected(_))
    }
}
