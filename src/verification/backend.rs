use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::media::CapturedMedia;

use super::error::VerificationError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTargetRequest {
    pub extension: String,
    pub mime_type: String,
}

impl UploadTargetRequest {
    pub fn for_media(media: &CapturedMedia) -> Self {
        Self {
            extension: media.format().extension().into(),
            mime_type: media.format().mime_type().into(),
        }
    }
}

/// A short-lived, single-use write location issued by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    pub upload_url: String,
    pub object_path: String,
}

/// One poll's worth of adjudication status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollVerdict {
    /// Adjudication still in progress; keep polling.
    Pending,
    Succeeded,
    Failed { reason: Option<String> },
}

/// Backend contract for the verification flow. Implementations never
/// retry; the pipeline decides what repeats (polling) and what fails the
/// attempt outright (everything else).
#[async_trait]
pub trait VerificationBackend: Send + Sync {
    /// Request a write location keyed by the media's extension and MIME
    /// type.
    async fn create_upload_target(
        &self,
        request: UploadTargetRequest,
    ) -> Result<UploadTarget, VerificationError>;

    /// Direct write of the media bytes to the issued target. Any
    /// non-success response is a hard failure of the attempt.
    async fn write_media(
        &self,
        target: &UploadTarget,
        media: &CapturedMedia,
    ) -> Result<(), VerificationError>;

    /// Register the uploaded object against the routine for adjudication;
    /// returns the id used for polling.
    async fn submit(
        &self,
        routine_id: &str,
        object_path: &str,
    ) -> Result<String, VerificationError>;

    /// One status check for a submitted verification.
    async fn poll(&self, verification_id: &str) -> Result<PollVerdict, VerificationError>;
}
