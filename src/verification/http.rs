use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::media::CapturedMedia;

use super::backend::{PollVerdict, UploadTarget, UploadTargetRequest, VerificationBackend};
use super::error::VerificationError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    routine_id: &'a str,
    object_path: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    verification_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PollResponse {
    status: String,
    #[serde(default)]
    fail_reason: Option<String>,
}

/// Production implementation of the verification contract over the REST
/// backend. Upload-target issuance and polling go to the API base URL;
/// the media write goes straight to the issued target URL.
pub struct HttpVerificationBackend {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpVerificationBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
            api_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Prefer whatever the backend said over a bare status line.
    async fn error_body(response: Response) -> String {
        let status = response.status();
        match response.text().await {
            Ok(body) if !body.trim().is_empty() => format!("{status}: {}", body.trim()),
            _ => status.to_string(),
        }
    }
}

#[async_trait]
impl VerificationBackend for HttpVerificationBackend {
    async fn create_upload_target(
        &self,
        request: UploadTargetRequest,
    ) -> Result<UploadTarget, VerificationError> {
        let response = self
            .authorize(self.client.post(self.endpoint("/uploads")))
            .json(&request)
            .send()
            .await
            .map_err(|err| VerificationError::UploadTarget(err.to_string()))?;

        if !response.status().is_success() {
            return Err(VerificationError::UploadTarget(
                Self::error_body(response).await,
            ));
        }

        response
            .json::<UploadTarget>()
            .await
            .map_err(|err| VerificationError::UploadTarget(format!("malformed response: {err}")))
    }

    async fn write_media(
        &self,
        target: &UploadTarget,
        media: &CapturedMedia,
    ) -> Result<(), VerificationError> {
        let response = self
            .client
            .put(&target.upload_url)
            .header(header::CONTENT_TYPE, media.format().mime_type())
            .body(media.bytes().to_vec())
            .send()
            .await
            .map_err(|err| VerificationError::MediaWrite(err.to_string()))?;

        if !response.status().is_success() {
            return Err(VerificationError::MediaWrite(
                Self::error_body(response).await,
            ));
        }
        Ok(())
    }

    async fn submit(
        &self,
        routine_id: &str,
        object_path: &str,
    ) -> Result<String, VerificationError> {
        let response = self
            .authorize(self.client.post(self.endpoint("/verifications")))
            .json(&SubmitRequest {
                routine_id,
                object_path,
            })
            .send()
            .await
            .map_err(|err| VerificationError::Submission(err.to_string()))?;

        if !response.status().is_success() {
            return Err(VerificationError::Submission(
                Self::error_body(response).await,
            ));
        }

        response
            .json::<SubmitResponse>()
            .await
            .map(|body| body.verification_id)
            .map_err(|err| VerificationError::Submission(format!("malformed response: {err}")))
    }

    async fn poll(&self, verification_id: &str) -> Result<PollVerdict, VerificationError> {
        let response = self
            .authorize(
                self.client
                    .get(self.endpoint(&format!("/verifications/{verification_id}"))),
            )
            .send()
            .await
            .map_err(|err| VerificationError::PollingTransport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(VerificationError::PollingTransport(
                Self::error_body(response).await,
            ));
        }

        let body = response.json::<PollResponse>().await.map_err(|err| {
            VerificationError::PollingTransport(format!("malformed response: {err}"))
        })?;

        match body.status.as_str() {
            "pending" => Ok(PollVerdict::Pending),
            "succeeded" => Ok(PollVerdict::Succeeded),
            "failed" => Ok(PollVerdict::Failed {
                reason: body.fail_reason,
            }),
            other => Err(VerificationError::PollingTransport(format!(
                "unknown verification status '{other}'"
            ))),
        }
    }
}
