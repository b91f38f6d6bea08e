pub mod attempt;
pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod pipeline;

pub use attempt::{AttemptStatus, VerificationAttempt};
pub use backend::{PollVerdict, UploadTarget, UploadTargetRequest, VerificationBackend};
pub use config::PipelineConfig;
pub use error::VerificationError;
pub use http::HttpVerificationBackend;
pub use pipeline::{AttemptHandle, VerificationPipeline};
