use std::time::Duration;

/// Tunables for the verification pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fixed delay between adjudication status polls.
    pub poll_interval: Duration,

    /// Optional ceiling on pending polls before the attempt is failed
    /// with a timeout reason. `None` reproduces the shipped client, which
    /// polls until a terminal verdict or cancellation.
    pub max_polls: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_polls: None,
        }
    }
}
