use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::media::CapturedMedia;
use crate::store::RoutineStore;

use super::attempt::{AttemptStatus, VerificationAttempt};
use super::backend::{PollVerdict, UploadTargetRequest, VerificationBackend};
use super::config::PipelineConfig;
use super::error::VerificationError;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const TIMEOUT_REASON: &str = "verification timed out, please try again";

/// Drives verification attempts: upload target → media write → submit →
/// poll, terminating in Succeeded or Failed. The routine's completion
/// flag is written exactly once, on a confirmed Succeeded verdict.
#[derive(Clone)]
pub struct VerificationPipeline {
    backend: Arc<dyn VerificationBackend>,
    store: Arc<dyn RoutineStore>,
    clock: Arc<dyn Clock>,
    config: PipelineConfig,
}

/// Live handle on one in-flight attempt. `updates` is lossless: every
/// stage transition is delivered in order. `abandon` is what the hosting
/// screen calls on dismissal; it stops the poll loop immediately and no
/// further transitions are published.
pub struct AttemptHandle {
    pub updates: mpsc::UnboundedReceiver<VerificationAttempt>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl AttemptHandle {
    pub fn abandon(&self) {
        self.cancel.cancel();
    }

    /// Wait for the worker task to finish (terminal status or abandoned).
    pub async fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl VerificationPipeline {
    pub fn new(
        backend: Arc<dyn VerificationBackend>,
        store: Arc<dyn RoutineStore>,
        clock: Arc<dyn Clock>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
            config,
        }
    }

    /// Launch one attempt for a routine with already-captured media. The
    /// UI prevents a second capture for the same routine while one is in
    /// flight; attempts for different routines are independent.
    pub fn start_attempt(&self, routine_id: &str, media: CapturedMedia) -> AttemptHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let attempt = VerificationAttempt::new(routine_id, self.clock.now_utc());

        let handle = tokio::spawn(run_attempt(
            self.backend.clone(),
            self.store.clone(),
            self.clock.clone(),
            self.config.clone(),
            attempt,
            media,
            tx,
            cancel.clone(),
        ));

        AttemptHandle {
            updates: rx,
            cancel,
            handle: Some(handle),
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_attempt(
    backend: Arc<dyn VerificationBackend>,
    store: Arc<dyn RoutineStore>,
    clock: Arc<dyn Clock>,
    config: PipelineConfig,
    mut attempt: VerificationAttempt,
    media: CapturedMedia,
    updates: mpsc::UnboundedSender<VerificationAttempt>,
    cancel: CancellationToken,
) {
    publish(&updates, &attempt);

    attempt.advance(AttemptStatus::Uploading);
    publish(&updates, &attempt);

    let request = UploadTargetRequest::for_media(&media);
    let target = match backend.create_upload_target(request).await {
        Ok(target) => target,
        Err(err) => return fail_attempt(&mut attempt, err, &clock, &updates),
    };
    if let Err(err) = backend.write_media(&target, &media).await {
        return fail_attempt(&mut attempt, err, &clock, &updates);
    }

    attempt.advance(AttemptStatus::Submitting);
    publish(&updates, &attempt);

    let verification_id = match backend.submit(&attempt.routine_id, &target.object_path).await {
        Ok(id) => id,
        Err(err) => return fail_attempt(&mut attempt, err, &clock, &updates),
    };
    attempt.verification_id = Some(verification_id.clone());

    attempt.advance(AttemptStatus::Polling);
    publish(&updates, &attempt);

    let mut pending_polls: u32 = 0;
    loop {
        let verdict = tokio::select! {
            verdict = backend.poll(&verification_id) => verdict,
            _ = cancel.cancelled() => {
                log_info!("attempt {} abandoned while polling", attempt.id);
                return;
            }
        };

        match verdict {
            Err(err) => return fail_attempt(&mut attempt, err, &clock, &updates),
            Ok(PollVerdict::Succeeded) => {
                if !store.mark_done(&attempt.routine_id) {
                    log_warn!(
                        "verification succeeded but routine {} is gone from the store",
                        attempt.routine_id
                    );
                }
                attempt.succeed(clock.now_utc());
                publish(&updates, &attempt);
                log_info!("attempt {} succeeded for routine {}", attempt.id, attempt.routine_id);
                return;
            }
            Ok(PollVerdict::Failed { reason }) => {
                let err = VerificationError::AdjudicationRejected(
                    reason.unwrap_or_else(|| "the submitted photo was not approved".into()),
                );
                return fail_attempt(&mut attempt, err, &clock, &updates);
            }
            Ok(PollVerdict::Pending) => {
                pending_polls += 1;
                if let Some(max_polls) = config.max_polls {
                    if pending_polls >= max_polls {
                        log_warn!(
                            "attempt {} hit the poll ceiling ({max_polls}) while still pending",
                            attempt.id
                        );
                        attempt.fail(TIMEOUT_REASON.into(), clock.now_utc());
                        publish(&updates, &attempt);
                        return;
                    }
                }
                tokio::select! {
                    _ = tokio::time::sleep(config.poll_interval) => {}
                    _ = cancel.cancelled() => {
                        log_info!("attempt {} abandoned between polls", attempt.id);
                        return;
                    }
                }
            }
        }
    }
}

fn publish(updates: &mpsc::UnboundedSender<VerificationAttempt>, attempt: &VerificationAttempt) {
    // Err just means the hosting screen dropped its receiver.
    let _ = updates.send(attempt.clone());
}

fn fail_attempt(
    attempt: &mut VerificationAttempt,
    err: VerificationError,
    clock: &Arc<dyn Clock>,
    updates: &mpsc::UnboundedSender<VerificationAttempt>,
) {
    log_warn!("attempt {} failed at {:?}: {err}", attempt.id, attempt.status);
    attempt.fail(err.user_message(), clock.now_utc());
    publish(updates, attempt);
}
