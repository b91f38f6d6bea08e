//! End-to-end verification pipeline tests against a scripted backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use routinely::clock::SystemClock;
use routinely::media::{CapturedMedia, MediaFormat};
use routinely::models::{Frequency, Routine};
use routinely::store::{InMemoryRoutineStore, RoutineStore};
use routinely::verification::{
    AttemptStatus, PipelineConfig, PollVerdict, UploadTarget, UploadTargetRequest,
    VerificationBackend, VerificationError, VerificationPipeline,
};

/// Records every backend call in order and replays a scripted sequence
/// of poll verdicts; an exhausted script keeps answering Pending.
#[derive(Default)]
struct ScriptedBackend {
    calls: Mutex<Vec<&'static str>>,
    poll_times: Mutex<Vec<Instant>>,
    poll_script: Mutex<VecDeque<Result<PollVerdict, VerificationError>>>,
    fail_upload_target: bool,
    fail_media_write: bool,
    fail_submit: bool,
}

impl ScriptedBackend {
    fn with_polls(
        script: impl IntoIterator<Item = Result<PollVerdict, VerificationError>>,
    ) -> Self {
        Self {
            poll_script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    fn call_log(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn poll_count(&self) -> usize {
        self.poll_times.lock().unwrap().len()
    }
}

#[async_trait]
impl VerificationBackend for ScriptedBackend {
    async fn create_upload_target(
        &self,
        _request: UploadTargetRequest,
    ) -> Result<UploadTarget, VerificationError> {
        self.calls.lock().unwrap().push("createUploadTarget");
        if self.fail_upload_target {
            return Err(VerificationError::UploadTarget("backend unreachable".into()));
        }
        Ok(UploadTarget {
            upload_url: "https://bucket.example/slot-1".into(),
            object_path: "verifications/slot-1.jpg".into(),
        })
    }

    async fn write_media(
        &self,
        _target: &UploadTarget,
        _media: &CapturedMedia,
    ) -> Result<(), VerificationError> {
        self.calls.lock().unwrap().push("writeMedia");
        if self.fail_media_write {
            return Err(VerificationError::MediaWrite("403: slot expired".into()));
        }
        Ok(())
    }

    async fn submit(
        &self,
        _routine_id: &str,
        _object_path: &str,
    ) -> Result<String, VerificationError> {
        self.calls.lock().unwrap().push("submit");
        if self.fail_submit {
            return Err(VerificationError::Submission("unknown object path".into()));
        }
        Ok("v-1".into())
    }

    async fn poll(&self, _verification_id: &str) -> Result<PollVerdict, VerificationError> {
        self.calls.lock().unwrap().push("poll");
        self.poll_times.lock().unwrap().push(Instant::now());
        self.poll_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PollVerdict::Pending))
    }
}

fn media() -> CapturedMedia {
    CapturedMedia::with_format(vec![0xFF, 0xD8, 0xFF], MediaFormat::Jpeg)
}

fn store_with(id: &str) -> Arc<InMemoryRoutineStore> {
    Arc::new(InMemoryRoutineStore::new([Routine {
        id: id.into(),
        title: "Morning run".into(),
        frequency: Frequency::Daily,
        start_time: Some("09:00".into()),
        end_time: Some("10:30".into()),
        is_done: false,
        is_failed: false,
    }]))
}

fn pipeline(
    backend: Arc<ScriptedBackend>,
    store: Arc<InMemoryRoutineStore>,
    config: PipelineConfig,
) -> VerificationPipeline {
    VerificationPipeline::new(backend, store, Arc::new(SystemClock), config)
}

fn drain_statuses(
    updates: &mut tokio::sync::mpsc::UnboundedReceiver<routinely::VerificationAttempt>,
) -> Vec<AttemptStatus> {
    let mut statuses = Vec::new();
    while let Ok(update) = updates.try_recv() {
        statuses.push(update.status);
    }
    statuses
}

#[tokio::test(start_paused = true)]
async fn attempt_walks_every_stage_in_order() {
    let backend = Arc::new(ScriptedBackend::with_polls([
        Ok(PollVerdict::Pending),
        Ok(PollVerdict::Pending),
        Ok(PollVerdict::Succeeded),
    ]));
    let store = store_with("r-1");
    let pipeline = pipeline(backend.clone(), store.clone(), PipelineConfig::default());

    let mut handle = pipeline.start_attempt("r-1", media());
    handle.join().await;

    let statuses = drain_statuses(&mut handle.updates);
    assert_eq!(
        statuses,
        [
            AttemptStatus::Capturing,
            AttemptStatus::Uploading,
            AttemptStatus::Submitting,
            AttemptStatus::Polling,
            AttemptStatus::Succeeded,
        ]
    );
    assert_eq!(
        backend.call_log(),
        ["createUploadTarget", "writeMedia", "submit", "poll", "poll", "poll"]
    );
    assert!(store.routine("r-1").unwrap().is_done);
}

#[tokio::test(start_paused = true)]
async fn polling_stops_at_terminal_verdict_with_fixed_spacing() {
    let backend = Arc::new(ScriptedBackend::with_polls([
        Ok(PollVerdict::Pending),
        Ok(PollVerdict::Pending),
        Ok(PollVerdict::Succeeded),
    ]));
    let store = store_with("r-1");
    let pipeline = pipeline(backend.clone(), store, PipelineConfig::default());

    let mut handle = pipeline.start_attempt("r-1", media());
    handle.join().await;

    let times = backend.poll_times.lock().unwrap().clone();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(2));
    assert_eq!(times[2] - times[1], Duration::from_secs(2));

    // No fourth call after the terminal verdict.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(backend.poll_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn abandoning_an_attempt_stops_polling() {
    let backend = Arc::new(ScriptedBackend::default());
    let store = store_with("r-1");
    let pipeline = pipeline(backend.clone(), store.clone(), PipelineConfig::default());

    let mut handle = pipeline.start_attempt("r-1", media());

    // Let the attempt reach its first poll, then dismiss the screen.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(backend.poll_count(), 1);

    handle.abandon();
    handle.join().await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.poll_count(), 1);

    // The discarded attempt got no terminal transition and the routine
    // is untouched.
    let statuses = drain_statuses(&mut handle.updates);
    assert_eq!(statuses.last(), Some(&AttemptStatus::Polling));
    assert!(!store.routine("r-1").unwrap().is_done);
}

#[tokio::test(start_paused = true)]
async fn upload_target_failure_is_terminal() {
    let backend = Arc::new(ScriptedBackend {
        fail_upload_target: true,
        ..ScriptedBackend::default()
    });
    let store = store_with("r-1");
    let pipeline = pipeline(backend.clone(), store.clone(), PipelineConfig::default());

    let mut handle = pipeline.start_attempt("r-1", media());
    handle.join().await;

    let statuses = drain_statuses(&mut handle.updates);
    assert_eq!(
        statuses,
        [
            AttemptStatus::Capturing,
            AttemptStatus::Uploading,
            AttemptStatus::Failed,
        ]
    );
    // Upload never happened, nothing downstream was attempted.
    assert_eq!(backend.call_log(), ["createUploadTarget"]);
    assert!(!store.routine("r-1").unwrap().is_done);
}

#[tokio::test(start_paused = true)]
async fn media_write_failure_carries_backend_message() {
    let backend = Arc::new(ScriptedBackend {
        fail_media_write: true,
        ..ScriptedBackend::default()
    });
    let store = store_with("r-1");
    let pipeline = pipeline(backend.clone(), store, PipelineConfig::default());

    let mut handle = pipeline.start_attempt("r-1", media());
    handle.join().await;

    let mut last = None;
    while let Ok(update) = handle.updates.try_recv() {
        last = Some(update);
    }
    let last = last.unwrap();
    assert_eq!(last.status, AttemptStatus::Failed);
    assert!(last.fail_reason.as_deref().unwrap().contains("slot expired"));
}

#[tokio::test(start_paused = true)]
async fn adjudication_rejection_surfaces_the_reason() {
    let backend = Arc::new(ScriptedBackend::with_polls([
        Ok(PollVerdict::Pending),
        Ok(PollVerdict::Failed {
            reason: Some("no running shoes visible".into()),
        }),
    ]));
    let store = store_with("r-1");
    let pipeline = pipeline(backend.clone(), store.clone(), PipelineConfig::default());

    let mut handle = pipeline.start_attempt("r-1", media());
    handle.join().await;

    let mut last = None;
    while let Ok(update) = handle.updates.try_recv() {
        last = Some(update);
    }
    let last = last.unwrap();
    assert_eq!(last.status, AttemptStatus::Failed);
    assert!(last
        .fail_reason
        .as_deref()
        .unwrap()
        .contains("no running shoes visible"));
    assert!(!store.routine("r-1").unwrap().is_done);
}

#[tokio::test(start_paused = true)]
async fn polling_transport_error_reads_as_connectivity() {
    let backend = Arc::new(ScriptedBackend::with_polls([Err(
        VerificationError::PollingTransport("connection reset by peer".into()),
    )]));
    let store = store_with("r-1");
    let pipeline = pipeline(backend.clone(), store, PipelineConfig::default());

    let mut handle = pipeline.start_attempt("r-1", media());
    handle.join().await;

    let mut last = None;
    while let Ok(update) = handle.updates.try_recv() {
        last = Some(update);
    }
    let reason = last.unwrap().fail_reason.unwrap();
    assert!(reason.contains("connection problem"));
    assert!(reason.contains("connection reset by peer"));
}

#[tokio::test(start_paused = true)]
async fn poll_ceiling_fails_the_attempt_when_configured() {
    let backend = Arc::new(ScriptedBackend::default());
    let store = store_with("r-1");
    let config = PipelineConfig {
        max_polls: Some(3),
        ..PipelineConfig::default()
    };
    let pipeline = pipeline(backend.clone(), store.clone(), config);

    let mut handle = pipeline.start_attempt("r-1", media());
    handle.join().await;

    assert_eq!(backend.poll_count(), 3);
    let mut last = None;
    while let Ok(update) = handle.updates.try_recv() {
        last = Some(update);
    }
    let last = last.unwrap();
    assert_eq!(last.status, AttemptStatus::Failed);
    assert!(last.fail_reason.as_deref().unwrap().contains("timed out"));
    assert!(!store.routine("r-1").unwrap().is_done);
}
