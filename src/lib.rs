pub mod clock;
pub mod media;
pub mod models;
pub mod status;
pub mod store;
pub mod ticker;
pub mod utils;
pub mod verification;

pub use clock::{Clock, ManualClock, SystemClock};
pub use media::{CannedMediaSource, CapturedMedia, MediaFormat, MediaSource};
pub use models::{Frequency, Routine, Schedule, TimeOfDay};
pub use status::{DisplayState, StatusMonitor, StatusSnapshot, UrgencyTier};
pub use store::{InMemoryRoutineStore, RoutineStore};
pub use ticker::SharedTicker;
pub use verification::{
    AttemptHandle, AttemptStatus, HttpVerificationBackend, PipelineConfig, VerificationAttempt,
    VerificationBackend, VerificationError, VerificationPipeline,
};
