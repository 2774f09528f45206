pub mod config;
pub mod detection;
pub mod engine;
pub mod filter;
pub mod marker;
pub mod presenter;
pub mod record;
pub mod replay;
pub mod schema;
pub mod settings;
pub mod status;
pub mod test_utils;

pub use detection::{DetectionBatch, IngestError, Payload, Pose, RawDetection};
pub use engine::{EngineConfig, EvictionPolicy, IngestReport, ReconcileEngine};
pub use marker::{MarkerIdentity, MarkerKey, MarkerType};
pub use presenter::{Presenter, RecordingPresenter};
pub use record::MarkerRecord;
