use crate::detection::RawDetection;
use crate::marker::{MarkerIdentity, MarkerKey, MarkerType};
use serde::Serialize;

/// A tracked marker, owned by the [`ReconcileEngine`](crate::engine::ReconcileEngine).
///
/// `V` is the presentation handle allocated by the presenter when the record
/// is created and handed back to it when the record is evicted. Records are
/// not `Clone`, so a handle cannot outlive its record:
///
/// ```compile_fail
/// fn needs_clone<T: Clone>() {}
/// needs_clone::<markersense::MarkerRecord<()>>();
/// ```
#[derive(Debug, Serialize)]
pub struct MarkerRecord<V> {
    #[serde(flatten)]
    key: MarkerKey,
    last_observation: RawDetection,
    last_seen: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    visual: V,
}

impl<V> MarkerRecord<V> {
    pub(crate) fn new(
        key: MarkerKey,
        observation: RawDetection,
        status: Option<String>,
        visual: V,
    ) -> Self {
        Self {
            last_seen: observation.timestamp,
            key,
            last_observation: observation,
            status,
            visual,
        }
    }

    /// Replace the observation. `last_seen` never moves backwards.
    pub(crate) fn observe(&mut self, observation: RawDetection, status: Option<String>) {
        self.last_seen = self.last_seen.max(observation.timestamp);
        self.last_observation = observation;
        self.status = status;
    }

    pub fn key(&self) -> &MarkerKey {
        &self.key
    }

    pub fn identity(&self) -> &MarkerIdentity {
        &self.key.identity
    }

    pub fn marker_type(&self) -> MarkerType {
        self.key.marker_type
    }

    pub fn last_observation(&self) -> &RawDetection {
        &self.last_observation
    }

    pub fn last_seen(&self) -> f64 {
        self.last_seen
    }

    /// Status text for payload markers; `None` for fiducials.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn visual(&self) -> &V {
        &self.visual
    }

    pub fn visual_mut(&mut self) -> &mut V {
        &mut self.visual
    }

    pub fn into_visual(self) -> V {
        self.visual
    }
}

/// Status line shown for payload markers.
pub fn payload_status(key: &MarkerKey, observation: &RawDetection) -> String {
    format!(
        "Type: {}\nReprojection Error: {}\nData: {}",
        key.marker_type, observation.reprojection_error, key.identity
    )
}
