use crate::marker::{MarkerKey, MarkerType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::Utf8Error;
use thiserror::Error;

/// Why a single detection was skipped during ingestion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("{marker_type} payload is not valid text: {source}")]
    Decode {
        marker_type: MarkerType,
        #[source]
        source: Utf8Error,
    },
    #[error("{0} detection carries no payload")]
    MissingPayload(MarkerType),
    #[error("{0} detection carries an empty payload")]
    EmptyPayload(MarkerType),
    #[error("{0} detection carries no tag id")]
    MissingTagId(MarkerType),
    #[error("unsupported marker type")]
    UnsupportedType,
}

/// Estimated marker pose in tracker space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Pose {
    /// Position in metres (x, y, z)
    pub position: [f32; 3],
    /// Rotation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Raw decoded content of a payload marker. On the wire this is either a
/// string or an array of bytes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }
}

/// One marker observation as delivered by the tracker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RawDetection {
    #[serde(rename = "type")]
    pub marker_type: MarkerType,
    /// Decoded tag id, set for Aruco/April markers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<u32>,
    /// Decoded content, set for QR, EAN-13 and UPC-A markers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(default)]
    pub pose: Pose,
    #[serde(default)]
    pub reprojection_error: f32,
    /// Capture time in seconds
    pub timestamp: f64,
}

impl RawDetection {
    pub fn fiducial(tag_id: u32, timestamp: f64) -> Self {
        Self {
            marker_type: MarkerType::ArucoApril,
            tag_id: Some(tag_id),
            payload: None,
            pose: Pose::default(),
            reprojection_error: 0.0,
            timestamp,
        }
    }

    pub fn payload(marker_type: MarkerType, payload: Payload, timestamp: f64) -> Self {
        Self {
            marker_type,
            tag_id: None,
            payload: Some(payload),
            pose: Pose::default(),
            reprojection_error: 0.0,
            timestamp,
        }
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_reprojection_error(mut self, error: f32) -> Self {
        self.reprojection_error = error;
        self
    }

    /// Decode the (type, identity) key of this detection.
    ///
    /// Fiducials use the decimal tag id. Payload markers use their content,
    /// which must be non-empty UTF-8.
    pub fn key(&self) -> Result<MarkerKey, IngestError> {
        let marker_type = self.marker_type;
        match marker_type {
            MarkerType::ArucoApril => {
                let id = self.tag_id.ok_or(IngestError::MissingTagId(marker_type))?;
                Ok(MarkerKey::new(marker_type, id.to_string()))
            }
            MarkerType::Qr | MarkerType::Ean13 | MarkerType::UpcA => {
                let payload = self
                    .payload
                    .as_ref()
                    .ok_or(IngestError::MissingPayload(marker_type))?;
                let text = std::str::from_utf8(payload.as_bytes())
                    .map_err(|source| IngestError::Decode {
                        marker_type,
                        source,
                    })?;
                if text.is_empty() {
                    return Err(IngestError::EmptyPayload(marker_type));
                }
                Ok(MarkerKey::new(marker_type, text))
            }
            MarkerType::Unknown => Err(IngestError::UnsupportedType),
        }
    }
}

/// Everything the tracker reported during one update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DetectionBatch {
    /// Time in seconds at which the batch was delivered
    pub time: f64,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

impl DetectionBatch {
    pub fn new(time: f64, detections: Vec<RawDetection>) -> Self {
        Self { time, detections }
    }

    pub fn empty(time: f64) -> Self {
        Self::new(time, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
