use crate::detection::{DetectionBatch, Payload, RawDetection};
use crate::marker::MarkerType;

/// Build a QR detection with a text payload.
///
/// Shared by unit and integration tests so they describe scenarios in one
/// line per detection.
///
/// # Example
///
/// ```rust
/// use markersense::test_utils::{batch, qr};
///
/// let b = batch(0.0, vec![qr("ABC", 0.0)]);
/// assert_eq!(b.len(), 1);
/// ```
pub fn qr(text: &str, timestamp: f64) -> RawDetection {
    payload(MarkerType::Qr, text, timestamp)
}

/// Build a payload detection of any payload-carrying type.
pub fn payload(marker_type: MarkerType, text: &str, timestamp: f64) -> RawDetection {
    RawDetection::payload(marker_type, Payload::Text(text.to_string()), timestamp)
}

/// Build an Aruco/April detection.
pub fn aruco(tag_id: u32, timestamp: f64) -> RawDetection {
    RawDetection::fiducial(tag_id, timestamp)
}

pub fn batch(time: f64, detections: Vec<RawDetection>) -> DetectionBatch {
    DetectionBatch::new(time, detections)
}
