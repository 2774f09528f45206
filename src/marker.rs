use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker families reported by the tracker.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum MarkerType {
    #[serde(rename = "aruco_april", alias = "aruco", alias = "april")]
    ArucoApril,
    #[serde(rename = "qr")]
    Qr,
    #[serde(rename = "ean_13", alias = "ean13")]
    Ean13,
    #[serde(rename = "upc_a", alias = "upca")]
    UpcA,
    /// Any tag this crate does not understand
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl MarkerType {
    pub const SUPPORTED: [MarkerType; 4] = [
        MarkerType::ArucoApril,
        MarkerType::Qr,
        MarkerType::Ean13,
        MarkerType::UpcA,
    ];

    /// Fiducials are identified by a decoded integer tag id.
    pub fn is_fiducial(self) -> bool {
        matches!(self, MarkerType::ArucoApril)
    }

    /// Payload markers are identified by their decoded content.
    pub fn is_payload(self) -> bool {
        matches!(self, MarkerType::Qr | MarkerType::Ean13 | MarkerType::UpcA)
    }

    /// Name used in configuration files and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            MarkerType::ArucoApril => "aruco_april",
            MarkerType::Qr => "qr",
            MarkerType::Ean13 => "ean_13",
            MarkerType::UpcA => "upc_a",
            MarkerType::Unknown => "unknown",
        }
    }

    /// Parse a user supplied type name. Accepts the configuration id and a
    /// few common spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "aruco_april" | "aruco" | "april" | "apriltag" => Some(MarkerType::ArucoApril),
            "qr" | "qrcode" => Some(MarkerType::Qr),
            "ean_13" | "ean13" => Some(MarkerType::Ean13),
            "upc_a" | "upca" => Some(MarkerType::UpcA),
            _ => None,
        }
    }
}

impl fmt::Display for MarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarkerType::ArucoApril => "Aruco_April",
            MarkerType::Qr => "QR",
            MarkerType::Ean13 => "EAN_13",
            MarkerType::UpcA => "UPC_A",
            MarkerType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Decoded identity of a physical marker. Only unique within one
/// [`MarkerType`].
#[derive(
    Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct MarkerIdentity(String);

impl MarkerIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The (type, identity) pair that keys the record table.
#[derive(
    Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct MarkerKey {
    #[serde(rename = "type")]
    pub marker_type: MarkerType,
    #[serde(rename = "id")]
    pub identity: MarkerIdentity,
}

impl MarkerKey {
    pub fn new(marker_type: MarkerType, identity: impl Into<String>) -> Self {
        Self {
            marker_type,
            identity: MarkerIdentity::new(identity),
        }
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.marker_type, self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_marker_families() {
        assert!(MarkerType::ArucoApril.is_fiducial());
        assert!(!MarkerType::ArucoApril.is_payload());
        for t in [MarkerType::Qr, MarkerType::Ean13, MarkerType::UpcA] {
            assert!(t.is_payload());
            assert!(!t.is_fiducial());
        }
        assert!(!MarkerType::Unknown.is_payload());
        assert!(!MarkerType::Unknown.is_fiducial());
    }

    #[test]
    fn parses_type_names() {
        assert_eq!(MarkerType::from_name("aruco"), Some(MarkerType::ArucoApril));
        assert_eq!(MarkerType::from_name("April"), Some(MarkerType::ArucoApril));
        assert_eq!(MarkerType::from_name(" QR "), Some(MarkerType::Qr));
        assert_eq!(MarkerType::from_name("ean-13"), Some(MarkerType::Ean13));
        assert_eq!(MarkerType::from_name("upca"), Some(MarkerType::UpcA));
        assert_eq!(MarkerType::from_name("datamatrix"), None);
        for t in MarkerType::SUPPORTED {
            assert_eq!(MarkerType::from_name(t.id()), Some(t));
        }
    }

    #[test]
    fn unknown_tags_deserialize_to_unknown() {
        let t: MarkerType = serde_json::from_str("\"datamatrix\"").unwrap();
        assert_eq!(t, MarkerType::Unknown);
        let t: MarkerType = serde_json::from_str("\"aruco\"").unwrap();
        assert_eq!(t, MarkerType::ArucoApril);
    }

    #[test]
    fn keys_differ_across_types() {
        let aruco = MarkerKey::new(MarkerType::ArucoApril, "7");
        let qr = MarkerKey::new(MarkerType::Qr, "7");
        assert_ne!(aruco, qr);
        assert!(aruco < qr);
        assert_eq!(qr.to_string(), "QR 7");
    }

    #[test]
    fn key_serialization() {
        let key = MarkerKey::new(MarkerType::Ean13, "4006381333931");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"type":"ean_13","id":"4006381333931"}"#);
    }
}
