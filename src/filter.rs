use crate::config::ConfigError;
use crate::detection::DetectionBatch;
use crate::marker::MarkerType;
use std::fmt;

bitflags::bitflags! {
    /// Marker types the scanner is asked to report.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MarkerTypes: u32 {
        const ARUCO_APRIL = 1;
        const QR = 1 << 1;
        const EAN_13 = 1 << 2;
        const UPC_A = 1 << 3;
        const ALL = Self::ARUCO_APRIL.bits()
            | Self::QR.bits()
            | Self::EAN_13.bits()
            | Self::UPC_A.bits();
    }
}

impl Default for MarkerTypes {
    fn default() -> Self {
        MarkerTypes::ALL
    }
}

impl MarkerTypes {
    pub fn from_type(marker_type: MarkerType) -> Self {
        match marker_type {
            MarkerType::ArucoApril => MarkerTypes::ARUCO_APRIL,
            MarkerType::Qr => MarkerTypes::QR,
            MarkerType::Ean13 => MarkerTypes::EAN_13,
            MarkerType::UpcA => MarkerTypes::UPC_A,
            MarkerType::Unknown => MarkerTypes::empty(),
        }
    }

    pub fn from_types(types: &[MarkerType]) -> Self {
        types
            .iter()
            .fold(MarkerTypes::empty(), |acc, t| acc | Self::from_type(*t))
    }

    /// Parse `all` or a comma-separated list such as `qr,aruco`.
    pub fn parse_list(input: &str) -> Result<Self, ConfigError> {
        let mut types = MarkerTypes::empty();
        for name in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if name.eq_ignore_ascii_case("all") {
                types |= MarkerTypes::ALL;
                continue;
            }
            let t = MarkerType::from_name(name)
                .ok_or_else(|| ConfigError::UnknownMarkerType(name.to_string()))?;
            types |= Self::from_type(t);
        }
        Ok(types)
    }

    pub fn types(self) -> Vec<MarkerType> {
        MarkerType::SUPPORTED
            .into_iter()
            .filter(|t| self.contains(Self::from_type(*t)))
            .collect()
    }

    /// Unknown tags pass through so the engine can report them.
    pub fn allows(self, marker_type: MarkerType) -> bool {
        marker_type == MarkerType::Unknown || self.contains(Self::from_type(marker_type))
    }

    pub fn filter(self, batch: &DetectionBatch) -> DetectionBatch {
        DetectionBatch {
            time: batch.time,
            detections: batch
                .detections
                .iter()
                .filter(|d| self.allows(d.marker_type))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for MarkerTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == MarkerTypes::ALL {
            return f.write_str("All");
        }
        if self.is_empty() {
            return f.write_str("None");
        }
        let names: Vec<String> = self.types().iter().map(|t| t.to_string()).collect();
        f.write_str(&names.join(" | "))
    }
}
