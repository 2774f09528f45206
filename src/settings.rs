use crate::config::ConfigError;
use crate::filter::MarkerTypes;
use crate::marker::MarkerType;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound on frames per second the tracker analyses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FpsHint {
    Low,
    Medium,
    #[default]
    High,
    Max,
}

/// Camera resolution the tracker should request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionHint {
    #[default]
    Low,
    Medium,
    High,
}

/// How often a full-frame analysis (needed to pick up new markers) runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FullAnalysisIntervalHint {
    Max,
    Fast,
    #[default]
    Medium,
    Slow,
}

/// Corner refinement for Aruco/April tags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CornerRefineMethod {
    #[default]
    None,
    Subpix,
    Contour,
    AprilTag,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArucoDictionary {
    Dict4x4_50,
    Dict4x4_100,
    Dict4x4_250,
    Dict4x4_1000,
    Dict5x5_50,
    #[default]
    Dict5x5_100,
    Dict5x5_250,
    Dict5x5_1000,
    Dict6x6_50,
    Dict6x6_100,
    Dict6x6_250,
    Dict6x6_1000,
    Dict7x7_50,
    Dict7x7_100,
    Dict7x7_250,
    Dict7x7_1000,
    DictArucoOriginal,
    DictAprilTag16h5,
    DictAprilTag25h9,
    DictAprilTag36h10,
    DictAprilTag36h11,
}

/// Settings handed to the marker scanner. The reconciliation engine does not
/// read them; they are reported in the status panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScannerSettings {
    pub enable_scanning: bool,
    #[serde(deserialize_with = "marker_types_by_name")]
    pub marker_types: Vec<MarkerType>,
    /// Side length of a QR code in metres, without the quiet zone
    pub qr_code_size: f64,
    pub aruco_dictionary: ArucoDictionary,
    /// Side length of an Aruco marker in metres
    pub aruco_marker_size: f64,
    pub fps_hint: FpsHint,
    pub resolution_hint: ResolutionHint,
    pub full_analysis_interval_hint: FullAnalysisIntervalHint,
    pub corner_refine_method: CornerRefineMethod,
    pub use_edge_refinement: bool,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            enable_scanning: false,
            marker_types: MarkerType::SUPPORTED.to_vec(),
            qr_code_size: 0.1,
            aruco_dictionary: ArucoDictionary::default(),
            aruco_marker_size: 0.1,
            fps_hint: FpsHint::default(),
            resolution_hint: ResolutionHint::default(),
            full_analysis_interval_hint: FullAnalysisIntervalHint::default(),
            corner_refine_method: CornerRefineMethod::default(),
            use_edge_refinement: false,
        }
    }
}

impl ScannerSettings {
    pub fn enabled_types(&self) -> MarkerTypes {
        MarkerTypes::from_types(&self.marker_types)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_size("qr_code_size", self.qr_code_size)?;
        check_size("aruco_marker_size", self.aruco_marker_size)?;
        if self.marker_types.contains(&MarkerType::Unknown) {
            return Err(ConfigError::UnknownMarkerType("unknown".to_string()));
        }
        Ok(())
    }
}

/// Reads type names with [`MarkerType::from_name`] so a typo is reported by
/// the name that was written.
fn marker_types_by_name<'de, D>(deserializer: D) -> Result<Vec<MarkerType>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|name| {
            MarkerType::from_name(name).ok_or_else(|| {
                serde::de::Error::custom(ConfigError::UnknownMarkerType(name.clone()))
            })
        })
        .collect()
}

fn check_size(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMarkerSize { name, value })
    }
}
