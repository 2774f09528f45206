use crate::detection::DetectionBatch;
use schemars::schema::RootSchema;

/// Version of the batch wire format.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// JSON Schema describing one line of a replay file.
pub fn batch_schema() -> RootSchema {
    schemars::schema_for!(DetectionBatch)
}

pub fn batch_schema_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&batch_schema())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_constant() {
        assert_eq!(SCHEMA_VERSION, "0.1.0");
    }

    #[test]
    fn json_schema_generates() {
        let json = batch_schema_json().unwrap();
        assert!(json.contains("DetectionBatch"));
        assert!(json.contains("RawDetection"));
        assert!(json.contains("reprojection_error"));
    }

    #[test]
    fn schema_lists_marker_types() {
        let json = serde_json::to_value(batch_schema()).unwrap();
        let types = json["definitions"]["MarkerType"].to_string();
        assert!(types.contains("aruco_april"));
        assert!(types.contains("upc_a"));
    }
}
