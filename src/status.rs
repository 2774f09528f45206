use crate::engine::{EngineConfig, EvictionPolicy};
use crate::record::MarkerRecord;
use crate::settings::ScannerSettings;
use colored::Colorize;

/// Human readable summary of the scanner settings and every tracked marker.
pub struct StatusPanel<'a> {
    pub settings: &'a ScannerSettings,
    pub engine: &'a EngineConfig,
    pub show_settings: bool,
    pub color: bool,
}

impl StatusPanel<'_> {
    pub fn render<V>(&self, records: &[&MarkerRecord<V>]) -> String {
        let mut lines: Vec<String> = Vec::new();

        if self.show_settings {
            lines.push(self.heading("Marker Settings:"));
            let s = self.settings;
            lines.push(format!("  Scan Types: {}", s.enabled_types()));
            lines.push(format!("  Enable Marker Scanning: {}", s.enable_scanning));
            lines.push(format!("  QR Code Size: {}", s.qr_code_size));
            lines.push(format!("  Aruco Size: {}", s.aruco_marker_size));
            lines.push(format!("  Aruco Dictionary: {:?}", s.aruco_dictionary));
            lines.push(format!("  Eviction: {}", self.eviction()));
        }

        lines.push(format!("{} {}", self.heading("Markers:"), records.len()));
        for record in records {
            let key = record.key().to_string();
            let key = if self.color {
                key.bold().yellow().to_string()
            } else {
                key
            };
            lines.push(format!("  {key}"));
            match record.status() {
                Some(status) => lines.extend(status.lines().map(|l| format!("    {l}"))),
                None => lines.push(format!("    Data: id {}", record.identity())),
            }
        }

        lines.join("\n")
    }

    fn eviction(&self) -> String {
        match self.engine.policy {
            EvictionPolicy::Immediate => "immediate".to_string(),
            EvictionPolicy::Timeout => {
                format!("timeout ({}s)", self.engine.timeout.as_secs_f64())
            }
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().cyan().to_string()
        } else {
            text.to_string()
        }
    }
}
