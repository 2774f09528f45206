use crate::config::ConfigError;
use crate::detection::{DetectionBatch, IngestError};
use crate::marker::MarkerKey;
use crate::presenter::Presenter;
use crate::record::{MarkerRecord, payload_status};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// How records that are no longer observed get removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Drop every record missing from the latest batch.
    #[default]
    Immediate,
    /// Keep records until they have gone unobserved for longer than the timeout.
    Timeout,
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Immediate => f.write_str("immediate"),
            EvictionPolicy::Timeout => f.write_str("timeout"),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(EvictionPolicy::Immediate),
            "timeout" => Ok(EvictionPolicy::Timeout),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub policy: EvictionPolicy,
    /// Only consulted under [`EvictionPolicy::Timeout`]
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: EvictionPolicy::Immediate,
            timeout: Duration::from_millis(500),
        }
    }
}

impl EngineConfig {
    pub fn immediate() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            policy: EvictionPolicy::Timeout,
            timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDetection {
    /// Position of the detection within its batch
    pub index: usize,
    #[serde(serialize_with = "serialize_error")]
    pub error: IngestError,
}

fn serialize_error<S: serde::Serializer>(error: &IngestError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// What one call to [`ReconcileEngine::ingest`] or [`ReconcileEngine::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub created: usize,
    pub updated: usize,
    pub evicted: usize,
    pub skipped: Vec<SkippedDetection>,
}

/// Keeps one [`MarkerRecord`] per (type, identity) in step with the
/// tracker's detection batches.
///
/// The engine is driven by the host's update loop: [`ingest`](Self::ingest)
/// for every delivered batch and [`sweep`](Self::sweep) on every frame, or
/// [`tick`](Self::tick) for both. Callers sharing an engine across threads
/// must serialize access themselves.
pub struct ReconcileEngine<P: Presenter> {
    config: EngineConfig,
    presenter: P,
    records: HashMap<MarkerKey, MarkerRecord<P::Visual>>,
}

impl<P: Presenter> ReconcileEngine<P> {
    pub fn new(config: EngineConfig, presenter: P) -> Self {
        Self {
            config,
            presenter,
            records: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Route future callbacks to `presenter`, returning the previous one.
    /// Existing records keep the handles they were created with.
    pub fn set_presenter(&mut self, presenter: P) -> P {
        std::mem::replace(&mut self.presenter, presenter)
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Tear down every record and return the presenter.
    pub fn into_presenter(mut self) -> P {
        self.clear();
        self.presenter
    }

    pub fn get(&self, key: &MarkerKey) -> Option<&MarkerRecord<P::Visual>> {
        self.records.get(key)
    }

    pub fn records(&self) -> impl Iterator<Item = &MarkerRecord<P::Visual>> {
        self.records.values()
    }

    /// Records ordered by key.
    pub fn sorted_records(&self) -> Vec<&MarkerRecord<P::Visual>> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| a.key().cmp(b.key()));
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reconcile the record table with one detection batch.
    ///
    /// Under [`EvictionPolicy::Immediate`] records absent from the batch are
    /// evicted before any detection is processed. Detections that cannot be
    /// decoded are skipped and reported without touching other records.
    pub fn ingest(&mut self, batch: &DetectionBatch) -> IngestReport {
        let mut report = IngestReport::default();
        let keys: Vec<Result<MarkerKey, IngestError>> =
            batch.detections.iter().map(|d| d.key()).collect();

        if self.config.policy == EvictionPolicy::Immediate {
            let visible: HashSet<&MarkerKey> = keys.iter().filter_map(|k| k.as_ref().ok()).collect();
            report.evicted = self.evict_where(|record| !visible.contains(record.key()));
        }

        for (index, (detection, key)) in batch.detections.iter().zip(keys).enumerate() {
            let key = match key {
                Ok(key) => key,
                Err(error) => {
                    match error {
                        IngestError::UnsupportedType => {
                            debug!(index, "ignoring detection of unsupported marker type")
                        }
                        _ => warn!(index, %error, "skipping detection"),
                    }
                    report.skipped.push(SkippedDetection { index, error });
                    continue;
                }
            };

            let status = key
                .marker_type
                .is_payload()
                .then(|| payload_status(&key, detection));

            if let Some(record) = self.records.get_mut(&key) {
                record.observe(detection.clone(), status);
                self.presenter.on_update(record);
                report.updated += 1;
            } else {
                debug!(marker = %key, "creating marker record");
                let visual = self.presenter.allocate(&key);
                let record = MarkerRecord::new(key.clone(), detection.clone(), status, visual);
                let record = self.records.entry(key).or_insert(record);
                self.presenter.on_create(record);
                report.created += 1;
            }
        }

        report
    }

    /// Evict records that have gone unobserved for longer than the timeout.
    /// Does nothing under [`EvictionPolicy::Immediate`].
    pub fn sweep(&mut self, now: f64) -> usize {
        if self.config.policy != EvictionPolicy::Timeout {
            return 0;
        }
        let timeout = self.config.timeout.as_secs_f64();
        self.evict_where(|record| now - record.last_seen() > timeout)
    }

    /// One host update: ingest `batch` if one arrived, then sweep at `now`.
    pub fn tick(&mut self, batch: Option<&DetectionBatch>, now: f64) -> IngestReport {
        let mut report = batch.map(|b| self.ingest(b)).unwrap_or_default();
        report.evicted += self.sweep(now);
        report
    }

    /// Evict every record. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        self.evict_where(|_| true)
    }

    fn evict_where(&mut self, mut stale: impl FnMut(&MarkerRecord<P::Visual>) -> bool) -> usize {
        let mut keys: Vec<MarkerKey> = self
            .records
            .values()
            .filter(|&record| stale(record))
            .map(|record| record.key().clone())
            .collect();
        keys.sort();

        for key in &keys {
            if let Some(record) = self.records.remove(key) {
                debug!(marker = %key, last_seen = record.last_seen(), "evicting marker record");
                self.presenter.on_destroy(record);
            }
        }
        keys.len()
    }
}
