use crate::marker::MarkerKey;
use crate::record::MarkerRecord;
use serde::Serialize;
use std::fmt;

/// The presentation layer that owns marker visuals.
///
/// The engine calls [`allocate`](Presenter::allocate) and then
/// [`on_create`](Presenter::on_create) exactly once per record,
/// [`on_update`](Presenter::on_update) for every later observation, and
/// hands the record back through [`on_destroy`](Presenter::on_destroy) when
/// it is evicted.
pub trait Presenter {
    type Visual;

    fn allocate(&mut self, key: &MarkerKey) -> Self::Visual;
    fn on_create(&mut self, record: &mut MarkerRecord<Self::Visual>);
    fn on_update(&mut self, record: &mut MarkerRecord<Self::Visual>);
    fn on_destroy(&mut self, record: MarkerRecord<Self::Visual>);
}

/// Headless presenter.
impl Presenter for () {
    type Visual = ();

    fn allocate(&mut self, _key: &MarkerKey) {}
    fn on_create(&mut self, _record: &mut MarkerRecord<()>) {}
    fn on_update(&mut self, _record: &mut MarkerRecord<()>) {}
    fn on_destroy(&mut self, _record: MarkerRecord<()>) {}
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VisualHandle(pub u64);

impl fmt::Display for VisualHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleKind {
    Created,
    Updated,
    Destroyed,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub event: LifecycleKind,
    #[serde(flatten)]
    pub key: MarkerKey,
    pub visual: VisualHandle,
}

/// Presenter that hands out sequential handles and keeps a log of every
/// lifecycle callback.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    next_handle: u64,
    events: Vec<LifecycleEvent>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    /// Take the events logged since the last drain.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, kind: LifecycleKind) -> usize {
        self.events.iter().filter(|e| e.event == kind).count()
    }

    fn log(&mut self, event: LifecycleKind, record: &MarkerRecord<VisualHandle>) {
        self.events.push(LifecycleEvent {
            event,
            key: record.key().clone(),
            visual: *record.visual(),
        });
    }
}

impl Presenter for RecordingPresenter {
    type Visual = VisualHandle;

    fn allocate(&mut self, _key: &MarkerKey) -> VisualHandle {
        self.next_handle += 1;
        VisualHandle(self.next_handle)
    }

    fn on_create(&mut self, record: &mut MarkerRecord<VisualHandle>) {
        self.log(LifecycleKind::Created, record);
    }

    fn on_update(&mut self, record: &mut MarkerRecord<VisualHandle>) {
        self.log(LifecycleKind::Updated, record);
    }

    fn on_destroy(&mut self, record: MarkerRecord<VisualHandle>) {
        self.log(LifecycleKind::Destroyed, &record);
    }
}
