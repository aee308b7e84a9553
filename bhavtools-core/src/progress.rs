use serde::{Deserialize, Serialize};

/// Which batch operation a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Rename,
    Merge,
}

/// Emitted after a file has been processed on a cadence checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub stage: Stage,
    /// Files processed so far, including skipped ones
    pub processed: usize,
    pub total: usize,
}

/// How often progress events are emitted during a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressCadence {
    /// After every quarter of the matched files. Batches of fewer than four
    /// files have no whole quarter and emit nothing.
    #[default]
    Quarters,
    /// After every `n` files. `Every(0)` never fires.
    Every(usize),
    Never,
}

impl ProgressCadence {
    /// Number of files between two events for a batch of `total` files,
    /// or `None` when no event should fire.
    pub fn step(self, total: usize) -> Option<usize> {
        let step = match self {
            Self::Quarters => total / 4,
            Self::Every(n) => n,
            Self::Never => 0,
        };
        (step > 0).then_some(step)
    }

    /// Whether the file at zero-based `index` is a checkpoint.
    pub fn is_checkpoint(self, index: usize, total: usize) -> bool {
        self.step(total)
            .is_some_and(|step| (index + 1) % step == 0)
    }
}

/// Receives progress events. Implemented for closures so callers can pass
/// `&mut |event| ...` directly.
pub trait ProgressSink {
    fn on_progress(&mut self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressEvent),
{
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event);
    }
}

/// Prints `Renamed N files...` / `Merged N files...` to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn on_progress(&mut self, event: ProgressEvent) {
        println!("{}", format_event(event));
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}

pub fn format_event(event: ProgressEvent) -> String {
    let verb = match event.stage {
        Stage::Rename => "Renamed",
        Stage::Merge => "Merged",
    };
    format!("{} {} files...", verb, event.processed)
}

/// Tracks position within a batch and forwards checkpoint events to a sink.
pub(crate) struct ProgressTracker<'a> {
    stage: Stage,
    total: usize,
    cadence: ProgressCadence,
    sink: &'a mut dyn ProgressSink,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(
        stage: Stage,
        total: usize,
        cadence: ProgressCadence,
        sink: &'a mut dyn ProgressSink,
    ) -> Self {
        Self {
            stage,
            total,
            cadence,
            sink,
        }
    }

    pub(crate) fn file_done(&mut self, index: usize) {
        if self.cadence.is_checkpoint(index, self.total) {
            self.sink.on_progress(ProgressEvent {
                stage: self.stage,
                processed: index + 1,
                total: self.total,
            });
        }
    }
}
