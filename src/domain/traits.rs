// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to storage through these traits so
// the .ts reader and the JSON result store can be swapped (or
// faked in tests) without touching the experiment workflow.

use anyhow::Result;
use std::fmt;

use crate::domain::record::RunRecord;
use crate::domain::series::RawSeries;

/// Which half of an archive dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "TRAIN"),
            Split::Test  => write!(f, "TEST"),
        }
    }
}

// ─── SeriesSource ─────────────────────────────────────────────────────────────
/// Anything that can produce the labelled cases of a named dataset.
///
/// Implementations:
///   - TsFileLoader → reads the UEA archive's .ts files
///   - in-memory sources in tests
pub trait SeriesSource {
    fn load_split(&self, dataset: &str, split: Split) -> Result<Vec<RawSeries>>;
}

// ─── ResultSink ───────────────────────────────────────────────────────────────
/// Anything that can persist finished runs and report how many exist.
pub trait ResultSink {
    /// Persist one run record; returns a description of where it went
    fn save(&self, folder: &str, subfolder: &str, record: &RunRecord) -> Result<String>;

    /// How many runs have already been saved under this subfolder
    fn count(&self, folder: &str, subfolder: &str) -> Result<usize>;

    fn is_done(&self, folder: &str, subfolder: &str, n_done: usize) -> Result<bool> {
        Ok(self.count(folder, subfolder)? >= n_done)
    }
}
