// ============================================================
// Layer 6 — Result Store
// ============================================================
// Persists one JSON file per finished run:
//
//   <root>/
//     <folder>/               e.g. uea_comparison
//       <subfolder>/          e.g. BasicMotions-L2-diagonal
//         0                   ← first run
//         1                   ← second run
//         ...
//
// File names are plain integers. The next run is written to
// (largest existing integer + 1); anything that does not parse as an
// integer is ignored, so notes or plots can live alongside.
//
// The number of integer files is what the suites compare against
// `n_done` to decide whether a configuration still needs running.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::record::RunRecord;
use crate::domain::traits::ResultSink;

pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dir(&self, folder: &str, subfolder: &str) -> PathBuf {
        self.root.join(folder).join(subfolder)
    }

    /// Integer file names already present in `dir` (empty if it does not exist).
    fn run_numbers(dir: &Path) -> Result<Vec<u64>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut numbers = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Cannot list '{}'", dir.display()))? {
            let entry = entry?;
            if let Some(n) = entry.file_name().to_str().and_then(|name| name.parse::<u64>().ok()) {
                numbers.push(n);
            }
        }
        Ok(numbers)
    }
}

impl ResultSink for ResultStore {
    fn save(&self, folder: &str, subfolder: &str, record: &RunRecord) -> Result<String> {
        let dir = self.dir(folder, subfolder);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create result directory '{}'", dir.display()))?;

        let next = Self::run_numbers(&dir)?.into_iter().max().map_or(0, |n| n + 1);
        let path = dir.join(next.to_string());

        let json = serde_json::to_string(record)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write result to '{}'", path.display()))?;

        tracing::info!("Saved result to '{}'", path.display());
        Ok(path.display().to_string())
    }

    fn count(&self, folder: &str, subfolder: &str) -> Result<usize> {
        Ok(Self::run_numbers(&self.dir(folder, subfolder))?.len())
    }
}
