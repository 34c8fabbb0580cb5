// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the best model of a run using Burn's
// DefaultRecorder (named MessagePack, gzipped, full precision).
// Weights stay f32 so a reloaded model reproduces the run's metrics.
//
// What gets saved per checkpoint:
//   1. Model weights (.mpk.gz file) — shapelets, lengths,
//      pseudometric and linear layer
//   2. model_config.json            — LinearShapeletConfig
//   3. experiment.json              — the ExperimentConfig of the run
//
// Why save the configs separately?
//   The model config rebuilds the exact architecture before the
//   weights are loaded into it. The experiment config lets
//   `evaluate` re-prepare the same dataset: the split seed is
//   fixed, so the same train/val/test partition comes back.
//
// File layout:
//   <checkpoint_dir>/
//     model.mpk.gz
//     model_config.json
//     experiment.json
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{DefaultRecorder, Recorder},
};
use std::{fs, path::PathBuf};

use crate::application::run_use_case::ExperimentConfig;
use crate::ml::model::{LinearShapeletConfig, LinearShapeletModel};

const MODEL_FILE:        &str = "model";
const MODEL_CONFIG_FILE: &str = "model_config.json";
const EXPERIMENT_FILE:   &str = "experiment.json";

/// Manages saving and loading of one run's checkpoint.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, making the directory (and parents) if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open an existing checkpoint directory without creating anything.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            anyhow::bail!("No checkpoint directory at '{}'. Run with --checkpoint-dir first.", dir.display());
        }
        Ok(Self { dir })
    }

    /// Save model weights. The recorder adds the `.mpk.gz` extension.
    pub fn save_model<B: Backend>(&self, model: &LinearShapeletModel<B>) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);
        DefaultRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        tracing::info!("Saved model checkpoint to '{}'", path.display());
        Ok(())
    }

    /// Rebuild the model from the saved config and load its weights.
    pub fn load_model<B: Backend>(&self, device: &B::Device) -> Result<LinearShapeletModel<B>> {
        let model_cfg = self.load_model_config()?;
        let path      = self.dir.join(MODEL_FILE);
        let record    = DefaultRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;
        Ok(model_cfg.init::<B>(device).load_record(record))
    }

    pub fn save_configs(&self, model_cfg: &LinearShapeletConfig, experiment: &ExperimentConfig) -> Result<()> {
        let path = self.dir.join(MODEL_CONFIG_FILE);
        model_cfg
            .save(&path)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))?;

        let path = self.dir.join(EXPERIMENT_FILE);
        fs::write(&path, serde_json::to_string_pretty(experiment)?)
            .with_context(|| format!("Cannot write experiment config to '{}'", path.display()))?;

        tracing::debug!("Saved configs to '{}'", self.dir.display());
        Ok(())
    }

    pub fn load_model_config(&self) -> Result<LinearShapeletConfig> {
        let path = self.dir.join(MODEL_CONFIG_FILE);
        LinearShapeletConfig::load(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read model config '{}': {e}", path.display()))
    }

    pub fn load_experiment(&self) -> Result<ExperimentConfig> {
        let path = self.dir.join(EXPERIMENT_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read experiment config '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::TimeGrid;
    use crate::ml::discrepancy::{DiscrepancyKind, MetricType};
    use burn::backend::NdArray;

    type B = NdArray;

    fn model_config() -> LinearShapeletConfig {
        LinearShapeletConfig {
            in_channels:            1,
            out_channels:           3,
            num_shapelets:          3,
            num_shapelet_samples:   4,
            num_continuous_samples: 5,
            lengths_per_shapelet:   1,
            max_shapelet_length:    3.0,
            grid:                   TimeGrid::unit(5),
            discrepancy:            DiscrepancyKind::Logsig { depth: 2 },
            metric:                 Some(MetricType::Diagonal),
            learn_lengths:          true,
            lengths_at_max:         false,
            log:                    true,
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(tmp.path().join("run")).unwrap();
        let device = Default::default();
        let cfg    = model_config();
        let model  = cfg.init::<B>(&device);

        ckpt.save_model(&model).unwrap();
        ckpt.save_configs(&cfg, &ExperimentConfig::default()).unwrap();

        let loaded = ckpt.load_model::<B>(&device).unwrap();
        let before: Vec<f32> = model.transform.shapelets.val().into_data().convert::<f32>().to_vec().unwrap();
        let after: Vec<f32>  = loaded.transform.shapelets.val().into_data().convert::<f32>().to_vec().unwrap();
        assert_eq!(before, after);
        assert_eq!(model.transform.length_values(), loaded.transform.length_values());
        assert_eq!(ckpt.load_experiment().unwrap().dataset_name, "BasicMotions");
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(CheckpointManager::open(tmp.path().join("nope")).is_err());
    }
}
