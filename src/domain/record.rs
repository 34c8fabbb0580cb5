// ============================================================
// Layer 3 — Metrics and Result Records
// ============================================================
// What a finished run leaves behind. The result record is written
// to disk as one JSON object per run; tensors (here just the time
// grid) are stored as plain lists of numbers.

use serde::{Deserialize, Serialize};

/// Loss and accuracy over a whole split, each averaged per sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub loss:     f64,
    pub accuracy: f64,
}

/// One row of training history, recorded at every evaluation epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub epoch:          usize,
    pub train_loss:     f64,
    pub train_accuracy: f64,
    pub val_loss:       f64,
    pub val_accuracy:   f64,
}

impl HistoryEntry {
    pub fn new(epoch: usize, train: EvalMetrics, val: EvalMetrics) -> Self {
        Self {
            epoch,
            train_loss:     train.loss,
            train_accuracy: train.accuracy,
            val_loss:       val.loss,
            val_accuracy:   val.accuracy,
        }
    }

    /// True when this evaluation beats the best validation accuracy so far
    pub fn is_improvement(&self, best_val_accuracy: f64) -> bool {
        self.val_accuracy > best_val_accuracy
    }
}

/// Everything persisted about one experiment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub dataset:        String,
    pub times:          Vec<f32>,
    pub num_classes:    usize,
    pub input_channels: usize,
    /// Human readable description of the trained model
    pub model:          String,
    pub parameters:     usize,
    pub history:        Vec<HistoryEntry>,
    pub train_metrics:  EvalMetrics,
    pub val_metrics:    EvalMetrics,
    pub test_metrics:   EvalMetrics,

    pub epochs:                         usize,
    pub num_shapelets_per_class:        usize,
    pub num_shapelet_samples:           usize,
    pub max_shapelet_length_proportion: f64,
    pub lengths_per_shapelet:           usize,
    pub num_continuous_samples:         usize,
    pub discrepancy_fn:                 String,
    pub metric_type:                    String,
    pub initialisation:                 String,
    pub lr:                             f64,
    pub plateau_patience:               usize,
    pub plateau_terminate:              usize,
    pub missing_rate:                   f64,
    pub noise_channels:                 usize,
    pub ablation_pseudometric:          bool,
    pub ablation_learntlengths:         bool,
    pub ablation_similarreg:            bool,
    pub old_shapelets:                  bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement_is_strict() {
        let train = EvalMetrics { loss: 0.5, accuracy: 0.8 };
        let val   = EvalMetrics { loss: 0.6, accuracy: 0.75 };
        let entry = HistoryEntry::new(10, train, val);
        assert!(entry.is_improvement(0.5));
        assert!(!entry.is_improvement(0.75));
    }

    #[test]
    fn test_history_serialises_flat() {
        let entry = HistoryEntry::new(
            0,
            EvalMetrics { loss: 1.0, accuracy: 0.5 },
            EvalMetrics { loss: 2.0, accuracy: 0.25 },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["epoch"], 0);
        assert_eq!(json["val_accuracy"], 0.25);
    }
}
