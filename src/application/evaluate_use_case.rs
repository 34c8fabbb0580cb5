// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Reloads a checkpoint written by a previous run and re-scores it:
//
//   Step 1: Read experiment.json and model_config.json  (Layer 6)
//   Step 2: Re-prepare the dataset exactly as the run did (Layer 4)
//   Step 3: Load the weights into the rebuilt model      (Layer 6)
//   Step 4: Evaluate train / val / test                  (Layer 5)

use anyhow::Result;

use crate::application::run_use_case::prepare_data;
use crate::data::loader::TsFileLoader;
use crate::domain::{record::EvalMetrics, traits::SeriesSource};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    trainer::{eval_loader, evaluate_metrics},
    EvalBackend,
};

#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub train: EvalMetrics,
    pub val:   EvalMetrics,
    pub test:  EvalMetrics,
}

pub struct EvaluateUseCase {
    checkpoint: CheckpointManager,
    /// Overrides the data directory stored with the run
    data_dir:   Option<String>,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: &str, data_dir: Option<String>) -> Result<Self> {
        Ok(Self { checkpoint: CheckpointManager::open(checkpoint_dir)?, data_dir })
    }

    pub fn execute(&self) -> Result<Evaluation> {
        let mut experiment = self.checkpoint.load_experiment()?;
        if let Some(dir) = &self.data_dir {
            experiment.data_dir = dir.clone();
        }
        let source = TsFileLoader::new(&experiment.data_dir);
        self.evaluate_with(&source)
    }

    pub fn evaluate_with(&self, source: &dyn SeriesSource) -> Result<Evaluation> {
        let experiment = self.checkpoint.load_experiment()?;
        let device     = Default::default();

        let data  = prepare_data(source, &experiment)?;
        let model = self.checkpoint.load_model::<EvalBackend>(&device)?;
        tracing::info!("Evaluating checkpoint for {}", experiment.dataset_name);

        let metrics = |dataset| {
            evaluate_metrics(&model, &eval_loader::<EvalBackend>(dataset, experiment.batch_size, &device))
        };
        Ok(Evaluation {
            train: metrics(data.train),
            val:   metrics(data.val),
            test:  metrics(data.test),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::run_use_case::{ExperimentConfig, RunUseCase};
    use crate::domain::{
        series::RawSeries,
        traits::Split,
    };
    use crate::infra::results::ResultStore;

    struct Bumps;

    impl SeriesSource for Bumps {
        fn load_split(&self, _: &str, split: Split) -> Result<Vec<RawSeries>> {
            let n = if split == Split::Train { 10 } else { 4 };
            Ok((0..n)
                .map(|i| {
                    let mut x = vec![0.0; 6];
                    x[if i % 2 == 0 { 1 } else { 4 }] = 1.0 + 0.1 * i as f32;
                    RawSeries::new(vec![x], if i % 2 == 0 { "a" } else { "b" })
                })
                .collect())
        }
    }

    #[test]
    fn test_reloaded_checkpoint_reproduces_test_metrics() {
        let tmp = tempfile::tempdir().unwrap();
        let ckpt_dir = tmp.path().join("ckpt");
        let cfg = ExperimentConfig {
            dataset_name:            "Bumps".into(),
            checkpoint_dir:          Some(ckpt_dir.display().to_string()),
            epochs:                  2,
            num_shapelets_per_class: 2,
            seed:                    Some(1),
            ..Default::default()
        };
        let record = RunUseCase::new(cfg)
            .run(&Bumps, &ResultStore::new(tmp.path().join("results")))
            .unwrap();

        let eval = EvaluateUseCase::new(&ckpt_dir.display().to_string(), None)
            .unwrap()
            .evaluate_with(&Bumps)
            .unwrap();
        assert!((eval.test.accuracy - record.test_metrics.accuracy).abs() < 1e-9);
        assert!((eval.test.loss - record.test_metrics.loss).abs() < 1e-6);
    }
}
