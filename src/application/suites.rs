// ============================================================
// Layer 2 — Ablation Suites
// ============================================================
// Each suite is a fixed grid of experiment configurations written
// into one result folder. Before every run the result store is asked
// whether the configuration already has `n_done` results; if so the
// run is skipped, which makes a suite safe to restart after a crash.
//
//   comparison      first 11 datasets by cost × {L2, logsig-3, old},
//                   diagonal pseudometric
//   comparison-new  as above plus plain L2, seeded with 0, lr 0.05,
//                   patience 20, terminate 60, k-means initialisation
//   missing-rate    standard datasets × {10, 30, 50}% missing × {L2, logsig-3}
//   noise           5 repeats × standard datasets × {3, 9, 30} noise
//                   channels × pseudometric on/off, plus old-style
//   length          5 repeats × standard datasets × learnt lengths on/off

use anyhow::Result;
use clap::ValueEnum;

use crate::application::run_use_case::{ExperimentConfig, RunUseCase};
use crate::domain::{
    catalog::{DATASETS_BY_COST, STANDARD_DATASET_NAMES},
    traits::{ResultSink, SeriesSource},
};
use crate::ml::{
    discrepancy::{DiscrepancyKind, MetricType},
    init::Initialisation,
};

const COMPARISON_DATASETS: usize = 11;
const REPEATS:             usize = 5;

const LOGSIG_3: DiscrepancyKind = DiscrepancyKind::Logsig { depth: 3 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Suite {
    Comparison,
    ComparisonNew,
    MissingRate,
    Noise,
    Length,
}

impl Suite {
    pub fn folder(&self) -> &'static str {
        match self {
            Suite::Comparison => "uea_comparison",
            Suite::ComparisonNew => "uea_comparison_new",
            Suite::MissingRate => "uea_missingness",
            Suite::Noise => "uea_noise",
            Suite::Length => "uea_length",
        }
    }
}

/// One planned run: its configuration and how many results count as done.
#[derive(Debug, Clone)]
pub struct PlannedRun {
    pub config: ExperimentConfig,
    /// None means the run always executes
    pub n_done: Option<usize>,
}

pub struct SuiteRunner {
    suite: Suite,
    base:  ExperimentConfig,
}

impl SuiteRunner {
    /// `base` supplies directories, epochs and anything the suite does not set.
    pub fn new(suite: Suite, base: ExperimentConfig) -> Self {
        Self { suite, base }
    }

    pub fn base(&self) -> &ExperimentConfig {
        &self.base
    }

    /// Every configuration of the suite, in execution order.
    pub fn plan(&self) -> Vec<PlannedRun> {
        let folder = self.suite.folder();
        let run = |dataset: &str, subfolder: String, n_done: Option<usize>, tweak: &dyn Fn(&mut ExperimentConfig)| {
            let mut config = ExperimentConfig {
                dataset_name:     dataset.to_string(),
                result_folder:    Some(folder.to_string()),
                result_subfolder: subfolder,
                ..self.base.clone()
            };
            tweak(&mut config);
            PlannedRun { config, n_done }
        };
        let diagonal = |c: &mut ExperimentConfig| c.metric_type = MetricType::Diagonal;

        let mut plan = Vec::new();
        match self.suite {
            Suite::Comparison => {
                for &dataset in &DATASETS_BY_COST[..COMPARISON_DATASETS] {
                    plan.push(run(dataset, "L2-diagonal".into(), Some(1), &|c| {
                        diagonal(c);
                        c.discrepancy_fn = DiscrepancyKind::L2;
                    }));
                    plan.push(run(dataset, "logsig-3diagonal".into(), Some(1), &|c| {
                        diagonal(c);
                        c.discrepancy_fn = LOGSIG_3;
                    }));
                    plan.push(run(dataset, "old".into(), Some(1), &|c| c.old_shapelets = true));
                }
            }
            Suite::ComparisonNew => {
                let new_style = |c: &mut ExperimentConfig| {
                    c.seed              = Some(0);
                    c.lr                = 0.05;
                    c.plateau_patience  = 20;
                    c.plateau_terminate = 60;
                    c.initialisation    = Initialisation::Kmeans;
                };
                for &dataset in &DATASETS_BY_COST[..COMPARISON_DATASETS] {
                    plan.push(run(dataset, "L2".into(), Some(1), &|c| {
                        new_style(c);
                        c.discrepancy_fn = DiscrepancyKind::L2;
                    }));
                    plan.push(run(dataset, "L2-diagonal".into(), Some(1), &|c| {
                        new_style(c);
                        diagonal(c);
                        c.discrepancy_fn = DiscrepancyKind::L2;
                    }));
                    plan.push(run(dataset, "logsig-3diagonal".into(), Some(1), &|c| {
                        new_style(c);
                        diagonal(c);
                        c.discrepancy_fn = LOGSIG_3;
                    }));
                    plan.push(run(dataset, "old".into(), Some(1), &|c| {
                        new_style(c);
                        c.old_shapelets = true;
                    }));
                }
            }
            Suite::MissingRate => {
                for &dataset in STANDARD_DATASET_NAMES {
                    for rate in [0.1, 0.3, 0.5] {
                        for kind in [DiscrepancyKind::L2, LOGSIG_3] {
                            plan.push(run(dataset, format!("{kind}-diagonal"), None, &|c| {
                                diagonal(c);
                                c.discrepancy_fn = kind;
                                c.missing_rate   = rate;
                                c.dataset_detail = ((rate * 100.0) as usize).to_string();
                            }));
                        }
                    }
                }
            }
            Suite::Noise => {
                for _ in 0..REPEATS {
                    for &dataset in STANDARD_DATASET_NAMES {
                        for noise in [3, 9, 30] {
                            let noisy = |c: &mut ExperimentConfig| {
                                c.noise_channels = noise;
                                c.dataset_detail = noise.to_string();
                                c.discrepancy_fn = DiscrepancyKind::L2;
                            };
                            for pseudometric in [true, false] {
                                plan.push(run(dataset, format!("L2-diagonal-{}", capitalised_bool(pseudometric)), Some(REPEATS), &|c| {
                                    noisy(c);
                                    diagonal(c);
                                    c.ablation_pseudometric = pseudometric;
                                }));
                            }
                            plan.push(run(dataset, "old".into(), Some(REPEATS), &|c| {
                                noisy(c);
                                c.old_shapelets = true;
                            }));
                        }
                    }
                }
            }
            Suite::Length => {
                for _ in 0..REPEATS {
                    for &dataset in STANDARD_DATASET_NAMES {
                        for learnt in [true, false] {
                            plan.push(run(dataset, format!("L2-diagonal-{}", capitalised_bool(learnt)), Some(REPEATS), &|c| {
                                diagonal(c);
                                c.discrepancy_fn         = DiscrepancyKind::L2;
                                c.ablation_learntlengths = learnt;
                            }));
                        }
                    }
                }
            }
        }
        plan
    }

    /// Execute the suite, skipping configurations that are already done.
    /// Returns the number of runs actually executed.
    pub fn execute(&self, source: &dyn SeriesSource, sink: &dyn ResultSink) -> Result<usize> {
        let mut executed = 0;
        for planned in self.plan() {
            let cfg       = &planned.config;
            let subfolder = cfg.subfolder();
            let folder    = cfg.result_folder.as_deref().unwrap_or_default();

            if let Some(n_done) = planned.n_done {
                if sink.is_done(folder, &subfolder, n_done)? {
                    tracing::debug!("Skipping {subfolder}: already done");
                    continue;
                }
            }

            println!("Starting comparison: {}{} {}", cfg.dataset_name, cfg.dataset_detail, cfg.result_subfolder);
            RunUseCase::new(planned.config.clone()).run(source, sink)?;
            executed += 1;
        }
        Ok(executed)
    }
}

/// Result subfolders keep the capitalised booleans of the existing result archive.
fn capitalised_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}
