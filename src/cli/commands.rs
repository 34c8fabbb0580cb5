// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `run`, `suite` and `evaluate`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion via FromStr (L2, logsig-3, auto, 0.5, ...)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{builder::RangedU64ValueParser, Args, Subcommand};

use crate::application::{
    run_use_case::{ExperimentConfig, LengthProportion},
    suites::Suite,
};
use crate::ml::{
    discrepancy::{DiscrepancyKind, MetricType},
    init::Initialisation,
};

/// Counts that size tensors or loaders must be positive.
fn at_least_one() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(1..)
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train and evaluate one configuration on one dataset
    Run(RunArgs),

    /// Run a whole ablation suite, skipping finished configurations
    Suite(SuiteArgs),

    /// Re-evaluate a saved checkpoint
    Evaluate(EvaluateArgs),
}

/// Where data comes from and results go. Shared by `run` and `suite`.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Root of the UEA multivariate archive (one folder per dataset)
    #[arg(long, default_value = "data/UEA/Multivariate_ts")]
    pub data_dir: String,

    /// Root directory for JSON result records
    #[arg(long, default_value = "results")]
    pub results_dir: String,

    /// Save the best model and its configs here
    #[arg(long)]
    pub checkpoint_dir: Option<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// UEA dataset name, e.g. BasicMotions
    pub dataset: String,

    #[command(flatten)]
    pub paths: PathArgs,

    /// Result folder; results are not saved when omitted
    #[arg(long)]
    pub result_folder: Option<String>,

    #[arg(long, default_value = "")]
    pub result_subfolder: String,

    /// Extra text after the dataset name in the result subfolder
    #[arg(long, default_value = "")]
    pub dataset_detail: String,

    /// Fraction of points per channel dropped and re-interpolated
    #[arg(long, default_value_t = 0.0)]
    pub missing_rate: f64,

    /// Number of pure-noise channels appended to every series
    #[arg(long, default_value_t = 0)]
    pub noise_channels: usize,

    #[arg(long, default_value_t = 1000)]
    pub epochs: usize,

    #[arg(long, default_value_t = 3, value_parser = at_least_one())]
    pub num_shapelets_per_class: usize,

    /// Defaults to proportion × series length
    #[arg(long)]
    pub num_shapelet_samples: Option<usize>,

    /// L2, L2_squared, piecewise_constant_L2_squared, DTW or logsig-<depth>
    #[arg(long, default_value = "L2")]
    pub discrepancy_fn: DiscrepancyKind,

    /// Maximum shapelet length as a fraction of the time span, or `auto`
    #[arg(long, default_value = "1.0")]
    pub max_shapelet_length_proportion: LengthProportion,

    #[arg(long, default_value_t = 1, value_parser = at_least_one())]
    pub lengths_per_shapelet: usize,

    /// Defaults to the series length
    #[arg(long, value_parser = at_least_one())]
    pub num_continuous_samples: Option<usize>,

    /// general or diagonal
    #[arg(long, default_value = "general")]
    pub metric_type: MetricType,

    /// Disable the learnt pseudometric
    #[arg(long)]
    pub no_pseudometric: bool,

    /// Keep shapelet lengths fixed
    #[arg(long)]
    pub no_learnt_lengths: bool,

    /// Disable the similarity regulariser
    #[arg(long)]
    pub no_similarity_reg: bool,

    /// Classic shapelets: piecewise-constant L2², fixed lengths, no extras
    #[arg(long)]
    pub old_shapelets: bool,

    #[arg(long, default_value_t = 0.005)]
    pub lr: f64,

    #[arg(long, default_value_t = 10)]
    pub plateau_patience: usize,

    /// Stop after this many epochs without train-loss improvement
    #[arg(long, default_value_t = 250)]
    pub plateau_terminate: usize,

    /// old or kmeans
    #[arg(long, default_value = "old")]
    pub initialisation: Initialisation,

    #[arg(long, default_value_t = 2048, value_parser = at_least_one())]
    pub batch_size: usize,

    /// Seed every random generator
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Convert CLI RunArgs into the application-layer ExperimentConfig.
/// The application layer never sees clap types.
impl From<RunArgs> for ExperimentConfig {
    fn from(a: RunArgs) -> Self {
        ExperimentConfig {
            dataset_name:     a.dataset,
            data_dir:         a.paths.data_dir,
            results_dir:      a.paths.results_dir,
            result_folder:    a.result_folder,
            result_subfolder: a.result_subfolder,
            dataset_detail:   a.dataset_detail,
            checkpoint_dir:   a.paths.checkpoint_dir,

            missing_rate:   a.missing_rate,
            noise_channels: a.noise_channels,

            epochs:                         a.epochs,
            num_shapelets_per_class:        a.num_shapelets_per_class,
            num_shapelet_samples:           a.num_shapelet_samples,
            discrepancy_fn:                 a.discrepancy_fn,
            max_shapelet_length_proportion: a.max_shapelet_length_proportion,
            lengths_per_shapelet:           a.lengths_per_shapelet,
            num_continuous_samples:         a.num_continuous_samples,
            metric_type:                    a.metric_type,
            ablation_pseudometric:          !a.no_pseudometric,
            ablation_learntlengths:         !a.no_learnt_lengths,
            ablation_similarreg:            !a.no_similarity_reg,
            old_shapelets:                  a.old_shapelets,
            lr:                             a.lr,
            plateau_patience:               a.plateau_patience,
            plateau_terminate:              a.plateau_terminate,
            initialisation:                 a.initialisation,
            batch_size:                     a.batch_size,
            seed:                           a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct SuiteArgs {
    #[arg(value_enum)]
    pub suite: Suite,

    #[command(flatten)]
    pub paths: PathArgs,

    #[arg(long, default_value_t = 1000)]
    pub epochs: usize,

    #[arg(long, default_value_t = 2048, value_parser = at_least_one())]
    pub batch_size: usize,
}

impl From<SuiteArgs> for ExperimentConfig {
    fn from(a: SuiteArgs) -> Self {
        ExperimentConfig {
            data_dir:       a.paths.data_dir,
            results_dir:    a.paths.results_dir,
            checkpoint_dir: a.paths.checkpoint_dir,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory written by `run --checkpoint-dir`
    pub checkpoint_dir: String,

    /// Override the data directory recorded with the run
    #[arg(long)]
    pub data_dir: Option<String>,
}
