// ============================================================
// Layer 2 — RunUseCase
// ============================================================
// Runs one experiment end to end:
//
//   Step 1: Load TRAIN and TEST cases          (Layer 4 - data)
//   Step 2: Pad, fill gaps, add noise/missing  (Layer 4 - data)
//   Step 3: Encode labels, split, normalise    (Layer 4 - data)
//   Step 4: Resolve shapelet options           (this file)
//   Step 5: Build model, initialise shapelets  (Layer 5 - ml)
//   Step 6: Train, keep best model             (Layer 5 - ml)
//   Step 7: Evaluate train / val / test        (Layer 5 - ml)
//   Step 8: Save checkpoint and result record  (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use burn::{module::AutodiffModule, prelude::*};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::data::{
    dataset::SeriesDataset,
    loader::TsFileLoader,
    preprocessor::{encode_labels, normalise, Preprocessor},
    sampling::sample_batch,
    splitter::{stratified_split, SPLIT_SEED},
};
use crate::domain::{
    record::RunRecord,
    series::{SeriesArray, TimeGrid},
    traits::{ResultSink, SeriesSource, Split},
};
use crate::infra::{checkpoint::CheckpointManager, results::ResultStore};
use crate::ml::{
    discrepancy::{DiscrepancyKind, MetricType},
    init::{initial_shapelets, Initialisation},
    model::LinearShapeletConfig,
    trainer::{eval_loader, evaluate_metrics, train, TrainSettings},
    EvalBackend, TrainBackend,
};

const TRAIN_FRACTION:    f64 = 0.8;
const OLD_MAX_PROPORTION: f64 = 0.3;

// ─── Length Proportion ───────────────────────────────────────────────────────
/// Maximum shapelet length as a fraction of the series' time span.
/// `Auto` picks `min(sqrt(10 / span), 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LengthProportion {
    Auto,
    Fixed(f64),
}

impl LengthProportion {
    pub fn resolve(&self, timespan: f64) -> f64 {
        match self {
            Self::Auto => (10.0 / timespan).sqrt().min(1.0),
            Self::Fixed(p) => *p,
        }
    }
}

impl FromStr for LengthProportion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            return Ok(Self::Auto);
        }
        let p: f64 = s.parse().map_err(|e| format!("bad length proportion '{s}': {e}"))?;
        if !(p > 0.0 && p <= 1.0) {
            return Err(format!("length proportion must be in (0, 1], got {p}"));
        }
        Ok(Self::Fixed(p))
    }
}

impl fmt::Display for LengthProportion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Fixed(p) => write!(f, "{p}"),
        }
    }
}

impl TryFrom<String> for LengthProportion {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LengthProportion> for String {
    fn from(p: LengthProportion) -> Self {
        p.to_string()
    }
}

// ─── Experiment Configuration ────────────────────────────────────────────────
// Every knob of one run. Serialisable so it can be stored next to a
// checkpoint and reloaded by `evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub dataset_name:     String,
    pub data_dir:         String,
    pub results_dir:      String,
    /// Results are only saved when a folder is given
    pub result_folder:    Option<String>,
    pub result_subfolder: String,
    /// Appended to the dataset name in the result subfolder
    pub dataset_detail:   String,
    pub checkpoint_dir:   Option<String>,

    pub missing_rate:   f64,
    pub noise_channels: usize,

    pub epochs:                         usize,
    pub num_shapelets_per_class:        usize,
    pub num_shapelet_samples:           Option<usize>,
    pub discrepancy_fn:                 DiscrepancyKind,
    pub max_shapelet_length_proportion: LengthProportion,
    pub lengths_per_shapelet:           usize,
    pub num_continuous_samples:         Option<usize>,
    pub metric_type:                    MetricType,
    pub ablation_pseudometric:          bool,
    pub ablation_learntlengths:         bool,
    pub ablation_similarreg:            bool,
    pub old_shapelets:                  bool,
    pub lr:                             f64,
    pub plateau_patience:               usize,
    pub plateau_terminate:              usize,
    pub initialisation:                 Initialisation,
    pub batch_size:                     usize,
    /// Fixes every random generator when set
    pub seed:                           Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            dataset_name:     "BasicMotions".to_string(),
            data_dir:         "data/UEA/Multivariate_ts".to_string(),
            results_dir:      "results".to_string(),
            result_folder:    None,
            result_subfolder: String::new(),
            dataset_detail:   String::new(),
            checkpoint_dir:   None,

            missing_rate:   0.0,
            noise_channels: 0,

            epochs:                         1000,
            num_shapelets_per_class:        3,
            num_shapelet_samples:           None,
            discrepancy_fn:                 DiscrepancyKind::L2,
            max_shapelet_length_proportion: LengthProportion::Fixed(1.0),
            lengths_per_shapelet:           1,
            num_continuous_samples:         None,
            metric_type:                    MetricType::General,
            ablation_pseudometric:          true,
            ablation_learntlengths:         true,
            ablation_similarreg:            true,
            old_shapelets:                  false,
            lr:                             0.005,
            plateau_patience:               10,
            plateau_terminate:              250,
            initialisation:                 Initialisation::Old,
            batch_size:                     2048,
            seed:                           None,
        }
    }
}

impl ExperimentConfig {
    /// `<dataset><detail>-<subfolder>`, e.g. `BasicMotions30-L2-diagonal`
    pub fn subfolder(&self) -> String {
        format!("{}{}-{}", self.dataset_name, self.dataset_detail, self.result_subfolder)
    }

    /// Reject settings that would leave the shapelet transform or the loaders empty.
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("num_shapelets_per_class", Some(self.num_shapelets_per_class)),
            ("lengths_per_shapelet", Some(self.lengths_per_shapelet)),
            ("num_continuous_samples", self.num_continuous_samples),
            ("batch_size", Some(self.batch_size)),
        ];
        for (name, value) in counts {
            if value == Some(0) {
                bail!("{name} must be at least 1");
            }
        }
        if !(0.0..1.0).contains(&self.missing_rate) {
            bail!("missing_rate must be in [0, 1), got {}", self.missing_rate);
        }
        Ok(())
    }
}

// ─── Resolved Options ─────────────────────────────────────────────────────────
/// Shapelet options after applying old-style overrides and data-dependent defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub discrepancy:            DiscrepancyKind,
    pub proportion:             f64,
    pub max_shapelet_length:    f32,
    pub num_shapelet_samples:   usize,
    pub num_continuous_samples: usize,
    pub metric:                 Option<MetricType>,
    pub learn_lengths:          bool,
    pub similarity_reg:         bool,
    pub log:                    bool,
    pub lengths_at_max:         bool,
}

impl ResolvedOptions {
    pub fn resolve(cfg: &ExperimentConfig, grid: &TimeGrid) -> Self {
        let old = cfg.old_shapelets;

        let discrepancy = if old { DiscrepancyKind::PiecewiseConstantL2Squared } else { cfg.discrepancy_fn };
        let proportion  = if old {
            OLD_MAX_PROPORTION
        } else {
            cfg.max_shapelet_length_proportion.resolve(grid.span() as f64)
        };

        let timespan             = grid.span() as f64;
        let max_shapelet_length  = (timespan * proportion) as f32;
        let num_shapelet_samples = cfg
            .num_shapelet_samples
            .unwrap_or((proportion * grid.len as f64) as usize)
            .max(2);
        let num_continuous_samples = if old {
            grid.len
        } else {
            cfg.num_continuous_samples.unwrap_or(grid.len)
        };

        Self {
            discrepancy,
            proportion,
            max_shapelet_length,
            num_shapelet_samples,
            num_continuous_samples,
            metric:         (!old && cfg.ablation_pseudometric).then_some(cfg.metric_type),
            learn_lengths:  !old && cfg.ablation_learntlengths,
            similarity_reg: !old && cfg.ablation_similarreg,
            log:            !old,
            lengths_at_max: old,
        }
    }
}

// ─── Prepared Data ────────────────────────────────────────────────────────────
pub struct PreparedData {
    pub grid:           TimeGrid,
    pub train:          SeriesDataset,
    pub val:            SeriesDataset,
    pub test:           SeriesDataset,
    pub num_classes:    usize,
    pub input_channels: usize,
}

/// Load, clean, split and normalise one dataset the way every run sees it.
pub fn prepare_data(source: &dyn SeriesSource, cfg: &ExperimentConfig) -> Result<PreparedData> {
    let train_raw = source.load_split(&cfg.dataset_name, Split::Train)?;
    let test_raw  = source.load_split(&cfg.dataset_name, Split::Test)?;
    let amount_train = train_raw.len();
    tracing::info!(
        "Loaded {}: {} train, {} test cases",
        cfg.dataset_name,
        train_raw.len(),
        test_raw.len()
    );

    let all_raw: Vec<_> = train_raw.into_iter().chain(test_raw).collect();
    let (array, grid)   = Preprocessor::new(cfg.missing_rate, cfg.noise_channels).prepare(&all_raw)?;
    if grid.len < 2 {
        bail!("Series of {} must have at least two observations", cfg.dataset_name);
    }

    let raw_labels: Vec<String> = all_raw.iter().map(|r| r.label.clone()).collect();
    let (labels, classes)       = encode_labels(&raw_labels);
    if classes.len() < 2 {
        bail!("Have only {} classes.", classes.len());
    }

    let (trainval, test)   = array.split_at(amount_train);
    let trainval_labels    = &labels[..amount_train];
    let test_labels        = &labels[amount_train..];
    let indices: Vec<usize> = (0..amount_train).collect();
    let (train_idx, val_idx) = stratified_split(indices, trainval_labels, TRAIN_FRACTION, SPLIT_SEED);

    let train_x = trainval.select(&train_idx);
    let val_x   = trainval.select(&val_idx);
    let pick    = |idx: &[usize]| idx.iter().map(|&i| trainval_labels[i]).collect::<Vec<_>>();

    let dataset = |x: SeriesArray, y: &[usize]| SeriesDataset::from_array(&normalise(&x, &train_x), y);
    let val     = dataset(val_x, &pick(&val_idx));
    let test    = dataset(test, test_labels);
    let train   = dataset(train_x.clone(), &pick(&train_idx));

    tracing::info!(
        "Split: {} train, {} validation, {} test; {} classes, {} channels, length {}",
        train.sample_count(),
        val.sample_count(),
        test.sample_count(),
        classes.len(),
        array.channels,
        grid.len
    );

    Ok(PreparedData {
        grid,
        input_channels: array.channels,
        num_classes: classes.len(),
        train,
        val,
        test,
    })
}

// ─── RunUseCase ───────────────────────────────────────────────────────────────
pub struct RunUseCase {
    config: ExperimentConfig,
}

impl RunUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Run against the `.ts` archive and the on-disk result store.
    pub fn execute(&self) -> Result<RunRecord> {
        let source = TsFileLoader::new(&self.config.data_dir);
        let sink   = ResultStore::new(&self.config.results_dir);
        self.run(&source, &sink)
    }

    pub fn run(&self, source: &dyn SeriesSource, sink: &dyn ResultSink) -> Result<RunRecord> {
        let cfg    = &self.config;
        let device = <TrainBackend as Backend>::Device::default();
        cfg.validate()?;

        if let Some(seed) = cfg.seed {
            TrainBackend::seed(seed);
        }
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // ── Steps 1-3: data ───────────────────────────────────────────────────
        let data = prepare_data(source, cfg)?;

        // ── Step 4: options ───────────────────────────────────────────────────
        let options       = ResolvedOptions::resolve(cfg, &data.grid);
        let num_shapelets = cfg.num_shapelets_per_class * data.num_classes;
        let out_channels  = if data.num_classes == 2 { 1 } else { data.num_classes };
        tracing::debug!("Resolved options: {:?}", options);

        // ── Step 5: model ─────────────────────────────────────────────────────
        let model_cfg = LinearShapeletConfig {
            in_channels:            data.input_channels,
            out_channels,
            num_shapelets,
            num_shapelet_samples:   options.num_shapelet_samples,
            num_continuous_samples: options.num_continuous_samples,
            lengths_per_shapelet:   cfg.lengths_per_shapelet,
            max_shapelet_length:    options.max_shapelet_length,
            grid:                   data.grid,
            discrepancy:            options.discrepancy,
            metric:                 options.metric,
            learn_lengths:          options.learn_lengths,
            lengths_at_max:         options.lengths_at_max,
            log:                    options.log,
        };
        let mut model = model_cfg.init::<TrainBackend>(&device);

        let samples   = sample_batch(&data.train, cfg.num_shapelets_per_class, num_shapelets, &mut rng)?;
        let shapelets = initial_shapelets(
            cfg.initialisation,
            &samples,
            &model_cfg.transform_settings(),
            data.input_channels,
            &mut rng,
        )?;
        let shapelets = Tensor::<TrainBackend, 1>::from_floats(shapelets.as_slice(), &device)
            .reshape([num_shapelets, options.num_shapelet_samples, data.input_channels]);
        model.transform.set_shapelets(shapelets);
        tracing::info!(
            "Model ready: {} shapelets × {} lengths, {} parameters",
            num_shapelets,
            cfg.lengths_per_shapelet,
            model.num_params()
        );

        // ── Step 6: train ─────────────────────────────────────────────────────
        let settings = TrainSettings {
            epochs:                    cfg.epochs,
            lr:                        cfg.lr,
            plateau_patience:          cfg.plateau_patience,
            plateau_terminate:         cfg.plateau_terminate,
            similarity_regularisation: options.similarity_reg,
            batch_size:                cfg.batch_size,
            shuffle_seed:              cfg.seed.unwrap_or_else(|| rand::Rng::gen(&mut rng)),
        };
        let outcome = train(model, data.train.clone(), data.val.clone(), &settings, &device)?;

        // ── Step 7: evaluate ──────────────────────────────────────────────────
        let model = outcome.model.valid();
        let metrics = |dataset: &SeriesDataset| {
            evaluate_metrics(&model, &eval_loader::<EvalBackend>(dataset.clone(), cfg.batch_size, &device))
        };
        let (train_metrics, val_metrics, test_metrics) =
            (metrics(&data.train), metrics(&data.val), metrics(&data.test));
        tracing::info!(
            "Final accuracy: train {:.3}, val {:.3}, test {:.3}",
            train_metrics.accuracy,
            val_metrics.accuracy,
            test_metrics.accuracy
        );

        // ── Step 8: persist ───────────────────────────────────────────────────
        if let Some(dir) = &cfg.checkpoint_dir {
            let ckpt = CheckpointManager::new(dir)?;
            ckpt.save_model(&model)?;
            ckpt.save_configs(&model_cfg, cfg)?;
        }

        let record = RunRecord {
            dataset:        cfg.dataset_name.clone(),
            times:          data.grid.times(),
            num_classes:    data.num_classes,
            input_channels: data.input_channels,
            model:          model.describe(),
            parameters:     model.num_params(),
            history:        outcome.history,
            train_metrics,
            val_metrics,
            test_metrics,
            epochs:                         cfg.epochs,
            num_shapelets_per_class:        cfg.num_shapelets_per_class,
            num_shapelet_samples:           options.num_shapelet_samples,
            max_shapelet_length_proportion: options.proportion,
            lengths_per_shapelet:           cfg.lengths_per_shapelet,
            num_continuous_samples:         options.num_continuous_samples,
            discrepancy_fn:                 options.discrepancy.to_string(),
            metric_type:                    cfg.metric_type.to_string(),
            initialisation:                 cfg.initialisation.to_string(),
            lr:                             cfg.lr,
            plateau_patience:               cfg.plateau_patience,
            plateau_terminate:              cfg.plateau_terminate,
            missing_rate:                   cfg.missing_rate,
            noise_channels:                 cfg.noise_channels,
            ablation_pseudometric:          options.metric.is_some(),
            ablation_learntlengths:         options.learn_lengths,
            ablation_similarreg:            options.similarity_reg,
            old_shapelets:                  cfg.old_shapelets,
        };

        if let Some(folder) = &cfg.result_folder {
            sink.save(folder, &cfg.subfolder(), &record)?;
        }
        Ok(record)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::RawSeries;

    /// Two classes: a rising ramp and a falling ramp, two channels.
    pub(crate) struct ToySource;

    impl SeriesSource for ToySource {
        fn load_split(&self, _dataset: &str, split: Split) -> Result<Vec<RawSeries>> {
            let n = match split {
                Split::Train => 10,
                Split::Test => 4,
            };
            Ok((0..n)
                .map(|i| {
                    let up = i % 2 == 0;
                    let ramp: Vec<f32> = (0..8)
                        .map(|t| if up { t as f32 } else { 7.0 - t as f32 } + 0.1 * i as f32)
                        .collect();
                    let flat = vec![0.5 * i as f32; 8];
                    RawSeries::new(vec![ramp, flat], if up { "up" } else { "down" })
                })
                .collect())
        }
    }

    fn grid(len: usize) -> TimeGrid {
        TimeGrid::unit(len)
    }

    #[test]
    fn test_length_proportion_parsing() {
        assert_eq!("auto".parse::<LengthProportion>().unwrap(), LengthProportion::Auto);
        assert_eq!("0.5".parse::<LengthProportion>().unwrap(), LengthProportion::Fixed(0.5));
        assert!("0".parse::<LengthProportion>().is_err());
        assert!("1.5".parse::<LengthProportion>().is_err());
        assert!((LengthProportion::Auto.resolve(40.0) - 0.5).abs() < 1e-12);
        assert_eq!(LengthProportion::Auto.resolve(5.0), 1.0);
    }

    #[test]
    fn test_resolve_defaults() {
        let cfg  = ExperimentConfig::default();
        let opts = ResolvedOptions::resolve(&cfg, &grid(101));
        assert_eq!(opts.discrepancy, DiscrepancyKind::L2);
        assert_eq!(opts.max_shapelet_length, 100.0);
        assert_eq!(opts.num_shapelet_samples, 101);
        assert_eq!(opts.num_continuous_samples, 101);
        assert_eq!(opts.metric, Some(MetricType::General));
        assert!(opts.learn_lengths && opts.similarity_reg && opts.log);
        assert!(!opts.lengths_at_max);
    }

    #[test]
    fn test_resolve_old_shapelets_overrides() {
        let cfg = ExperimentConfig {
            old_shapelets:          true,
            discrepancy_fn:         DiscrepancyKind::Logsig { depth: 3 },
            num_continuous_samples: Some(7),
            ..Default::default()
        };
        let opts = ResolvedOptions::resolve(&cfg, &grid(101));
        assert_eq!(opts.discrepancy, DiscrepancyKind::PiecewiseConstantL2Squared);
        assert!((opts.proportion - 0.3).abs() < 1e-12);
        assert_eq!(opts.num_shapelet_samples, 30);
        assert_eq!(opts.num_continuous_samples, 101);
        assert_eq!(opts.metric, None);
        assert!(!opts.learn_lengths && !opts.similarity_reg && !opts.log);
        assert!(opts.lengths_at_max);
    }

    #[test]
    fn test_resolve_keeps_at_least_two_samples() {
        let cfg = ExperimentConfig {
            max_shapelet_length_proportion: LengthProportion::Fixed(0.1),
            ..Default::default()
        };
        assert_eq!(ResolvedOptions::resolve(&cfg, &grid(5)).num_shapelet_samples, 2);
    }

    #[test]
    fn test_subfolder_name() {
        let cfg = ExperimentConfig {
            dataset_name:     "JapaneseVowels".into(),
            dataset_detail:   "30".into(),
            result_subfolder: "L2-diagonal".into(),
            ..Default::default()
        };
        assert_eq!(cfg.subfolder(), "JapaneseVowels30-L2-diagonal");
    }

    #[test]
    fn test_config_json_round_trip() {
        let cfg  = ExperimentConfig { max_shapelet_length_proportion: LengthProportion::Auto, ..Default::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"auto\""));
        let back: ExperimentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_shapelet_length_proportion, LengthProportion::Auto);
        assert_eq!(back.discrepancy_fn, DiscrepancyKind::L2);
    }

    #[test]
    fn test_prepare_data_splits_and_normalises() {
        let data = prepare_data(&ToySource, &ExperimentConfig::default()).unwrap();
        assert_eq!(data.num_classes, 2);
        assert_eq!(data.input_channels, 2);
        assert_eq!(data.train.sample_count() + data.val.sample_count(), 10);
        assert_eq!(data.val.sample_count(), 2);
        assert_eq!(data.test.sample_count(), 4);

        // Normalised train channels have (close to) zero mean
        let n    = data.train.sample_count() * 8;
        let mean = data.train.samples().iter().flat_map(|s| s.values.iter().step_by(2)).sum::<f32>() / n as f32;
        assert!(mean.abs() < 1e-4);
    }

    #[test]
    fn test_end_to_end_run_saves_record() {
        let tmp  = tempfile::tempdir().unwrap();
        let sink = ResultStore::new(tmp.path());
        let cfg  = ExperimentConfig {
            dataset_name:            "Toy".into(),
            result_folder:           Some("toy".into()),
            result_subfolder:        "L2".into(),
            epochs:                  3,
            num_shapelets_per_class: 2,
            seed:                    Some(0),
            ..Default::default()
        };

        let record = RunUseCase::new(cfg).run(&ToySource, &sink).unwrap();
        assert_eq!(record.num_classes, 2);
        assert_eq!(record.times.len(), 8);
        assert!(record.model.contains("LinearShapeletModel"));
        assert!(!record.history.is_empty());
        assert!((0.0..=1.0).contains(&record.test_metrics.accuracy));
        assert_eq!(sink.count("toy", "Toy-L2").unwrap(), 1);
    }

    #[test]
    fn test_zero_counts_are_rejected() {
        let zero_shapelets = ExperimentConfig { num_shapelets_per_class: 0, ..Default::default() };
        let err = RunUseCase::new(zero_shapelets)
            .run(&ToySource, &ResultStore::new(tempfile::tempdir().unwrap().path()))
            .unwrap_err();
        assert!(err.to_string().contains("num_shapelets_per_class"));

        let zero_lengths = ExperimentConfig { lengths_per_shapelet: 0, ..Default::default() };
        assert!(zero_lengths.validate().is_err());
        let zero_starts = ExperimentConfig { num_continuous_samples: Some(0), ..Default::default() };
        assert!(zero_starts.validate().is_err());
        let zero_batch = ExperimentConfig { batch_size: 0, ..Default::default() };
        assert!(zero_batch.validate().is_err());
        assert!(ExperimentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_old_shapelets_run_keeps_lengths_at_max() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = ExperimentConfig {
            dataset_name:            "Toy".into(),
            checkpoint_dir:          Some(tmp.path().join("ckpt").display().to_string()),
            old_shapelets:           true,
            lengths_per_shapelet:    2,
            epochs:                  12,
            lr:                      0.5,
            num_shapelets_per_class: 2,
            seed:                    Some(3),
            ..Default::default()
        };
        let record = RunUseCase::new(cfg)
            .run(&ToySource, &ResultStore::new(tmp.path().join("results")))
            .unwrap();
        assert_eq!(record.discrepancy_fn, "piecewise_constant_L2_squared");
        assert!(!record.ablation_learntlengths);

        // Span of an 8-point unit grid is 7, so every length sits at 0.3 · 7
        let model = CheckpointManager::open(tmp.path().join("ckpt"))
            .unwrap()
            .load_model::<EvalBackend>(&Default::default())
            .unwrap();
        let lengths = model.transform.length_values();
        assert_eq!(lengths.len(), 2 * 2 * 2);
        for length in lengths {
            assert!((length - 2.1).abs() < 1e-5, "{length}");
        }
    }

    #[test]
    fn test_single_class_is_rejected() {
        struct OneClass;
        impl SeriesSource for OneClass {
            fn load_split(&self, _: &str, _: Split) -> Result<Vec<RawSeries>> {
                Ok(vec![RawSeries::new(vec![vec![0.0, 1.0, 2.0]], "only"); 4])
            }
        }
        let err = prepare_data(&OneClass, &ExperimentConfig::default()).err().unwrap();
        assert!(err.to_string().contains("only 1 classes"));
    }
}
