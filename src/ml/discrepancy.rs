// ============================================================
// Layer 5 — Discrepancy Functions
// ============================================================
// A discrepancy measures how far a window of a series is from a
// shapelet. The shapelet transform takes the minimum over windows,
// so a small value means "this shapelet occurs in this series".
//
// Supported kinds (parsed from the names the experiments use):
//
//   L2                             sqrt(∫ |A(w(t) - s(t))|² dt)
//   L2_squared                     ∫ |A(w(t) - s(t))|² dt
//   piecewise_constant_L2_squared  Σ_samples Σ_channels (w - s)²
//   DTW                            dynamic time warping, Euclidean cost
//   logsig-<depth>                 |A(logsig(w) - logsig(s))|
//
// A is the optional learnt pseudometric: a full linear map
// ("general", identity init) or a per-feature scale ("diagonal",
// ones init). Integrals use the trapezoidal rule over the shapelet's
// samples, spaced length / (samples - 1) apart.

use burn::{
    module::{Ignored, Param},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::ml::signature::{logsignature, logsignature_dim};

/// Keeps sqrt differentiable at zero distance.
const SQRT_EPS: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DiscrepancyKind {
    L2,
    L2Squared,
    PiecewiseConstantL2Squared,
    Dtw,
    Logsig { depth: usize },
}

impl DiscrepancyKind {
    /// Whether a learnt pseudometric applies to this kind at all
    pub fn supports_pseudometric(&self) -> bool {
        !matches!(self, Self::PiecewiseConstantL2Squared | Self::Dtw)
    }

    /// Size of the feature vector the pseudometric acts on
    pub fn feature_dim(&self, channels: usize) -> usize {
        match self {
            Self::Logsig { depth } => logsignature_dim(channels, *depth),
            _ => channels,
        }
    }
}

impl FromStr for DiscrepancyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L2" => Ok(Self::L2),
            "L2_squared" => Ok(Self::L2Squared),
            "piecewise_constant_L2_squared" => Ok(Self::PiecewiseConstantL2Squared),
            "DTW" => Ok(Self::Dtw),
            other => {
                // expects e.g. 'logsig-4'
                let depth = other
                    .strip_prefix("logsig-")
                    .ok_or_else(|| format!("unknown discrepancy function '{other}'"))?
                    .parse::<usize>()
                    .map_err(|e| format!("bad logsig depth in '{other}': {e}"))?;
                if depth == 0 {
                    return Err("logsig depth must be at least 1".to_string());
                }
                Ok(Self::Logsig { depth })
            }
        }
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L2 => write!(f, "L2"),
            Self::L2Squared => write!(f, "L2_squared"),
            Self::PiecewiseConstantL2Squared => write!(f, "piecewise_constant_L2_squared"),
            Self::Dtw => write!(f, "DTW"),
            Self::Logsig { depth } => write!(f, "logsig-{depth}"),
        }
    }
}

impl TryFrom<String> for DiscrepancyKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DiscrepancyKind> for String {
    fn from(kind: DiscrepancyKind) -> Self {
        kind.to_string()
    }
}

/// Shape of the learnt pseudometric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    General,
    Diagonal,
}

impl FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Self::General),
            "diagonal" => Ok(Self::Diagonal),
            other => Err(format!("unknown metric type '{other}' (expected general or diagonal)")),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::Diagonal => write!(f, "diagonal"),
        }
    }
}

#[derive(Module, Debug)]
pub struct Discrepancy<B: Backend> {
    /// Full linear map, [features, features]
    pub general:  Option<Param<Tensor<B, 2>>>,
    /// Per-feature scale, [features]
    pub diagonal: Option<Param<Tensor<B, 1>>>,
    pub kind:     Ignored<DiscrepancyKind>,
}

impl<B: Backend> Discrepancy<B> {
    /// `metric` is None when the pseudometric ablation is off.
    pub fn new(
        kind:     DiscrepancyKind,
        metric:   Option<MetricType>,
        channels: usize,
        device:   &B::Device,
    ) -> Self {
        let features = kind.feature_dim(channels);
        let metric   = metric.filter(|_| kind.supports_pseudometric());

        let general = (metric == Some(MetricType::General))
            .then(|| Param::from_tensor(Tensor::eye(features, device)));
        let diagonal = (metric == Some(MetricType::Diagonal))
            .then(|| Param::from_tensor(Tensor::ones([features], device)));

        Self { general, diagonal, kind: Ignored(kind) }
    }

    pub fn kind(&self) -> DiscrepancyKind {
        self.kind.0
    }

    /// Apply the pseudometric to the last axis of `[N, F]` features.
    fn apply_metric(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        if let Some(general) = &self.general {
            return x.matmul(general.val());
        }
        if let Some(diagonal) = &self.diagonal {
            let [f] = diagonal.dims();
            return x * diagonal.val().reshape([1, f]);
        }
        x
    }

    /// Discrepancy between every window and one shapelet.
    ///
    /// * `windows`:  [batch, windows, samples, channels]
    /// * `shapelet`: [samples, channels]
    /// * `length`:   [1], the shapelet's length in time units
    ///
    /// Returns [batch, windows].
    pub fn forward(
        &self,
        windows:  Tensor<B, 4>,
        shapelet: Tensor<B, 2>,
        length:   Tensor<B, 1>,
    ) -> Tensor<B, 2> {
        match self.kind() {
            DiscrepancyKind::L2 => {
                (self.integrated_square(windows, shapelet, length) + SQRT_EPS).sqrt()
            }
            DiscrepancyKind::L2Squared => self.integrated_square(windows, shapelet, length),
            DiscrepancyKind::PiecewiseConstantL2Squared => {
                let [b, w, m, c] = windows.dims();
                (windows - shapelet.reshape([1, 1, m, c]))
                    .powf_scalar(2.0)
                    .reshape([b, w, m * c])
                    .sum_dim(2)
                    .reshape([b, w])
            }
            DiscrepancyKind::Dtw => dtw(windows, shapelet),
            DiscrepancyKind::Logsig { depth } => self.logsig(windows, shapelet, depth),
        }
    }

    /// `∫ |A(w(t) - s(t))|² dt` by the trapezoidal rule.
    fn integrated_square(
        &self,
        windows:  Tensor<B, 4>,
        shapelet: Tensor<B, 2>,
        length:   Tensor<B, 1>,
    ) -> Tensor<B, 2> {
        let [b, w, m, c] = windows.dims();
        let diff    = (windows - shapelet.reshape([1, 1, m, c])).reshape([b * w * m, c]);
        let squared = self
            .apply_metric(diff)
            .powf_scalar(2.0)
            .sum_dim(1)
            .reshape([b, w, m]);

        if m == 1 {
            return squared.reshape([b, w]) * length.reshape([1, 1]);
        }

        let total = squared.clone().sum_dim(2).reshape([b, w]);
        let ends  = squared.clone().slice([0..b, 0..w, 0..1]).reshape([b, w])
            + squared.slice([0..b, 0..w, m - 1..m]).reshape([b, w]);
        let dt = length.reshape([1, 1]).div_scalar((m - 1) as f32);
        (total - ends.mul_scalar(0.5)) * dt
    }

    fn logsig(&self, windows: Tensor<B, 4>, shapelet: Tensor<B, 2>, depth: usize) -> Tensor<B, 2> {
        let [b, w, m, c] = windows.dims();
        let window_features   = logsignature(windows.reshape([b * w, m, c]), depth);
        let shapelet_features = logsignature(shapelet.reshape([1, m, c]), depth);
        let diff = self.apply_metric(window_features - shapelet_features);
        (diff.powf_scalar(2.0).sum_dim(1) + SQRT_EPS)
            .sqrt()
            .reshape([b, w])
    }
}

/// Classic DTW between every window and the shapelet. Quadratic in the
/// number of samples and built from small tensor ops, so it is slow.
fn dtw<B: Backend>(windows: Tensor<B, 4>, shapelet: Tensor<B, 2>) -> Tensor<B, 2> {
    let [b, w, m, c] = windows.dims();
    let device = windows.device();

    // cost[.., i, j] = |w_i - s_j|, shifted so equal points cost exactly 0
    let cost = (windows.reshape([b, w, m, 1, c]) - shapelet.reshape([1, 1, 1, m, c]))
        .powf_scalar(2.0)
        .sum_dim(4)
        .add_scalar(SQRT_EPS)
        .sqrt()
        .sub_scalar(SQRT_EPS.sqrt())
        .reshape([b, w, m, m]);

    let infinity = Tensor::<B, 2>::full([b, w], f32::INFINITY, &device);
    let mut prev: Vec<Tensor<B, 2>> = vec![infinity.clone(); m + 1];
    prev[0] = Tensor::zeros([b, w], &device);

    for i in 0..m {
        let mut row: Vec<Tensor<B, 2>> = vec![infinity.clone(); m + 1];
        for j in 0..m {
            let step = cost.clone().slice([0..b, 0..w, i..i + 1, j..j + 1]).reshape([b, w]);
            let best = prev[j + 1]
                .clone()
                .min_pair(row[j].clone())
                .min_pair(prev[j].clone());
            row[j + 1] = step + best;
        }
        prev = row;
    }
    prev[m].clone()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn scalar(t: Tensor<B, 2>) -> f32 {
        t.into_data().convert::<f32>().to_vec::<f32>().unwrap()[0]
    }

    fn windows(values: &[f32], m: usize, c: usize) -> Tensor<B, 4> {
        Tensor::<B, 1>::from_floats(values, &Default::default()).reshape([1, 1, m, c])
    }

    fn shapelet(values: &[f32], m: usize, c: usize) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(values, &Default::default()).reshape([m, c])
    }

    fn length(l: f32) -> Tensor<B, 1> {
        Tensor::from_floats([l], &Default::default())
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("L2".parse::<DiscrepancyKind>().unwrap(), DiscrepancyKind::L2);
        assert_eq!(
            "logsig-3".parse::<DiscrepancyKind>().unwrap(),
            DiscrepancyKind::Logsig { depth: 3 }
        );
        assert!("logsig-x".parse::<DiscrepancyKind>().is_err());
        assert!("cosine".parse::<DiscrepancyKind>().is_err());
        assert_eq!(DiscrepancyKind::Logsig { depth: 2 }.to_string(), "logsig-2");
        assert_eq!("diagonal".parse::<MetricType>().unwrap(), MetricType::Diagonal);
    }

    #[test]
    fn test_serialises_as_name() {
        let json = serde_json::to_string(&DiscrepancyKind::Logsig { depth: 3 }).unwrap();
        assert_eq!(json, "\"logsig-3\"");
        let back: DiscrepancyKind = serde_json::from_str("\"L2_squared\"").unwrap();
        assert_eq!(back, DiscrepancyKind::L2Squared);
    }

    #[test]
    fn test_identical_window_has_zero_discrepancy() {
        let device = Default::default();
        for kind in ["L2", "L2_squared", "piecewise_constant_L2_squared", "DTW", "logsig-2"] {
            let kind = kind.parse().unwrap();
            let disc = Discrepancy::<B>::new(kind, Some(MetricType::General), 2, &device);
            let vals = [0.0, 1.0, 2.0, 1.0, 3.0, 0.5];
            let d    = scalar(disc.forward(windows(&vals, 3, 2), shapelet(&vals, 3, 2), length(2.0)));
            assert!(d.abs() < 1e-3, "{kind}: {d}");
        }
    }

    #[test]
    fn test_l2_squared_integrates_over_length() {
        // Constant difference of 1 in one channel over a length-4 shapelet
        let disc = Discrepancy::<B>::new(DiscrepancyKind::L2Squared, None, 1, &Default::default());
        let d = scalar(disc.forward(
            windows(&[1.0, 1.0, 1.0], 3, 1),
            shapelet(&[0.0, 0.0, 0.0], 3, 1),
            length(4.0),
        ));
        assert!((d - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_piecewise_constant_sums_squares() {
        let disc = Discrepancy::<B>::new(
            DiscrepancyKind::PiecewiseConstantL2Squared,
            Some(MetricType::Diagonal),
            1,
            &Default::default(),
        );
        // Pseudometric does not apply to this kind
        assert!(disc.general.is_none() && disc.diagonal.is_none());
        let d = scalar(disc.forward(
            windows(&[1.0, 2.0], 2, 1),
            shapelet(&[0.0, 0.0], 2, 1),
            length(1.0),
        ));
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_dtw_absorbs_time_shift() {
        let disc = Discrepancy::<B>::new(DiscrepancyKind::Dtw, None, 1, &Default::default());
        // Shifted step: pointwise differs, warping aligns it
        let d = scalar(disc.forward(
            windows(&[0.0, 0.0, 1.0, 1.0], 4, 1),
            shapelet(&[0.0, 1.0, 1.0, 1.0], 4, 1),
            length(3.0),
        ));
        assert!(d < 0.01, "{d}");
    }

    #[test]
    fn test_dtw_of_identical_series_is_zero() {
        let disc = Discrepancy::<B>::new(DiscrepancyKind::Dtw, None, 2, &Default::default());
        let values = [0.5, -1.0, 2.0, 0.0, 1.5, 3.0, -2.0, 0.25];
        let d = scalar(disc.forward(windows(&values, 4, 2), shapelet(&values, 4, 2), length(3.0)));
        assert!(d.abs() < 1e-6, "{d}");

        // One unit of difference at a single point costs one unit
        let d = scalar(disc.forward(
            windows(&[0.0, 0.0, 0.0], 3, 1),
            shapelet(&[0.0, 1.0, 0.0], 3, 1),
            length(2.0),
        ));
        assert!((d - 1.0).abs() < 1e-4, "{d}");
    }

    #[test]
    fn test_diagonal_metric_scales_features() {
        let device = Default::default();
        let plain  = Discrepancy::<B>::new(DiscrepancyKind::L2Squared, None, 1, &device);
        let scaled = Discrepancy::<B>::new(DiscrepancyKind::L2Squared, Some(MetricType::Diagonal), 1, &device);
        let w = windows(&[1.0, 1.0], 2, 1);
        let s = shapelet(&[0.0, 0.0], 2, 1);
        let a = scalar(plain.forward(w.clone(), s.clone(), length(1.0)));
        let b = scalar(scaled.forward(w, s, length(1.0)));
        // Ones initialisation leaves the distance unchanged
        assert!((a - b).abs() < 1e-6);
    }
}
