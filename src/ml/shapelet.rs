// ============================================================
// Layer 5 — Generalised Shapelet Transform
// ============================================================
// Each shapelet is a function on [0, 1], stored as `num_shapelet_samples`
// evenly spaced values per channel, and stretched to one or more
// (optionally learnt) lengths. For every length:
//
//   1. pick `num_continuous_samples` start times evenly over
//      [t0, t1 - length],
//   2. read each window at `num_shapelet_samples` points from the
//      piecewise-linear interpolant of the series,
//   3. measure the discrepancy between window and shapelet,
//   4. keep the minimum over windows.
//
// Window positions are computed as
//
//   pos(s, m) = t0 + v_s·span + length·(u_m − v_s)
//   v_s = s / (S − 1),  u_m = m / (M − 1)
//
// which keeps the interpolation weights differentiable in the length.
// Output column `k · lengths_per_shapelet + j` holds shapelet k at
// its j-th length.

use burn::{
    module::{Ignored, Param, ParamId},
    prelude::*,
    tensor::Distribution,
};

use crate::domain::series::TimeGrid;
use crate::ml::discrepancy::Discrepancy;

#[derive(Debug, Clone)]
pub struct TransformSettings {
    pub grid:                   TimeGrid,
    pub num_shapelets:          usize,
    pub num_shapelet_samples:   usize,
    pub num_continuous_samples: usize,
    pub lengths_per_shapelet:   usize,
    pub max_shapelet_length:    f32,
    pub learn_lengths:          bool,
    /// Start every length at the maximum instead of spreading them out
    pub lengths_at_max:         bool,
}

impl TransformSettings {
    /// Initial lengths: `max · (j + 1) / lengths_per_shapelet` for every shapelet
    pub fn initial_lengths(&self) -> Vec<f32> {
        let per = self.lengths_per_shapelet;
        (0..self.num_shapelets)
            .flat_map(|_| (0..per).map(move |j| (j + 1) as f32 / per as f32))
            .map(|fraction| {
                if self.lengths_at_max {
                    self.max_shapelet_length
                } else {
                    self.max_shapelet_length * fraction
                }
            })
            .collect()
    }
}

#[derive(Module, Debug)]
pub struct GeneralisedShapeletTransform<B: Backend> {
    /// [num_shapelets, num_shapelet_samples, channels]
    pub shapelets:   Param<Tensor<B, 3>>,
    /// [num_shapelets * lengths_per_shapelet]
    pub lengths:     Param<Tensor<B, 1>>,
    pub discrepancy: Discrepancy<B>,
    pub settings:    Ignored<TransformSettings>,
}

impl<B: Backend> GeneralisedShapeletTransform<B> {
    pub fn new(
        settings:    TransformSettings,
        discrepancy: Discrepancy<B>,
        channels:    usize,
        device:      &B::Device,
    ) -> Self {
        let shapelets = Tensor::random(
            [settings.num_shapelets, settings.num_shapelet_samples, channels],
            Distribution::Normal(0.0, 1.0),
            device,
        );
        let lengths = Tensor::<B, 1>::from_floats(settings.initial_lengths().as_slice(), device);
        let lengths = Param::initialized(ParamId::new(), lengths.set_require_grad(settings.learn_lengths));

        Self {
            shapelets: Param::from_tensor(shapelets),
            lengths,
            discrepancy,
            settings: Ignored(settings),
        }
    }

    pub fn settings(&self) -> &TransformSettings {
        &self.settings.0
    }

    pub fn num_outputs(&self) -> usize {
        self.settings().num_shapelets * self.settings().lengths_per_shapelet
    }

    /// Shapelet lengths in the `k · lengths_per_shapelet + j` layout.
    pub fn length_values(&self) -> Vec<f32> {
        self.lengths
            .val()
            .into_data()
            .convert::<f32>()
            .to_vec()
            .unwrap_or_default()
    }

    /// Replace the shapelet values, e.g. after initialisation from data.
    pub fn set_shapelets(&mut self, values: Tensor<B, 3>) {
        let id = self.shapelets.id;
        self.shapelets = Param::initialized(id, values.detach().require_grad());
    }

    /// Clamp lengths to `[grid step, max_shapelet_length]`.
    pub fn clip_lengths(&mut self) {
        let settings = self.settings();
        if !settings.learn_lengths {
            return;
        }
        let (min, max) = (settings.grid.step, settings.max_shapelet_length);
        let id         = self.lengths.id;
        // detach last: a clamped node is not a leaf and cannot be re-tracked
        let clipped    = self.lengths.val().clamp(min, max).detach();
        self.lengths = Param::initialized(id, clipped.require_grad());
    }

    /// Minimum discrepancy of every shapelet/length against every series.
    ///
    /// * `x`: [batch, length, channels], observed on `settings.grid`
    ///
    /// Returns [batch, num_shapelets * lengths_per_shapelet].
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, _, channels] = x.dims();
        let settings  = self.settings();
        let device    = x.device();
        let grid      = settings.grid;
        let samples   = settings.num_shapelet_samples;
        let starts    = settings.num_continuous_samples;
        let per       = settings.lengths_per_shapelet;

        // a[s, m] = t0 + v_s·span, b[s, m] = u_m − v_s
        let (offsets, slopes) = window_layout(grid, starts, samples);
        let offsets = Tensor::<B, 1>::from_floats(offsets.as_slice(), &device);
        let slopes  = Tensor::<B, 1>::from_floats(slopes.as_slice(), &device);

        let shapelets = self.shapelets.val();
        let lengths   = self.lengths.val();

        let mut columns = Vec::with_capacity(self.num_outputs());
        for k in 0..settings.num_shapelets {
            let shapelet = shapelets
                .clone()
                .slice([k..k + 1, 0..samples, 0..channels])
                .reshape([samples, channels]);

            for j in 0..per {
                let column = k * per + j;
                let length = lengths.clone().slice([column..column + 1]);

                let times   = offsets.clone() + slopes.clone() * length.clone();
                let windows = interpolate(x.clone(), times, grid)
                    .reshape([batch, starts, samples, channels]);

                let discrepancy = self.discrepancy.forward(windows, shapelet.clone(), length);
                columns.push(discrepancy.min_dim(1));
            }
        }
        Tensor::cat(columns, 1)
    }

    /// `Σ_{i<j} exp(−|s_i − s_j|²)` over the columns of a `[batch, shapelets]`
    /// similarity matrix. Pushes shapelets towards distinct behaviour.
    pub fn similarity_regularisation(similarity: Tensor<B, 2>) -> Tensor<B, 1> {
        let [batch, n] = similarity.dims();
        let columns   = similarity.transpose();
        let distances = (columns.clone().reshape([n, 1, batch]) - columns.reshape([1, n, batch]))
            .powf_scalar(2.0)
            .sum_dim(2);
        // Diagonal terms are exp(0) = 1 each; off-diagonal pairs count twice
        (distances.neg().exp().sum() - n as f32).div_scalar(2.0)
    }
}

/// Offsets `t0 + v_s·span` and slopes `u_m − v_s` for every (start, sample).
fn window_layout(grid: TimeGrid, starts: usize, samples: usize) -> (Vec<f32>, Vec<f32>) {
    let fraction = |i: usize, n: usize| if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
    let mut offsets = Vec::with_capacity(starts * samples);
    let mut slopes  = Vec::with_capacity(starts * samples);
    for s in 0..starts {
        let v = fraction(s, starts);
        for m in 0..samples {
            offsets.push(grid.start + v * grid.span());
            slopes.push(fraction(m, samples) - v);
        }
    }
    (offsets, slopes)
}

/// Piecewise-linear interpolation of `x: [batch, length, channels]` at
/// `times: [P]`. Returns [batch, P, channels].
fn interpolate<B: Backend>(x: Tensor<B, 3>, times: Tensor<B, 1>, grid: TimeGrid) -> Tensor<B, 3> {
    let [_, length, _] = x.dims();
    let [points]       = times.dims();
    let last           = length.saturating_sub(2) as i32;

    let relative = times.sub_scalar(grid.start).div_scalar(grid.step);
    let lower    = relative.clone().int().clamp(0, last);
    let fraction = (relative - lower.clone().float()).reshape([1, points, 1]);

    let left  = x.clone().select(1, lower.clone());
    let right = x.select(1, lower.add_scalar(1));
    left.clone() + (right - left) * fraction
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::discrepancy::{DiscrepancyKind, MetricType};
    use burn::backend::NdArray;

    type B = NdArray;

    fn settings(num_shapelets: usize, per: usize, len: usize, learn: bool) -> TransformSettings {
        TransformSettings {
            grid: TimeGrid::unit(len),
            num_shapelets,
            num_shapelet_samples: 3,
            num_continuous_samples: len,
            lengths_per_shapelet: per,
            max_shapelet_length: 2.0,
            learn_lengths: learn,
            lengths_at_max: false,
        }
    }

    fn transform(settings: TransformSettings, kind: DiscrepancyKind) -> GeneralisedShapeletTransform<B> {
        let device = Default::default();
        let disc   = Discrepancy::new(kind, Some(MetricType::Diagonal), 1, &device);
        GeneralisedShapeletTransform::new(settings, disc, 1, &device)
    }

    fn series(values: &[f32]) -> Tensor<B, 3> {
        Tensor::<B, 1>::from_floats(values, &Default::default()).reshape([1, values.len(), 1])
    }

    #[test]
    fn test_initial_lengths_layout() {
        assert_eq!(settings(2, 2, 5, true).initial_lengths(), vec![1.0, 2.0, 1.0, 2.0]);
        let at_max = TransformSettings { lengths_at_max: true, ..settings(1, 2, 5, false) };
        assert_eq!(at_max.initial_lengths(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_interpolate_between_grid_points() {
        let x     = series(&[0.0, 2.0, 4.0]);
        let times = Tensor::<B, 1>::from_floats([0.5, 2.0, 1.25], &Default::default());
        let out: Vec<f32> = interpolate(x, times, TimeGrid::unit(3))
            .into_data()
            .convert::<f32>()
            .to_vec()
            .unwrap();
        assert_eq!(out, vec![1.0, 4.0, 2.5]);
    }

    #[test]
    fn test_embedded_shapelet_is_found() {
        // Four start times over [0, 3] land exactly on the grid
        let mut gst = transform(
            TransformSettings { num_continuous_samples: 4, ..settings(1, 1, 6, false) },
            DiscrepancyKind::L2Squared,
        );
        let device = Default::default();
        gst.set_shapelets(Tensor::<B, 1>::from_floats([5.0, 6.0, 7.0], &device).reshape([1, 3, 1]));

        let hit  = gst.forward(series(&[0.0, 0.0, 5.0, 6.0, 7.0, 0.0]));
        let miss = gst.forward(series(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(hit.dims(), [1, 1]);
        let hit: f32  = hit.into_scalar();
        let miss: f32 = miss.into_scalar();
        assert!(hit < 1e-4, "{hit}");
        assert!(miss > 10.0, "{miss}");
    }

    #[test]
    fn test_output_width_is_shapelets_times_lengths() {
        let gst = transform(settings(3, 2, 5, true), DiscrepancyKind::L2);
        let x   = Tensor::<B, 3>::zeros([4, 5, 1], &Default::default());
        assert_eq!(gst.forward(x).dims(), [4, 6]);
    }

    #[test]
    fn test_clip_lengths() {
        let device  = Default::default();
        let mut gst = transform(settings(1, 2, 5, true), DiscrepancyKind::L2);
        gst.lengths = Param::from_tensor(Tensor::from_floats([0.1, 9.0], &device));
        gst.clip_lengths();
        assert_eq!(gst.length_values(), vec![1.0, 2.0]);

        // Frozen lengths are left untouched
        let mut frozen = transform(settings(1, 2, 5, false), DiscrepancyKind::L2);
        frozen.lengths = Param::from_tensor(Tensor::from_floats([0.1, 9.0], &device));
        frozen.clip_lengths();
        assert_eq!(frozen.length_values(), vec![0.1, 9.0]);
    }

    #[test]
    fn test_clipped_lengths_stay_trainable() {
        type AD = burn::backend::Autodiff<NdArray>;
        let device  = Default::default();
        let disc    = Discrepancy::<AD>::new(DiscrepancyKind::L2, None, 1, &device);
        let mut gst = GeneralisedShapeletTransform::<AD>::new(settings(1, 2, 5, true), disc, 1, &device);
        gst.clip_lengths();
        gst.clip_lengths();

        let x = Tensor::<AD, 1>::from_floats([0.0, 1.0, 3.0, 0.5, -1.0], &device).reshape([1, 5, 1]);
        let grads   = gst.forward(x).sum().backward();
        let lengths = gst.lengths.val().grad(&grads);
        assert!(lengths.is_some());
        assert!(gst.shapelets.val().grad(&grads).is_some());
    }

    #[test]
    fn test_similarity_regularisation() {
        let device = Default::default();
        // Two identical columns: one pair at distance 0 → exp(0) = 1
        let same = Tensor::<B, 1>::from_floats([1.0, 1.0, 2.0, 2.0], &device).reshape([2, 2]);
        let reg: f32 = GeneralisedShapeletTransform::similarity_regularisation(same).into_scalar();
        assert!((reg - 1.0).abs() < 1e-5);

        // Far-apart columns contribute almost nothing
        let apart = Tensor::<B, 1>::from_floats([0.0, 10.0, 0.0, 10.0], &device).reshape([2, 2]);
        let reg: f32 = GeneralisedShapeletTransform::similarity_regularisation(apart).into_scalar();
        assert!(reg < 1e-5);
    }
}
