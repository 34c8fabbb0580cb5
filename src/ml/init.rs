// ============================================================
// Layer 5 — Shapelet Initialisation
// ============================================================
// Random shapelets train poorly, so every shapelet starts as a piece
// of real data taken from the sample batch (one series per shapelet,
// `per_class` series of every class):
//
//   old     shapelet k = a random window of series k, read at the
//           shapelet's first length
//   kmeans  per class, cut many random windows from that class's
//           series and cluster them; the centroids become that
//           class's shapelets
//
// Windows are read from the piecewise-linear interpolant on the time
// grid, at `num_shapelet_samples` evenly spaced points.

use anyhow::{anyhow, bail, Result};
use linfa::{traits::Fit, DatasetBase};
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use tracing::debug;

use crate::data::dataset::SeriesSample;
use crate::ml::shapelet::TransformSettings;

const WINDOWS_PER_SERIES: usize = 32;
const KMEANS_ITERATIONS:  u64   = 20;
const KMEANS_RUNS:        usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Initialisation {
    Old,
    Kmeans,
}

impl FromStr for Initialisation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "old" => Ok(Self::Old),
            "kmeans" => Ok(Self::Kmeans),
            other => Err(format!("unknown initialisation '{other}' (expected old or kmeans)")),
        }
    }
}

impl fmt::Display for Initialisation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::Kmeans => write!(f, "kmeans"),
        }
    }
}

/// Shapelet values `[num_shapelets, num_shapelet_samples, channels]`,
/// flattened row-major, built from the sample batch.
pub fn initial_shapelets(
    method:   Initialisation,
    samples:  &[SeriesSample],
    settings: &TransformSettings,
    channels: usize,
    rng:      &mut StdRng,
) -> Result<Vec<f32>> {
    if samples.len() != settings.num_shapelets {
        bail!(
            "Expected one sample series per shapelet ({}), got {}",
            settings.num_shapelets,
            samples.len()
        );
    }
    let reader = WindowReader { settings, channels };
    let lengths = settings.initial_lengths();
    let first_length = |k: usize| lengths[k * settings.lengths_per_shapelet];

    match method {
        Initialisation::Old => Ok(samples
            .iter()
            .enumerate()
            .flat_map(|(k, sample)| reader.random_window(&sample.values, first_length(k), rng))
            .collect()),
        Initialisation::Kmeans => {
            let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
            for (k, sample) in samples.iter().enumerate() {
                by_class.entry(sample.label).or_default().push(k);
            }

            let width = settings.num_shapelet_samples * channels;
            let mut shapelets = vec![0.0; settings.num_shapelets * width];
            for (label, slots) in by_class {
                let mut windows = Vec::with_capacity(slots.len() * WINDOWS_PER_SERIES);
                for &k in &slots {
                    for _ in 0..WINDOWS_PER_SERIES {
                        windows.push(reader.random_window(&samples[k].values, first_length(k), rng));
                    }
                }
                let centroids = kmeans(&windows, slots.len(), rng)?;
                debug!("Class {label}: {} centroids from {} windows", centroids.len(), windows.len());
                for (&k, centroid) in slots.iter().zip(centroids) {
                    shapelets[k * width..(k + 1) * width].copy_from_slice(&centroid);
                }
            }
            Ok(shapelets)
        }
    }
}

struct WindowReader<'a> {
    settings: &'a TransformSettings,
    channels: usize,
}

impl WindowReader<'_> {
    /// `[num_shapelet_samples, channels]` window of `length` starting at
    /// a uniformly random time in `[t0, t1 − length]`.
    fn random_window(&self, values: &[f32], length: f32, rng: &mut StdRng) -> Vec<f32> {
        let grid  = self.settings.grid;
        let slack = (grid.span() - length).max(0.0);
        let start = grid.start + rng.gen::<f32>() * slack;
        let m     = self.settings.num_shapelet_samples;

        let mut window = Vec::with_capacity(m * self.channels);
        for i in 0..m {
            let u = if m > 1 { i as f32 / (m - 1) as f32 } else { 0.0 };
            let t = start + u * length;
            for c in 0..self.channels {
                window.push(grid.interpolate(values, c, self.channels, t));
            }
        }
        window
    }
}

/// Cluster flattened windows with linfa's k-means (k-means++ seeding,
/// then Lloyd iterations). Returns one centroid per cluster.
fn kmeans(points: &[Vec<f32>], clusters: usize, rng: &mut StdRng) -> Result<Vec<Vec<f32>>> {
    let width = points.first().map_or(0, Vec::len);
    let flat: Vec<f32> = points.iter().flatten().copied().collect();
    let observations = DatasetBase::from(Array2::from_shape_vec((points.len(), width), flat)?);

    let model = KMeans::params_with_rng(clusters, StdRng::seed_from_u64(rng.gen()))
        .max_n_iterations(KMEANS_ITERATIONS)
        .n_runs(KMEANS_RUNS)
        .fit(&observations)
        .map_err(|e| anyhow!("k-means over {} windows failed: {e}", points.len()))?;

    Ok(model.centroids().outer_iter().map(|row| row.to_vec()).collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::TimeGrid;

    fn settings(num_shapelets: usize) -> TransformSettings {
        TransformSettings {
            grid: TimeGrid::unit(5),
            num_shapelets,
            num_shapelet_samples: 3,
            num_continuous_samples: 5,
            lengths_per_shapelet: 1,
            max_shapelet_length: 2.0,
            learn_lengths: true,
            lengths_at_max: false,
        }
    }

    fn constant(value: f32, label: usize) -> SeriesSample {
        SeriesSample { values: vec![value; 5], label }
    }

    #[test]
    fn test_parse() {
        assert_eq!("kmeans".parse::<Initialisation>().unwrap(), Initialisation::Kmeans);
        assert!("random".parse::<Initialisation>().is_err());
        assert_eq!(Initialisation::Old.to_string(), "old");
    }

    #[test]
    fn test_old_copies_window_of_matching_series() {
        let samples = vec![constant(1.0, 0), constant(-2.0, 1)];
        let mut rng = StdRng::seed_from_u64(3);
        let out = initial_shapelets(Initialisation::Old, &samples, &settings(2), 1, &mut rng).unwrap();
        assert_eq!(out, vec![1.0, 1.0, 1.0, -2.0, -2.0, -2.0]);
    }

    #[test]
    fn test_old_window_follows_a_ramp() {
        let samples = vec![SeriesSample { values: vec![0.0, 1.0, 2.0, 3.0, 4.0], label: 0 }];
        let mut rng = StdRng::seed_from_u64(7);
        let out = initial_shapelets(Initialisation::Old, &samples, &settings(1), 1, &mut rng).unwrap();
        // Length 2 read at 3 points: consecutive values differ by 1
        assert!((out[1] - out[0] - 1.0).abs() < 1e-5);
        assert!((out[2] - out[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_kmeans_centroids_stay_in_their_class() {
        let samples = vec![
            constant(1.0, 0),
            constant(1.2, 0),
            constant(-5.0, 1),
            constant(-5.2, 1),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        let out = initial_shapelets(Initialisation::Kmeans, &samples, &settings(4), 1, &mut rng).unwrap();
        assert_eq!(out.len(), 12);
        assert!(out[..6].iter().all(|v| (0.9..=1.3).contains(v)));
        assert!(out[6..].iter().all(|v| (-5.3..=-4.9).contains(v)));
    }

    #[test]
    fn test_kmeans_separates_clusters() {
        let points = vec![vec![0.0], vec![0.1], vec![10.0], vec![10.1]];
        let mut rng = StdRng::seed_from_u64(1);
        let mut centroids = kmeans(&points, 2, &mut rng).unwrap();
        assert_eq!(centroids.len(), 2);
        centroids.sort_by(|a, b| a[0].total_cmp(&b[0]));
        assert!((centroids[0][0] - 0.05).abs() < 1e-4);
        assert!((centroids[1][0] - 10.05).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_mismatched_sample_batch() {
        let mut rng = StdRng::seed_from_u64(0);
        let samples = vec![constant(0.0, 0)];
        assert!(initial_shapelets(Initialisation::Old, &samples, &settings(2), 1, &mut rng).is_err());
    }
}
