// ============================================================
// Layer 4 — Series Preprocessor
// ============================================================
// Turns the ragged cases read from disk into one dense array and
// applies the dataset-level transformations the experiments ablate.
//
// Steps (applied in order by Preprocessor::prepare):
//   1. Pad every channel to the longest case, repeating its last value
//   2. Fill NaN gaps by linear interpolation (edges take the nearest
//      observed value)
//   3. Optionally append pure-noise channels
//   4. Optionally drop a fraction of interior points per channel and
//      replace them by linear interpolation of their kept neighbours
//
// Label encoding and normalisation live here too, but are applied by
// the use case because they depend on the train/test boundary.

use anyhow::{bail, Result};
use burn::tensor::{Distribution, TensorData};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::HashMap;

use crate::domain::series::{RawSeries, SeriesArray, TimeGrid};

/// Seed of the generator that draws noise channels
pub const NOISE_SEED: u64 = 45678;
/// Seed of the generator that picks which points go missing
pub const MISSING_SEED: u64 = 56789;

const NORMALISE_EPS: f32 = 1e-5;

pub struct Preprocessor {
    /// Fraction of each channel's points to drop, in [0, 1)
    missing_rate:   f64,
    /// Number of N(0, 1) channels appended to every series
    noise_channels: usize,
}

impl Preprocessor {
    pub fn new(missing_rate: f64, noise_channels: usize) -> Self {
        Self { missing_rate, noise_channels }
    }

    /// Pad, clean and perturb raw cases. Returns the array and its time grid.
    pub fn prepare(&self, raw: &[RawSeries]) -> Result<(SeriesArray, TimeGrid)> {
        if !(0.0..1.0).contains(&self.missing_rate) {
            bail!("missing rate must be in [0, 1), got {}", self.missing_rate);
        }

        let mut array = assemble(raw)?;
        fill_nan_gaps(&mut array);

        if self.noise_channels != 0 {
            array = add_noise_channels(&array, self.noise_channels, NOISE_SEED)?;
        }

        let grid = TimeGrid::unit(array.length);

        if self.missing_rate > 0.0 {
            drop_and_interpolate(&mut array, &grid, self.missing_rate, MISSING_SEED);
        }

        tracing::debug!(
            "Prepared {} series of length {} with {} channels",
            array.batch,
            array.length,
            array.channels
        );
        Ok((array, grid))
    }
}

/// Right-pad `channel` to `maxlen` with its last value.
pub fn pad_channel(channel: &[f32], maxlen: usize) -> Vec<f32> {
    let fill    = channel.last().copied().unwrap_or(0.0);
    let mut out = vec![fill; maxlen];
    out[..channel.len()].copy_from_slice(channel);
    out
}

/// Stack raw cases into a `[batch, length, channel]` array.
pub fn assemble(raw: &[RawSeries]) -> Result<SeriesArray> {
    let Some(first) = raw.first() else {
        bail!("cannot assemble an empty dataset");
    };
    let channels = first.num_channels();
    if raw.iter().all(RawSeries::is_empty) {
        bail!("every series is empty");
    }
    let maxlen   = raw.iter().map(RawSeries::len).max().unwrap_or(0);

    let mut array = SeriesArray::zeros(raw.len(), maxlen, channels);
    for (b, case) in raw.iter().enumerate() {
        if case.num_channels() != channels {
            bail!(
                "case {b} has {} channels, expected {channels}",
                case.num_channels()
            );
        }
        for (c, channel) in case.channels.iter().enumerate() {
            if channel.len() > maxlen {
                bail!("case {b} channel {c} is longer than channel 0 of the longest case");
            }
            for (t, value) in pad_channel(channel, maxlen).into_iter().enumerate() {
                array.set(b, t, c, value);
            }
        }
    }
    Ok(array)
}

/// Replace NaNs by linear interpolation between the nearest observed
/// neighbours; leading and trailing NaNs copy the nearest observation.
/// A channel with no observations at all becomes zeros.
pub fn fill_nan_gaps(array: &mut SeriesArray) {
    for b in 0..array.batch {
        for c in 0..array.channels {
            let observed: Vec<usize> = (0..array.length)
                .filter(|&t| !array.get(b, t, c).is_nan())
                .collect();
            if observed.len() == array.length {
                continue;
            }
            if observed.is_empty() {
                for t in 0..array.length {
                    array.set(b, t, c, 0.0);
                }
                continue;
            }
            for t in 0..array.length {
                if !array.get(b, t, c).is_nan() {
                    continue;
                }
                let next = observed.partition_point(|&o| o < t);
                let value = match (next.checked_sub(1).map(|p| observed[p]), observed.get(next)) {
                    (Some(lo), Some(&hi)) => {
                        let ratio = (t - lo) as f32 / (hi - lo) as f32;
                        let (a, z) = (array.get(b, lo, c), array.get(b, hi, c));
                        a + ratio * (z - a)
                    }
                    (Some(lo), None) => array.get(b, lo, c),
                    (None, Some(&hi)) => array.get(b, hi, c),
                    (None, None) => 0.0,
                };
                array.set(b, t, c, value);
            }
        }
    }
}

/// Append `extra` channels of standard normal noise to every series.
pub fn add_noise_channels(array: &SeriesArray, extra: usize, seed: u64) -> Result<SeriesArray> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = TensorData::random::<f32, _, _>(
        [array.batch, array.length, extra],
        Distribution::Normal(0.0, 1.0),
        &mut rng,
    )
    .to_vec::<f32>()
    .map_err(|e| anyhow::anyhow!("Cannot draw noise channels: {e:?}"))?;

    let channels = array.channels + extra;
    let mut out  = SeriesArray::zeros(array.batch, array.length, channels);
    for b in 0..array.batch {
        for t in 0..array.length {
            for c in 0..array.channels {
                out.set(b, t, c, array.get(b, t, c));
            }
            for e in 0..extra {
                out.set(b, t, array.channels + e, noise[(b * array.length + t) * extra + e]);
            }
        }
    }
    Ok(out)
}

/// Remove `floor(length * missing_rate)` interior points from every
/// channel of every series and replace each by linear interpolation in
/// time between the nearest kept points on either side. The first and
/// last observations are always kept.
pub fn drop_and_interpolate(array: &mut SeriesArray, grid: &TimeGrid, missing_rate: f64, seed: u64) {
    if array.length < 3 {
        return;
    }
    let mut rng      = StdRng::seed_from_u64(seed);
    let interior     = array.length - 2;
    let num_removed  = ((array.length as f64 * missing_rate) as usize).min(interior);
    if num_removed == 0 {
        return;
    }

    for b in 0..array.batch {
        for c in 0..array.channels {
            let mut perm: Vec<usize> = (1..=interior).collect();
            perm.shuffle(&mut rng);

            let mut removed = vec![false; array.length];
            for &t in &perm[..num_removed] {
                removed[t] = true;
            }

            for t in 1..array.length - 1 {
                if !removed[t] {
                    continue;
                }
                // Endpoints are never removed, so both searches succeed
                let prev = (0..t).rev().find(|&p| !removed[p]).unwrap_or(0);
                let next = (t + 1..array.length).find(|&n| !removed[n]).unwrap_or(array.length - 1);

                let (prev_time, next_time) = (grid.time(prev), grid.time(next));
                let ratio = (grid.time(t) - prev_time) / (next_time - prev_time);
                let (a, z) = (array.get(b, prev, c), array.get(b, next, c));
                array.set(b, t, c, a + ratio * (z - a));
            }
        }
    }
}

/// Map string labels to `0..num_classes` in order of first appearance.
/// Returns the encoded labels and the class names indexed by code.
pub fn encode_labels(labels: &[String]) -> (Vec<usize>, Vec<String>) {
    let mut codes: HashMap<&str, usize> = HashMap::new();
    let mut names   = Vec::new();
    let mut encoded = Vec::with_capacity(labels.len());

    for label in labels {
        let code = *codes.entry(label.as_str()).or_insert_with(|| {
            names.push(label.clone());
            names.len() - 1
        });
        encoded.push(code);
    }
    (encoded, names)
}

/// Per-channel statistics of the training split.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStats {
    pub mean: Vec<f32>,
    pub std:  Vec<f32>,
}

impl ChannelStats {
    /// Mean and unbiased standard deviation of every channel over all
    /// series and time steps of `train`.
    pub fn fit(train: &SeriesArray) -> Self {
        let count = (train.batch * train.length) as f64;
        let mut mean = vec![0.0f64; train.channels];
        let mut sq   = vec![0.0f64; train.channels];

        for chunk in train.values.chunks(train.channels) {
            for (c, &v) in chunk.iter().enumerate() {
                mean[c] += v as f64;
            }
        }
        for m in &mut mean {
            *m /= count.max(1.0);
        }
        for chunk in train.values.chunks(train.channels) {
            for (c, &v) in chunk.iter().enumerate() {
                let d = v as f64 - mean[c];
                sq[c] += d * d;
            }
        }
        let std = sq
            .iter()
            .map(|s| (s / (count - 1.0).max(1.0)).sqrt() as f32)
            .collect();

        Self { mean: mean.into_iter().map(|m| m as f32).collect(), std }
    }

    /// `(x - mean) / (1e-5 + std)`, channel by channel
    pub fn apply(&self, x: &SeriesArray) -> SeriesArray {
        let mut out = x.clone();
        for chunk in out.values.chunks_mut(x.channels) {
            for (c, v) in chunk.iter_mut().enumerate() {
                *v = (*v - self.mean[c]) / (NORMALISE_EPS + self.std[c]);
            }
        }
        out
    }
}

/// Normalise `x` with the channel statistics of `train`.
pub fn normalise(x: &SeriesArray, train: &SeriesArray) -> SeriesArray {
    ChannelStats::fit(train).apply(x)
}
