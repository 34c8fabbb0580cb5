// ============================================================
// Layer 3 — Time Series Domain Types
// ============================================================
// Three shapes of the same data as it moves through the pipeline:
//
//   RawSeries   — one case exactly as read from disk: a label and
//                 one Vec<f32> per channel (channels may be shorter
//                 than the longest case in the archive)
//   SeriesArray — every case padded to one length and stored densely
//                 as [batch, length, channel], row-major
//   TimeGrid    — the evenly spaced observation times shared by
//                 every series in a dataset

use serde::{Deserialize, Serialize};

/// One labelled multivariate case before padding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// One entry per channel; missing observations are NaN
    pub channels: Vec<Vec<f32>>,
    /// Class label exactly as it appears in the file
    pub label: String,
}

impl RawSeries {
    pub fn new(channels: Vec<Vec<f32>>, label: impl Into<String>) -> Self {
        Self { channels, label: label.into() }
    }

    /// Length of the first channel, which is how the archive measures a case
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
}

/// Evenly spaced observation times `start, start + step, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    pub start: f32,
    pub step:  f32,
    pub len:   usize,
}

impl TimeGrid {
    /// The grid used for every UEA dataset: `0, 1, ..., len - 1`
    pub fn unit(len: usize) -> Self {
        Self { start: 0.0, step: 1.0, len }
    }

    pub fn time(&self, index: usize) -> f32 {
        self.start + self.step * index as f32
    }

    pub fn end(&self) -> f32 {
        self.time(self.len.saturating_sub(1))
    }

    /// `times[-1] - times[0]`
    pub fn span(&self) -> f32 {
        self.end() - self.start
    }

    pub fn times(&self) -> Vec<f32> {
        (0..self.len).map(|i| self.time(i)).collect()
    }

    /// Value of the piecewise-linear interpolant of `values` at time `t`.
    /// `values` is sampled on this grid with `stride` between consecutive
    /// observations, starting at `offset`.
    pub fn interpolate(&self, values: &[f32], offset: usize, stride: usize, t: f32) -> f32 {
        if self.len < 2 {
            return values[offset];
        }
        let rel   = ((t - self.start) / self.step).clamp(0.0, (self.len - 1) as f32);
        let lo    = (rel.floor() as usize).min(self.len - 2);
        let frac  = rel - lo as f32;
        let left  = values[offset + lo * stride];
        let right = values[offset + (lo + 1) * stride];
        left + frac * (right - left)
    }
}

/// Dense `[batch, length, channel]` array of series values.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesArray {
    pub values:   Vec<f32>,
    pub batch:    usize,
    pub length:   usize,
    pub channels: usize,
}

impl SeriesArray {
    pub fn zeros(batch: usize, length: usize, channels: usize) -> Self {
        Self { values: vec![0.0; batch * length * channels], batch, length, channels }
    }

    #[inline]
    pub fn index(&self, b: usize, t: usize, c: usize) -> usize {
        (b * self.length + t) * self.channels + c
    }

    pub fn get(&self, b: usize, t: usize, c: usize) -> f32 {
        self.values[self.index(b, t, c)]
    }

    pub fn set(&mut self, b: usize, t: usize, c: usize, value: f32) {
        let i = self.index(b, t, c);
        self.values[i] = value;
    }

    /// The `[length, channel]` block of one series
    pub fn series(&self, b: usize) -> &[f32] {
        let size = self.length * self.channels;
        &self.values[b * size..(b + 1) * size]
    }

    /// Copy out the series at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut values = Vec::with_capacity(indices.len() * self.length * self.channels);
        for &b in indices {
            values.extend_from_slice(self.series(b));
        }
        Self { values, batch: indices.len(), length: self.length, channels: self.channels }
    }

    /// Split along the batch axis: `[0, at)` and `[at, batch)`
    pub fn split_at(&self, at: usize) -> (Self, Self) {
        let first:  Vec<usize> = (0..at).collect();
        let second: Vec<usize> = (at..self.batch).collect();
        (self.select(&first), self.select(&second))
    }
}
