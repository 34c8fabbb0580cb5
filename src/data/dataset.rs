use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::series::SeriesArray;

/// One normalised series and its class index.
/// `values` is the `[length, channel]` block, row-major.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSample {
    pub values: Vec<f32>,
    pub label:  usize,
}

#[derive(Debug, Clone)]
pub struct SeriesDataset {
    samples:  Vec<SeriesSample>,
    length:   usize,
    channels: usize,
}

impl SeriesDataset {
    pub fn new(samples: Vec<SeriesSample>, length: usize, channels: usize) -> Self {
        debug_assert!(samples.iter().all(|s| s.values.len() == length * channels));
        Self { samples, length, channels }
    }

    pub fn from_array(array: &SeriesArray, labels: &[usize]) -> Self {
        let samples = labels
            .iter()
            .enumerate()
            .map(|(b, &label)| SeriesSample { values: array.series(b).to_vec(), label })
            .collect();
        Self::new(samples, array.length, array.channels)
    }

    pub fn samples(&self) -> &[SeriesSample] { &self.samples }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn series_length(&self) -> usize { self.length }

    pub fn channels(&self) -> usize { self.channels }
}

impl Dataset<SeriesSample> for SeriesDataset {
    fn get(&self, index: usize) -> Option<SeriesSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
