// ============================================================
// Layer 4 — Series Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<SeriesSample>
// into the tensors the model consumes.
//
//   Input:  N SeriesSamples, each a flat [length * channels] block
//   Output: SeriesBatch with
//             series: [N, length, channels]   (float)
//             labels: [N]                     (int)
//
// Every sample was padded to the dataset's longest series during
// preprocessing, so batching is a straight concatenation.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SeriesSample;

/// A batch of series ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct SeriesBatch<B: Backend> {
    /// Shape: [batch_size, length, channels]
    pub series: Tensor<B, 3>,

    /// Shape: [batch_size], class index per series
    pub labels: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct SeriesBatcher<B: Backend> {
    device:   B::Device,
    length:   usize,
    channels: usize,
}

impl<B: Backend> SeriesBatcher<B> {
    pub fn new(device: B::Device, length: usize, channels: usize) -> Self {
        Self { device, length, channels }
    }
}

impl<B: Backend> Batcher<SeriesSample, SeriesBatch<B>> for SeriesBatcher<B> {
    fn batch(&self, items: Vec<SeriesSample>) -> SeriesBatch<B> {
        let batch_size = items.len();

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let series = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, self.length, self.channels]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        SeriesBatch { series, labels }
    }
}
