// ============================================================
// Layer 4 — Sample Batch for Shapelet Initialisation
// ============================================================
// Shapelets start life as windows cut from real training series.
// This module picks those series: `per_class` of every class, in a
// shuffled walk over the training set, with a little Gaussian jitter
// so that no two shapelets start out bit-identical.
//
// If some class has fewer than `per_class` members, or the dataset
// has fewer classes than the model expects, the walk ends short and
// the run fails with an explicit error instead of training a model
// whose shapelets do not cover every class.

use anyhow::{bail, Result};
use burn::tensor::{Distribution, TensorData};
use rand::{rngs::StdRng, seq::SliceRandom};
use std::collections::BTreeMap;

use crate::data::dataset::{SeriesDataset, SeriesSample};

const JITTER_SCALE: f32 = 0.001;

/// Collect `num_shapelets` series, at most `per_class` of each class.
pub fn sample_batch(
    dataset:       &SeriesDataset,
    per_class:     usize,
    num_shapelets: usize,
    rng:           &mut StdRng,
) -> Result<Vec<SeriesSample>> {
    let mut order: Vec<usize> = (0..dataset.sample_count()).collect();
    order.shuffle(rng);

    let mut seen: BTreeMap<usize, usize> = BTreeMap::new();
    let mut batch = Vec::with_capacity(num_shapelets);

    for index in order {
        if batch.len() == num_shapelets {
            break;
        }
        let sample = &dataset.samples()[index];
        let count  = seen.entry(sample.label).or_insert(0);
        if *count < per_class {
            *count += 1;
            batch.push(sample.clone());
        }
    }

    if batch.len() != num_shapelets {
        bail!(
            "Could not assemble a sample batch covering all classes: need {} series per class \
             and {} in total, but only found {} classes ({} series)",
            per_class,
            num_shapelets,
            seen.len(),
            batch.len()
        );
    }

    add_jitter(&mut batch, rng)?;
    Ok(batch)
}

fn add_jitter(batch: &mut [SeriesSample], rng: &mut StdRng) -> Result<()> {
    let size = batch.first().map_or(0, |s| s.values.len());
    let noise = TensorData::random::<f32, _, _>(
        [batch.len(), size],
        Distribution::Normal(0.0, 1.0),
        rng,
    )
    .to_vec::<f32>()
    .map_err(|e| anyhow::anyhow!("Cannot draw jitter: {e:?}"))?;

    for (sample, noise) in batch.iter_mut().zip(noise.chunks(size.max(1))) {
        for (v, n) in sample.values.iter_mut().zip(noise) {
            *v += JITTER_SCALE * n;
        }
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn dataset(labels: &[usize]) -> SeriesDataset {
        let samples = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| SeriesSample { values: vec![i as f32; 4], label })
            .collect();
        SeriesDataset::new(samples, 4, 1)
    }

    #[test]
    fn test_takes_per_class_of_every_class() {
        let ds      = dataset(&[0, 0, 0, 1, 1, 1, 2, 2, 2]);
        let mut rng = StdRng::seed_from_u64(1);
        let batch   = sample_batch(&ds, 2, 6, &mut rng).unwrap();
        assert_eq!(batch.len(), 6);
        for class in 0..3 {
            assert_eq!(batch.iter().filter(|s| s.label == class).count(), 2);
        }
    }

    #[test]
    fn test_jitter_is_small() {
        let ds      = dataset(&[0, 1]);
        let mut rng = StdRng::seed_from_u64(1);
        let batch   = sample_batch(&ds, 1, 2, &mut rng).unwrap();
        for sample in &batch {
            let original = ds.samples().iter().find(|s| s.label == sample.label).unwrap();
            for (a, b) in sample.values.iter().zip(&original.values) {
                assert!((a - b).abs() < 0.01);
            }
        }
    }

    #[test]
    fn test_fails_when_a_class_is_too_small() {
        let ds      = dataset(&[0, 0, 0, 1]);
        let mut rng = StdRng::seed_from_u64(1);
        let err     = sample_batch(&ds, 2, 4, &mut rng).unwrap_err();
        assert!(err.to_string().contains("covering all classes"));
    }

    #[test]
    fn test_fails_when_classes_are_missing() {
        let ds      = dataset(&[0, 0, 1, 1]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_batch(&ds, 2, 6, &mut rng).is_err());
    }
}
