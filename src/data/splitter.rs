// ============================================================
// Layer 4 — Stratified Train/Validation Splitter
// ============================================================
// The UEA archive ships a TRAIN and a TEST split. TEST stays the
// test set; TRAIN is split again into training and validation
// halves so the training loop can pick its best checkpoint on data
// it never fitted.
//
// The split is stratified: every class keeps (as nearly as possible)
// the same proportion on both sides, which matters for the small,
// many-class datasets in the archive. It is also seeded, so every
// ablation of a dataset sees exactly the same split.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::BTreeMap;

/// Seed used by the UEA driver for the validation split
pub const SPLIT_SEED: u64 = 0;

/// Split `items` into (train, validation), stratified by `labels`.
///
/// Each class with `n` items contributes `round(n * train_fraction)`
/// items to the training side, adjusted so that a class with at least
/// two items lands on both sides. Both halves are shuffled.
pub fn stratified_split<T>(
    items:          Vec<T>,
    labels:         &[usize],
    train_fraction: f64,
    seed:           u64,
) -> (Vec<T>, Vec<T>) {
    assert_eq!(items.len(), labels.len(), "every item needs a label");

    let mut rng = StdRng::seed_from_u64(seed);

    // BTreeMap keeps class iteration order stable between runs
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut train_idx = Vec::new();
    let mut val_idx   = Vec::new();
    for (_, mut members) in by_class {
        members.shuffle(&mut rng);
        let n        = members.len();
        let mut take = ((n as f64) * train_fraction).round() as usize;
        if n >= 2 {
            take = take.clamp(1, n - 1);
        } else {
            take = take.min(n);
        }
        val_idx.extend_from_slice(&members[take..]);
        train_idx.extend_from_slice(&members[..take]);
    }
    train_idx.shuffle(&mut rng);
    val_idx.shuffle(&mut rng);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let train = train_idx.iter().filter_map(|&i| slots[i].take()).collect();
    let val   = val_idx.iter().filter_map(|&i| slots[i].take()).collect();

    tracing::debug!(
        "Stratified split: {} training, {} validation",
        train_idx.len(),
        val_idx.len()
    );

    (train, val)
}
