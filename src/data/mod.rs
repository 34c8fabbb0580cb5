// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from .ts files on disk to tensor batches.
//
//   .ts files
//       │
//       ▼
//   TsFileLoader      → reads cases and their string labels
//       │
//       ▼
//   Preprocessor      → pads, fills gaps, adds noise / missingness
//       │
//       ▼
//   stratified_split  → carves a validation set out of TRAIN
//       │
//       ▼
//   SeriesDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   SeriesBatcher     → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// sampling.rs sits to the side: it picks the series the shapelets
// are initialised from.

/// Reads UEA .ts files
pub mod loader;

/// Padding, gap filling, noise, missingness, labels, normalisation
pub mod preprocessor;

/// Seeded, stratified train/validation split
pub mod splitter;

/// Implements Burn's Dataset trait for series samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Picks per-class series for shapelet initialisation
pub mod sampling;
