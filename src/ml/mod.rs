// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that builds, trains or evaluates tensors lives here.
// The data layer only hands over batches and the application layer
// only sees configs, models and metrics.
//
// What's in this layer:
//
//   signature.rs    — truncated signatures and log-signatures of
//                     piecewise-linear paths (used by logsig-N)
//
//   discrepancy.rs  — how far a window is from a shapelet:
//                     L2, L2_squared, piecewise constant, DTW,
//                     logsig-N, with an optional learnt pseudometric
//
//   shapelet.rs     — the generalised shapelet transform:
//                     learnable shapelets and lengths, windows read
//                     from the interpolated series, min discrepancy
//
//   init.rs         — shapelet initialisation from real data
//                     (random windows or per-class k-means)
//
//   model.rs        — shapelet transform + log + linear classifier
//
//   scheduler.rs    — reduce-learning-rate-on-plateau
//
//   trainer.rs      — training loop, evaluation, best-model tracking
//
// Backends: training uses Autodiff<NdArray> on the CPU; building with
// `--features wgpu` swaps in the Wgpu backend. Evaluation runs on the
// inner backend via model.valid().
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

use burn::tensor::backend::AutodiffBackend;

/// Truncated signature / log-signature features
pub mod signature;

/// Window-to-shapelet discrepancy functions and pseudometrics
pub mod discrepancy;

/// The generalised shapelet transform module
pub mod shapelet;

/// Data-driven shapelet initialisation
pub mod init;

/// Linear classifier on shapelet similarities
pub mod model;

/// Reduce-LR-on-plateau scheduler
pub mod scheduler;

/// Training loop with plateau handling and best-model retention
pub mod trainer;

#[cfg(not(feature = "wgpu"))]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;

#[cfg(feature = "wgpu")]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Backend used for evaluation (no autodiff graph)
pub type EvalBackend = <TrainBackend as AutodiffBackend>::InnerBackend;
