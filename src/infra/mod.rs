// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on the way out:
//
//   results.rs     — Result records
//                    One JSON file per finished run, numbered
//                    0, 1, 2, ... inside
//                    <results>/<folder>/<subfolder>/. Implements
//                    the ResultSink trait so suites can ask how
//                    many runs of a configuration already exist.
//
//   checkpoint.rs  — Model checkpoints
//                    Uses Burn's DefaultRecorder to serialise the
//                    best model, plus the model and experiment
//                    configs as JSON so `evaluate` can rebuild
//                    both the model and its dataset.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// JSON result records with auto-incrementing file names
pub mod results;

/// Model checkpoint saving and loading
pub mod checkpoint;
