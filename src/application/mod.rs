// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one goal:
// run an experiment, run a whole ablation suite, or re-evaluate a
// saved checkpoint.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Storage only through the domain traits and infra types
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// One experiment: data → model → training → evaluation → record
pub mod run_use_case;

// Fixed grids of experiments with skip-if-done bookkeeping
pub mod suites;

// Re-scoring a saved checkpoint
pub mod evaluate_use_case;
