// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing the experiment:
// raw and padded time series, the dataset catalogue, and the
// result record written at the end of every run.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// Raw series, dense series arrays and the observation time grid
pub mod series;

// The UEA archive datasets and the orderings the suites use
pub mod catalog;

// Metrics, training history and the persisted result record
pub mod record;

// Core abstractions (traits) that other layers implement
pub mod traits;
