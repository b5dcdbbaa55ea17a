//! Batch computations over a whole structure.
//!
//! Tasks run one bulk query against a spatial index and return owned or borrowed results.
//! With the `parallel` feature enabled they fan out over rayon; the output is identical to
//! the sequential path.

pub mod nearby_pairs;
