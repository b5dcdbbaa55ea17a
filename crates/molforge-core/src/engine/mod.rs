//! # Engine Module
//!
//! The rule-based validation and geometry placement engine.
//!
//! ## Overview
//!
//! The engine consumes plain atom and bond lists, never holding on to them between calls.
//! It diagnoses a structure against the fixed bonding model, proposes corrections, and
//! computes positions for new bonded atoms. Every call is synchronous and side-effect
//! free apart from the validator's memoization cache.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Spatial, placement and validation settings, built in
//!   code through [`config::EngineConfigBuilder`] or loaded from TOML
//! - **Validation** ([`validation`]) - The bonding-rule validator and its cached results
//! - **Reports** ([`report`]) - Warnings, suggestions and summaries produced by validation
//! - **Placement** ([`placement`]) - Collision-aware direction search for new bonds, with a
//!   deterministic and a randomized candidate policy
//! - **Completion** ([`completion`]) - Hydrogen auto-completion built on validation and
//!   placement
//! - **Tasks** ([`tasks`]) - Bulk computations with an optional data-parallel path
//! - **Error Handling** ([`error`]) - Engine-level error aggregation

pub(crate) mod cache;
pub mod completion;
pub mod config;
pub mod error;
pub mod placement;
pub mod report;
pub mod tasks;
pub mod validation;
