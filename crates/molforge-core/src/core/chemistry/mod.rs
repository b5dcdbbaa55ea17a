//! # Chemistry Module
//!
//! Static chemical knowledge used by the validator and the editing tools.
//!
//! ## Overview
//!
//! The engine deliberately uses a simplified bond-order / electron-counting model rather
//! than orbital theory. Everything it needs to know about an element lives in compile-time
//! tables, so lookups are constant-time and never fail: unknown symbols fall back to
//! documented defaults.
//!
//! ## Key Components
//!
//! - [`elements`] - Per-element rule tables (valence electrons, standard valency, hard
//!   maximum bond count, capability sets, electronegativity, radii, weights)
//! - [`bonding`] - Graph-level bonding helpers: distance-based bond inference, bond
//!   feasibility checks, stretched-bond pruning, formula and weight calculation

pub mod bonding;
pub mod elements;
