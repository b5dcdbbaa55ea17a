//! # MolForge Core Library
//!
//! A molecular-structure validation and spatial-geometry placement engine for interactive
//! molecule editors. Given a graph of atoms (element, 3D position) and typed bonds, it indexes
//! atoms spatially, evaluates a rule-based bonding model to flag implausible structures, and
//! computes collision-aware positions for new bonded atoms.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Plain data models (`Atom`, `Bond`, `MolecularGraph`), the static
//!   per-element chemistry tables, the spatial index family (`SpatialHash`, `KdTreeIndex`) behind
//!   the [`core::spatial::SpatialQuery`] capability, and pure geometry helpers.
//!
//! - **[`engine`]: The Logic Core.** The bonding rule validator with its result cache, hydrogen
//!   auto-completion, the repulsion-based geometry placer, configuration and error types.
//!
//! - **[`workflows`]: The Public API.** An editing session that owns a graph, keeps its spatial
//!   index in sync and exposes validation and completion as single calls.

pub mod core;
pub mod engine;
pub mod workflows;
