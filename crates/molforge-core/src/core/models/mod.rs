//! # Core Models Module
//!
//! Data structures describing a molecule as an editor sees it: atoms with an element symbol
//! and a 3D position, typed bonds between them, and a graph container that enforces the
//! structural invariants at its boundary.
//!
//! ## Key Components
//!
//! - [`ids`] - Editor-supplied identifiers for atoms and bonds
//! - [`atom`] - Individual atom representation
//! - [`topology`] - Bond types and bond records
//! - [`graph`] - Checked atom/bond container
//!
//! ## Usage
//!
//! ```ignore
//! use molforge::core::models::{atom::Atom, graph::MolecularGraph, topology::{Bond, BondType}};
//! use nalgebra::Point3;
//!
//! let mut graph = MolecularGraph::new();
//! graph.add_atom(Atom::new("c1", "C", Point3::origin()))?;
//! graph.add_atom(Atom::new("o1", "O", Point3::new(1.2, 0.0, 0.0)))?;
//! graph.add_bond(Bond::new("b1", "c1", "o1", BondType::Double))?;
//! ```

pub mod atom;
pub mod graph;
pub mod ids;
pub mod topology;
