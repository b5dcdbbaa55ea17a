//! # Core Module
//!
//! The fundamental building blocks of MolForge: stateless data models, static chemistry
//! knowledge, spatial indexing and geometry.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, typed bonds and the checked molecular graph
//! - **Chemistry Tables** ([`chemistry`]) - Per-element rule tables and bonding utilities
//! - **Spatial Indexing** ([`spatial`]) - Uniform-grid spatial hash, k-d tree and linear scan
//!   behind one range/radius query capability
//! - **Geometry** ([`utils`]) - Sphere sampling, VSEPR domain directions and vector helpers
//!
//! ## Scientific Foundation
//!
//! The chemistry layer implements a deliberately simplified electron-counting model (integer
//! bond orders, an octet threshold of 8) rather than orbital theory. The tables in
//! [`chemistry::elements`] are documented constants, not derived quantities.

pub mod chemistry;
pub mod models;
pub mod spatial;
pub mod utils;
