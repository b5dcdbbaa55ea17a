//! # Workflows Module
//!
//! High-level entry points for editors that want MolForge to own the molecule instead of
//! passing plain atom and bond lists on every call.
//!
//! ## Overview
//!
//! An editor typically adds, moves and deletes atoms one at a time, asks for a validation
//! report after each edit, and occasionally requests missing hydrogens. Doing that with the
//! stateless functions in [`crate::engine`] means rebuilding a spatial index on every call
//! and keeping it consistent by hand. The workflows here own that bookkeeping.
//!
//! ## Architecture
//!
//! - **Editing Session** ([`session`]) - A molecular graph with a spatial hash kept in sync
//!   across edits, a caching validator and a geometry placer.

pub mod session;
