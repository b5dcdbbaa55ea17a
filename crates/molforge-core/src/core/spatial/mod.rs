//! # Spatial Indexing Module
//!
//! Neighbor queries over atom positions. Every backend answers the same exact range and
//! radius queries through the [`SpatialQuery`] trait, so the validator, the geometry placer
//! and the editing session never depend on a particular index layout.
//!
//! ## Backends
//!
//! - [`grid::SpatialHash`] - Uniform-grid spatial hash with incremental insert/remove; the
//!   default index of an editing session.
//! - [`kdtree::KdTreeIndex`] - k-d tree backend for large structures.
//! - [`LinearScan`] - Brute-force scan over a slice; the reference implementation and the
//!   fallback when no index is maintained.
//!
//! All queries are exact: cell- or node-level pruning only narrows the candidate set,
//! and every candidate is confirmed with a true distance or containment test.

pub mod grid;
pub mod kdtree;

use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use itertools::Itertools;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("Cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f64),
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn from_point(point: Point3<f64>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grows the box to include `point`.
    pub fn expand(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Inclusive containment test on all three axes.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extent(&self) -> nalgebra::Vector3<f64> {
        self.max - self.min
    }
}

/// Two distinct atoms found within a distance cutoff of each other.
///
/// `atom1` always carries the smaller identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPair<'a> {
    pub atom1: &'a Atom,
    pub atom2: &'a Atom,
    pub distance: f64,
}

impl<'a> NearbyPair<'a> {
    pub fn new(a: &'a Atom, b: &'a Atom) -> Self {
        let (atom1, atom2) = if a.id <= b.id { (a, b) } else { (b, a) };
        Self {
            atom1,
            atom2,
            distance: atom1.distance_to(atom2),
        }
    }

    pub fn ids(&self) -> (&'a AtomId, &'a AtomId) {
        let (atom1, atom2): (&'a Atom, &'a Atom) = (self.atom1, self.atom2);
        (&atom1.id, &atom2.id)
    }
}

/// Sorts pairs by identifier pair and keeps one pair per identifier pair.
///
/// An index may hold several atoms under one identifier; the closest of their pairs wins,
/// so every enumeration path yields the same list.
pub fn sort_pairs(pairs: &mut Vec<NearbyPair<'_>>) {
    pairs.sort_unstable_by(|a, b| {
        a.ids()
            .cmp(&b.ids())
            .then_with(|| a.distance.total_cmp(&b.distance))
    });
    pairs.dedup_by(|later, kept| later.ids() == kept.ids());
}

/// Abstract range/radius query capability over a set of atoms.
pub trait SpatialQuery {
    /// All atoms whose Euclidean distance to `center` is at most `radius`.
    fn query_radius(&self, center: &Point3<f64>, radius: f64) -> Vec<&Atom>;

    /// All atoms inside the inclusive axis-aligned box `[min, max]`.
    fn query_box(&self, min: &Point3<f64>, max: &Point3<f64>) -> Vec<&Atom>;

    /// Iterates over every stored atom.
    fn atoms(&self) -> Box<dyn Iterator<Item = &Atom> + '_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every unordered pair of distinct atoms within `max_distance`, reported once.
    ///
    /// Runs a radius query around each stored atom and keeps partners with a larger
    /// identifier. The result is sorted by `(atom1.id, atom2.id)` with no repeats.
    fn find_nearby_pairs(&self, max_distance: f64) -> Vec<NearbyPair<'_>> {
        let mut pairs = Vec::new();

        for atom in self.atoms() {
            for other in self.query_radius(&atom.position, max_distance) {
                if atom.id < other.id {
                    pairs.push(NearbyPair::new(atom, other));
                }
            }
        }

        sort_pairs(&mut pairs);
        pairs
    }
}

/// Brute-force [`SpatialQuery`] over a borrowed slice of atoms.
#[derive(Debug, Clone, Copy)]
pub struct LinearScan<'a> {
    atoms: &'a [Atom],
}

impl<'a> LinearScan<'a> {
    pub fn new(atoms: &'a [Atom]) -> Self {
        Self { atoms }
    }
}

impl SpatialQuery for LinearScan<'_> {
    fn query_radius(&self, center: &Point3<f64>, radius: f64) -> Vec<&Atom> {
        if radius < 0.0 {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        self.atoms
            .iter()
            .filter(|a| (a.position - center).norm_squared() <= radius_sq)
            .collect()
    }

    fn query_box(&self, min: &Point3<f64>, max: &Point3<f64>) -> Vec<&Atom> {
        let bounds = Aabb::new(*min, *max);
        self.atoms
            .iter()
            .filter(|a| bounds.contains(&a.position))
            .collect()
    }

    fn atoms(&self) -> Box<dyn Iterator<Item = &Atom> + '_> {
        Box::new(self.atoms.iter())
    }

    fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Checks every unordered pair directly instead of issuing one radius query per atom.
    fn find_nearby_pairs(&self, max_distance: f64) -> Vec<NearbyPair<'_>> {
        if max_distance < 0.0 {
            return Vec::new();
        }
        let limit_sq = max_distance * max_distance;
        let mut pairs: Vec<NearbyPair<'_>> = self
            .atoms
            .iter()
            .tuple_combinations()
            .filter(|(a, b)| a.id != b.id && (a.position - b.position).norm_squared() <= limit_sq)
            .map(|(a, b)| NearbyPair::new(a, b))
            .collect();
        sort_pairs(&mut pairs);
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms() -> Vec<Atom> {
        vec![
            Atom::new("a", "C", Point3::new(0.0, 0.0, 0.0)),
            Atom::new("b", "C", Point3::new(1.0, 0.0, 0.0)),
            Atom::new("c", "C", Point3::new(0.0, 3.0, 0.0)),
        ]
    }

    #[test]
    fn aabb_expand_and_contains() {
        let mut bounds = Aabb::from_point(Point3::new(1.0, 1.0, 1.0));
        bounds.expand(&Point3::new(-1.0, 2.0, 0.5));
        assert_eq!(bounds.min, Point3::new(-1.0, 1.0, 0.5));
        assert_eq!(bounds.max, Point3::new(1.0, 2.0, 1.0));
        assert!(bounds.contains(&Point3::new(0.0, 1.5, 0.75)));
        assert!(bounds.contains(&Point3::new(1.0, 2.0, 1.0)));
        assert!(!bounds.contains(&Point3::new(0.0, 2.1, 0.75)));
        assert_eq!(bounds.center(), Point3::new(0.0, 1.5, 0.75));
    }

    #[test]
    fn nearby_pair_orders_atoms_by_id() {
        let atoms = atoms();
        let pair = NearbyPair::new(&atoms[1], &atoms[0]);
        assert_eq!(pair.atom1.id.as_str(), "a");
        assert_eq!(pair.atom2.id.as_str(), "b");
        assert!((pair.distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn linear_scan_radius_query_is_inclusive() {
        let atoms = atoms();
        let scan = LinearScan::new(&atoms);
        let hits: Vec<_> = scan
            .query_radius(&Point3::origin(), 1.0)
            .into_iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(hits, vec!["a", "b"]);
        assert!(scan.query_radius(&Point3::origin(), -1.0).is_empty());
    }

    #[test]
    fn linear_scan_box_query() {
        let atoms = atoms();
        let scan = LinearScan::new(&atoms);
        let hits = scan.query_box(&Point3::new(-0.5, -0.5, -0.5), &Point3::new(0.5, 3.5, 0.5));
        let ids: Vec<_> = hits.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn linear_scan_reports_each_pair_once() {
        let atoms = atoms();
        let scan = LinearScan::new(&atoms);
        let pairs = scan.find_nearby_pairs(3.5);
        let ids: Vec<_> = pairs
            .iter()
            .map(|p| (p.atom1.id.as_str(), p.atom2.id.as_str()))
            .collect();
        assert_eq!(ids, vec![("a", "b"), ("a", "c"), ("b", "c")]);
        assert!(scan.find_nearby_pairs(0.5).is_empty());
    }

    #[test]
    fn repeated_ids_keep_the_closest_pair() {
        let atoms = vec![
            Atom::new("x", "C", Point3::new(0.0, 0.0, 0.0)),
            Atom::new("x", "C", Point3::new(0.5, 0.0, 0.0)),
            Atom::new("y", "O", Point3::new(1.0, 0.0, 0.0)),
        ];
        let scan = LinearScan::new(&atoms);
        let pairs = scan.find_nearby_pairs(2.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].ids(), (&AtomId::from("x"), &AtomId::from("y")));
        assert!((pairs[0].distance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_scan_yields_empty_results() {
        let scan = LinearScan::new(&[]);
        assert!(scan.is_empty());
        assert!(scan.query_radius(&Point3::origin(), 10.0).is_empty());
        assert!(scan.find_nearby_pairs(10.0).is_empty());
    }
}
