use super::{Aabb, SpatialQuery};
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point3;
use std::collections::HashMap;

// Tree lookups are widened by this much; results are re-filtered with the exact `<= r` test.
const RADIUS_SLACK: f64 = 1e-9;

#[inline]
fn key(position: &Point3<f64>) -> [f64; 3] {
    [position.x, position.y, position.z]
}

/// A k-d tree [`SpatialQuery`] backend for large structures.
///
/// Atoms live in a slot vector; the tree stores slot indices. Removal is by identifier,
/// so unlike [`SpatialHash`](super::grid::SpatialHash) a stale position cannot hide an atom.
pub struct KdTreeIndex {
    tree: KdTree<f64, 3>,
    slots: Vec<Option<Atom>>,
    slot_of: HashMap<AtomId, usize>,
}

impl Default for KdTreeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KdTreeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KdTreeIndex")
            .field("len", &self.slot_of.len())
            .finish()
    }
}

impl KdTreeIndex {
    pub fn new() -> Self {
        Self {
            tree: KdTree::new(),
            slots: Vec::new(),
            slot_of: HashMap::new(),
        }
    }

    pub fn from_atoms<'a>(atoms: impl IntoIterator<Item = &'a Atom>) -> Self {
        let mut index = Self::new();
        for atom in atoms {
            index.insert(atom.clone());
        }
        index
    }

    /// Inserts an atom, replacing any stored atom with the same identifier.
    pub fn insert(&mut self, atom: Atom) {
        self.remove(&atom.id);
        let slot = self.slots.len();
        self.tree.add(&key(&atom.position), slot as u64);
        self.slot_of.insert(atom.id.clone(), slot);
        self.slots.push(Some(atom));
    }

    pub fn remove(&mut self, id: &AtomId) -> Option<Atom> {
        let slot = self.slot_of.remove(id)?;
        let atom = self.slots.get_mut(slot)?.take()?;
        self.tree.remove(&key(&atom.position), slot as u64);
        Some(atom)
    }

    fn slot(&self, item: u64) -> Option<&Atom> {
        self.slots.get(item as usize).and_then(Option::as_ref)
    }
}

impl SpatialQuery for KdTreeIndex {
    fn query_radius(&self, center: &Point3<f64>, radius: f64) -> Vec<&Atom> {
        if radius < 0.0 || self.slot_of.is_empty() {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        self.tree
            .within_unsorted::<SquaredEuclidean>(&key(center), radius_sq + RADIUS_SLACK)
            .into_iter()
            .filter_map(|hit| self.slot(hit.item))
            .filter(|a| (a.position - center).norm_squared() <= radius_sq)
            .collect()
    }

    fn query_box(&self, min: &Point3<f64>, max: &Point3<f64>) -> Vec<&Atom> {
        let bounds = Aabb::new(*min, *max);
        if self.slot_of.is_empty() || (0..3).any(|axis| min[axis] > max[axis]) {
            return Vec::new();
        }
        // The circumscribed sphere of the box is a superset; containment filters it.
        let half_diagonal = bounds.extent().norm() / 2.0 + RADIUS_SLACK;
        self.query_radius(&bounds.center(), half_diagonal)
            .into_iter()
            .filter(|a| bounds.contains(&a.position))
            .collect()
    }

    fn atoms(&self) -> Box<dyn Iterator<Item = &Atom> + '_> {
        Box::new(self.slots.iter().flatten())
    }

    fn len(&self) -> usize {
        self.slot_of.len()
    }
}
