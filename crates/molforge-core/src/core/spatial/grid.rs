use super::{Aabb, SpatialError, SpatialQuery};
use crate::core::models::atom::Atom;
use nalgebra::Point3;
use std::collections::HashMap;

pub const DEFAULT_CELL_SIZE: f64 = 2.0;

/// Integer grid coordinates of a cell.
pub type CellKey = (i64, i64, i64);

/// One occupied grid cell.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Atoms whose position hashes to this cell.
    atoms: Vec<Atom>,
    /// Spatial extent of the cell.
    bounds: Aabb,
}

impl Cell {
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }
}

/// Occupancy statistics of a [`SpatialHash`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialStats {
    pub total_atoms: usize,
    pub total_cells: usize,
    pub avg_atoms_per_cell: f64,
}

/// A uniform 3D grid spatial hash over atom positions.
///
/// Each occupied cell is keyed by `(⌊x/s⌋, ⌊y/s⌋, ⌊z/s⌋)` for cell size `s` and owns a copy
/// of the atoms hashed to it, so queries touch only the cells overlapping the query region.
/// The index is single-owner mutable state: callers must [`remove`](Self::remove) an atom
/// before changing its position and insert it again afterwards.
///
/// # Performance
///
/// - Insert / remove: **O(1)** average, plus a scan of one bucket for removal.
/// - Radius and box queries: proportional to the number of cells overlapping the query
///   region plus the atoms they contain.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    /// Side length of each cubic cell.
    cell_size: f64,
    /// Occupied cells; empty cells are dropped.
    cells: HashMap<CellKey, Cell>,
    /// Running bounding box of every position ever inserted since the last clear.
    bounds: Option<Aabb>,
    /// Number of stored atoms.
    len: usize,
}

impl Default for SpatialHash {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            cells: HashMap::new(),
            bounds: None,
            len: 0,
        }
    }
}

impl SpatialHash {
    /// Creates an empty spatial hash.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidCellSize`] if `cell_size` is not a positive finite number.
    pub fn new(cell_size: f64) -> Result<Self, SpatialError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SpatialError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            ..Self::default()
        })
    }

    /// Creates a spatial hash pre-populated with `atoms`.
    pub fn from_atoms<'a>(
        atoms: impl IntoIterator<Item = &'a Atom>,
        cell_size: f64,
    ) -> Result<Self, SpatialError> {
        let mut index = Self::new(cell_size)?;
        for atom in atoms {
            index.insert(atom.clone());
        }
        Ok(index)
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// The running bounding box of inserted positions, `None` while nothing was inserted.
    ///
    /// The box only grows; removals do not shrink it until [`clear`](Self::clear).
    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    pub fn cell(&self, key: &CellKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    pub fn cell_key(&self, position: &Point3<f64>) -> CellKey {
        (
            self.axis_index(position.x),
            self.axis_index(position.y),
            self.axis_index(position.z),
        )
    }

    #[inline]
    fn axis_index(&self, coordinate: f64) -> i64 {
        (coordinate / self.cell_size).floor() as i64
    }

    fn cell_bounds(&self, key: CellKey) -> Aabb {
        let s = self.cell_size;
        Aabb::new(
            Point3::new(key.0 as f64 * s, key.1 as f64 * s, key.2 as f64 * s),
            Point3::new(
                (key.0 as f64 + 1.0) * s,
                (key.1 as f64 + 1.0) * s,
                (key.2 as f64 + 1.0) * s,
            ),
        )
    }

    pub fn insert(&mut self, atom: Atom) {
        let key = self.cell_key(&atom.position);
        match self.bounds.as_mut() {
            Some(bounds) => bounds.expand(&atom.position),
            None => self.bounds = Some(Aabb::from_point(atom.position)),
        }
        let bounds = self.cell_bounds(key);
        self.cells
            .entry(key)
            .or_insert_with(|| Cell {
                atoms: Vec::new(),
                bounds,
            })
            .atoms
            .push(atom);
        self.len += 1;
    }

    /// Removes an atom, locating its cell from the atom's current position.
    ///
    /// # Return
    ///
    /// `true` if the atom was found. Removing with a stale position fails and returns `false`.
    pub fn remove(&mut self, atom: &Atom) -> bool {
        let key = self.cell_key(&atom.position);
        let Some(cell) = self.cells.get_mut(&key) else {
            return false;
        };
        let Some(idx) = cell.atoms.iter().position(|a| a.id == atom.id) else {
            return false;
        };
        cell.atoms.swap_remove(idx);
        if cell.atoms.is_empty() {
            self.cells.remove(&key);
        }
        self.len -= 1;
        true
    }

    /// Moves an indexed atom to `new_position` by removing it and inserting the moved copy.
    ///
    /// `atom` must carry the position the atom was indexed under.
    pub fn relocate(&mut self, atom: &Atom, new_position: Point3<f64>) -> bool {
        if !self.remove(atom) {
            return false;
        }
        let mut moved = atom.clone();
        moved.position = new_position;
        self.insert(moved);
        true
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.bounds = None;
        self.len = 0;
    }

    pub fn stats(&self) -> SpatialStats {
        let total_cells = self.cells.len();
        SpatialStats {
            total_atoms: self.len,
            total_cells,
            avg_atoms_per_cell: if total_cells > 0 {
                self.len as f64 / total_cells as f64
            } else {
                0.0
            },
        }
    }

    /// Collects the atoms of every occupied cell in the inclusive key range `[lo, hi]`.
    fn candidates_in_range(&self, lo: CellKey, hi: CellKey) -> Vec<&Atom> {
        if lo.0 > hi.0 || lo.1 > hi.1 || lo.2 > hi.2 {
            return Vec::new();
        }
        // Keys saturate at the i64 range for far coordinates, so spans are measured in f64.
        let span = |a: i64, b: i64| b as f64 - a as f64 + 1.0;
        let range_cells = span(lo.0, hi.0) * span(lo.1, hi.1) * span(lo.2, hi.2);
        let in_range = |k: &CellKey| {
            (lo.0..=hi.0).contains(&k.0) && (lo.1..=hi.1).contains(&k.1) && (lo.2..=hi.2).contains(&k.2)
        };

        // Large query regions are cheaper to answer by walking the occupied cells.
        if range_cells > self.cells.len() as f64 {
            return self
                .cells
                .iter()
                .filter(|(key, _)| in_range(key))
                .flat_map(|(_, cell)| cell.atoms.iter())
                .collect();
        }

        let mut out = Vec::new();
        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                for z in lo.2..=hi.2 {
                    if let Some(cell) = self.cells.get(&(x, y, z)) {
                        out.extend(cell.atoms.iter());
                    }
                }
            }
        }
        out
    }
}

impl SpatialQuery for SpatialHash {
    fn query_radius(&self, center: &Point3<f64>, radius: f64) -> Vec<&Atom> {
        if radius < 0.0 || self.len == 0 {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        let lo = self.cell_key(&Point3::new(
            center.x - radius,
            center.y - radius,
            center.z - radius,
        ));
        let hi = self.cell_key(&Point3::new(
            center.x + radius,
            center.y + radius,
            center.z + radius,
        ));
        self.candidates_in_range(lo, hi)
            .into_iter()
            .filter(|a| (a.position - center).norm_squared() <= radius_sq)
            .collect()
    }

    fn query_box(&self, min: &Point3<f64>, max: &Point3<f64>) -> Vec<&Atom> {
        if self.len == 0 {
            return Vec::new();
        }
        let bounds = Aabb::new(*min, *max);
        self.candidates_in_range(self.cell_key(min), self.cell_key(max))
            .into_iter()
            .filter(|a| bounds.contains(&a.position))
            .collect()
    }

    fn atoms(&self) -> Box<dyn Iterator<Item = &Atom> + '_> {
        Box::new(self.cells.values().flat_map(|cell| cell.atoms.iter()))
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::AtomId;
    use crate::core::spatial::LinearScan;
    use itertools::Itertools;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use std::collections::BTreeSet;

    fn scattered_atoms(count: usize, extent: f64, seed: u64) -> Vec<Atom> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|i| {
                Atom::new(
                    format!("a{i:04}"),
                    "C",
                    Point3::new(
                        rng.gen_range(0.0..extent),
                        rng.gen_range(0.0..extent),
                        rng.gen_range(0.0..extent),
                    ),
                )
            })
            .collect()
    }

    fn id_set(atoms: &[&Atom]) -> BTreeSet<AtomId> {
        atoms.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn new_rejects_non_positive_cell_sizes() {
        assert_eq!(
            SpatialHash::new(0.0).unwrap_err(),
            SpatialError::InvalidCellSize(0.0)
        );
        assert!(SpatialHash::new(-1.0).is_err());
        assert!(SpatialHash::new(f64::NAN).is_err());
        assert!(SpatialHash::new(f64::INFINITY).is_err());
        assert_eq!(SpatialHash::default().cell_size(), DEFAULT_CELL_SIZE);
    }

    #[test]
    fn cell_key_floors_negative_coordinates() {
        let index = SpatialHash::new(2.0).unwrap();
        assert_eq!(index.cell_key(&Point3::new(0.0, 1.99, 2.0)), (0, 0, 1));
        assert_eq!(index.cell_key(&Point3::new(-0.1, -2.0, -2.1)), (-1, -1, -2));
    }

    #[test]
    fn insert_tracks_cells_and_bounds() {
        let mut index = SpatialHash::new(2.0).unwrap();
        assert!(index.bounds().is_none());
        index.insert(Atom::new("a", "C", Point3::new(1.0, 1.0, 1.0)));
        index.insert(Atom::new("b", "C", Point3::new(1.5, 0.5, 1.0)));
        index.insert(Atom::new("c", "C", Point3::new(-3.0, 5.0, 1.0)));

        let bounds = index.bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(-3.0, 0.5, 1.0));
        assert_eq!(bounds.max, Point3::new(1.5, 5.0, 1.0));

        let cell = index.cell(&(0, 0, 0)).unwrap();
        assert_eq!(cell.atoms().len(), 2);
        assert_eq!(cell.bounds().max, Point3::new(2.0, 2.0, 2.0));

        let stats = index.stats();
        assert_eq!(stats.total_atoms, 3);
        assert_eq!(stats.total_cells, 2);
        assert!((stats.avg_atoms_per_cell - 1.5).abs() < 1e-12);
    }

    #[test]
    fn remove_deletes_empty_cells_and_hides_atom_from_queries() {
        let mut index = SpatialHash::new(2.0).unwrap();
        let atom = Atom::new("a", "C", Point3::new(1.0, 1.0, 1.0));
        index.insert(atom.clone());
        index.insert(Atom::new("b", "C", Point3::new(5.0, 5.0, 5.0)));

        assert!(index.remove(&atom));
        assert!(index.cell(&(0, 0, 0)).is_none());
        assert_eq!(index.len(), 1);
        assert!(index.query_radius(&atom.position, 1.0).is_empty());
        assert!(
            index
                .query_box(&Point3::new(0.0, 0.0, 0.0), &Point3::new(2.0, 2.0, 2.0))
                .is_empty()
        );
        assert!(!index.remove(&atom));
    }

    #[test]
    fn remove_with_stale_position_fails() {
        let mut index = SpatialHash::new(2.0).unwrap();
        let atom = Atom::new("a", "C", Point3::new(1.0, 1.0, 1.0));
        index.insert(atom.clone());

        let mut moved = atom.clone();
        moved.position = Point3::new(9.0, 9.0, 9.0);
        assert!(!index.remove(&moved));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn relocate_moves_atom_between_cells() {
        let mut index = SpatialHash::new(2.0).unwrap();
        let atom = Atom::new("a", "C", Point3::new(1.0, 1.0, 1.0));
        index.insert(atom.clone());

        assert!(index.relocate(&atom, Point3::new(9.0, 9.0, 9.0)));
        assert!(index.query_radius(&Point3::new(1.0, 1.0, 1.0), 0.5).is_empty());
        let hits = index.query_radius(&Point3::new(9.0, 9.0, 9.0), 0.1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "a");
    }

    #[test]
    fn query_radius_is_exact_and_inclusive_at_the_boundary() {
        let mut index = SpatialHash::new(1.0).unwrap();
        index.insert(Atom::new("on", "C", Point3::new(2.0, 0.0, 0.0)));
        index.insert(Atom::new("corner", "C", Point3::new(1.5, 1.5, 0.0)));
        let hits = index.query_radius(&Point3::origin(), 2.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "on");
    }

    #[test]
    fn query_radius_matches_brute_force_for_any_cell_size() {
        let atoms = scattered_atoms(400, 20.0, 7);
        let reference = LinearScan::new(&atoms);
        let centers = [
            Point3::new(10.0, 10.0, 10.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(-3.0, 12.5, 21.0),
        ];
        for cell_size in [0.3, 1.0, 2.0, 7.5, 50.0] {
            let index = SpatialHash::from_atoms(&atoms, cell_size).unwrap();
            for center in &centers {
                for radius in [0.0, 1.0, 3.7, 12.0] {
                    assert_eq!(
                        id_set(&index.query_radius(center, radius)),
                        id_set(&reference.query_radius(center, radius)),
                        "cell_size={cell_size} radius={radius}"
                    );
                }
            }
        }
    }

    #[test]
    fn huge_radius_query_returns_every_atom() {
        let atoms = scattered_atoms(50, 10.0, 5);
        let index = SpatialHash::from_atoms(&atoms, 2.0).unwrap();
        let all: BTreeSet<AtomId> = atoms.iter().map(|a| a.id.clone()).collect();
        assert_eq!(id_set(&index.query_radius(&Point3::origin(), 1e19)), all);
        assert_eq!(id_set(&index.query_radius(&Point3::origin(), f64::MAX)), all);
        assert_eq!(
            id_set(&index.query_box(
                &Point3::new(-1e300, -1e300, -1e300),
                &Point3::new(1e300, 1e300, 1e300)
            )),
            all
        );
    }

    #[test]
    fn far_away_atoms_are_indexed_and_found() {
        let mut index = SpatialHash::new(2.0).unwrap();
        index.insert(Atom::new("near", "C", Point3::new(1.0, 0.0, 0.0)));
        index.insert(Atom::new("far", "C", Point3::new(1e300, 0.0, 0.0)));
        index.insert(Atom::new("low", "C", Point3::new(0.0, -1e300, 0.0)));
        assert_eq!(index.len(), 3);

        let hits = index.query_radius(&Point3::new(1e300, 0.0, 0.0), 1.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "far");
        let hits = index.query_radius(&Point3::origin(), 5.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "near");
        assert!(index.find_nearby_pairs(10.0).is_empty());

        let far = Atom::new("far", "C", Point3::new(1e300, 0.0, 0.0));
        assert!(index.remove(&far));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn query_box_matches_brute_force() {
        let atoms = scattered_atoms(300, 15.0, 11);
        let reference = LinearScan::new(&atoms);
        let index = SpatialHash::from_atoms(&atoms, 2.0).unwrap();
        let (min, max) = (Point3::new(2.0, 3.0, -1.0), Point3::new(9.5, 7.25, 8.0));
        assert_eq!(
            id_set(&index.query_box(&min, &max)),
            id_set(&reference.query_box(&min, &max))
        );
        assert!(index.query_box(&max, &min).is_empty());
    }

    #[test]
    fn find_nearby_pairs_matches_brute_force_reference() {
        let atoms = scattered_atoms(1000, 50.0, 42);
        let index = SpatialHash::from_atoms(&atoms, 2.0).unwrap();

        let found: BTreeSet<(AtomId, AtomId)> = index
            .find_nearby_pairs(2.5)
            .iter()
            .map(|p| (p.atom1.id.clone(), p.atom2.id.clone()))
            .collect();

        let expected: BTreeSet<(AtomId, AtomId)> = atoms
            .iter()
            .tuple_combinations()
            .filter(|(a, b)| a.distance_to(b) <= 2.5)
            .map(|(a, b)| {
                if a.id < b.id {
                    (a.id.clone(), b.id.clone())
                } else {
                    (b.id.clone(), a.id.clone())
                }
            })
            .collect();

        assert_eq!(found, expected);
        assert_eq!(index.find_nearby_pairs(2.5).len(), expected.len());
    }

    #[test]
    fn find_nearby_pairs_is_sorted_and_reports_distances() {
        let mut index = SpatialHash::new(2.0).unwrap();
        index.insert(Atom::new("b", "C", Point3::new(0.0, 0.0, 0.0)));
        index.insert(Atom::new("a", "C", Point3::new(1.0, 0.0, 0.0)));
        index.insert(Atom::new("c", "C", Point3::new(0.0, 2.0, 0.0)));
        let pairs = index.find_nearby_pairs(2.0);
        let ids: Vec<_> = pairs
            .iter()
            .map(|p| (p.atom1.id.as_str(), p.atom2.id.as_str()))
            .collect();
        assert_eq!(ids, vec![("a", "b"), ("b", "c")]);
        assert!((pairs[0].distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clear_resets_everything() {
        let atoms = scattered_atoms(10, 5.0, 3);
        let mut index = SpatialHash::from_atoms(&atoms, 1.0).unwrap();
        index.clear();
        assert!(index.is_empty());
        assert!(index.bounds().is_none());
        assert_eq!(index.stats().total_cells, 0);
        assert!(index.find_nearby_pairs(100.0).is_empty());
    }
}
