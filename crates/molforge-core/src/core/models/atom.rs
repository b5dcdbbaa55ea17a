use super::ids::AtomId;
use nalgebra::Point3;

/// Represents an atom in a molecular structure being edited.
///
/// An atom carries only what the engine needs: a stable identity, its chemical
/// element symbol and its Cartesian position. Cosmetic attributes such as display
/// colors belong to the editor and are not modeled here.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The editor-assigned identifier of the atom.
    pub id: AtomId,
    /// The chemical element symbol (e.g., "C", "Cl").
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom`.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier of the atom.
    /// * `element` - The chemical element symbol.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(id: impl Into<AtomId>, element: &str, position: Point3<f64>) -> Self {
        Self {
            id: id.into(),
            element: element.trim().to_string(),
            position,
        }
    }

    /// Returns `true` if the atom is a hydrogen.
    pub fn is_hydrogen(&self) -> bool {
        self.element == "H"
    }

    /// Euclidean distance to another atom.
    pub fn distance_to(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_stores_fields_and_trims_element() {
        let atom = Atom::new("c1", " C ", Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.id, AtomId::from("c1"));
        assert_eq!(atom.element, "C");
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn is_hydrogen_matches_only_hydrogen() {
        assert!(Atom::new("h1", "H", Point3::origin()).is_hydrogen());
        assert!(!Atom::new("he1", "He", Point3::origin()).is_hydrogen());
    }

    #[test]
    fn distance_to_is_euclidean() {
        let a = Atom::new("a", "C", Point3::new(0.0, 0.0, 0.0));
        let b = Atom::new("b", "C", Point3::new(3.0, 4.0, 0.0));
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn atom_equality_and_clone_works() {
        let atom = Atom::new("n1", "N", Point3::new(0.5, 0.5, 0.5));
        assert_eq!(atom.clone(), atom);
    }
}
