use super::atom::Atom;
use super::ids::{AtomId, BondId};
use super::topology::{Bond, BondType};
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Atom '{0}' already exists in the graph")]
    DuplicateAtom(AtomId),
    #[error("Bond '{0}' already exists in the graph")]
    DuplicateBond(BondId),
    #[error("Bond '{0}' connects an atom to itself")]
    SelfBond(BondId),
    #[error("Bond '{bond}' references missing atom '{atom}'")]
    MissingEndpoint { bond: BondId, atom: AtomId },
    #[error("Atom '{0}' not found")]
    AtomNotFound(AtomId),
    #[error("Bond '{0}' not found")]
    BondNotFound(BondId),
}

/// An owned atom/bond container that enforces the structural invariants at its boundary.
///
/// Unlike the plain slices accepted by the validator, a `MolecularGraph` never holds a
/// self-bond, a bond to a missing atom, or two records with the same identifier. Atoms
/// and bonds keep their insertion order, which is the order validation reports follow.
#[derive(Debug, Clone, Default)]
pub struct MolecularGraph {
    /// Atoms in insertion order.
    atoms: Vec<Atom>,
    /// Bonds in insertion order.
    bonds: Vec<Bond>,
    /// Position of each atom within `atoms`.
    atom_index: HashMap<AtomId, usize>,
    /// Identifiers of all bonds, for duplicate detection.
    bond_ids: HashSet<BondId>,
}

impl MolecularGraph {
    /// Creates a new, empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from plain lists, rejecting the first record that breaks an invariant.
    pub fn from_parts(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        graph.merge(atoms, bonds)?;
        Ok(graph)
    }

    pub fn atom(&self, id: &AtomId) -> Option<&Atom> {
        self.atom_index.get(id).map(|&idx| &self.atoms[idx])
    }

    pub fn bond(&self, id: &BondId) -> Option<&Bond> {
        self.bonds.iter().find(|b| b.id == *id)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn contains_atom(&self, id: &AtomId) -> bool {
        self.atom_index.contains_key(id)
    }

    /// Iterates over the bonds touching `atom_id`.
    pub fn bonds_of<'a>(&'a self, atom_id: &'a AtomId) -> impl Iterator<Item = &'a Bond> + 'a {
        self.bonds.iter().filter(move |b| b.contains(atom_id))
    }

    /// Iterates over the atoms bonded to `atom_id`.
    pub fn neighbors<'a>(&'a self, atom_id: &'a AtomId) -> impl Iterator<Item = &'a Atom> + 'a {
        self.bonds_of(atom_id)
            .filter_map(move |b| b.partner_of(atom_id))
            .filter_map(move |partner| self.atom(partner))
    }

    pub fn add_atom(&mut self, atom: Atom) -> Result<(), GraphError> {
        if self.atom_index.contains_key(&atom.id) {
            return Err(GraphError::DuplicateAtom(atom.id));
        }
        self.atom_index.insert(atom.id.clone(), self.atoms.len());
        self.atoms.push(atom);
        Ok(())
    }

    pub fn add_bond(&mut self, bond: Bond) -> Result<(), GraphError> {
        self.check_bond(&bond, &HashSet::new())?;
        self.bond_ids.insert(bond.id.clone());
        self.bonds.push(bond);
        Ok(())
    }

    /// Removes an atom together with every bond that touches it.
    ///
    /// # Return
    ///
    /// The removed atom and its incident bonds.
    pub fn remove_atom(&mut self, id: &AtomId) -> Result<(Atom, Vec<Bond>), GraphError> {
        let idx = self
            .atom_index
            .remove(id)
            .ok_or_else(|| GraphError::AtomNotFound(id.clone()))?;
        let atom = self.atoms.remove(idx);
        for slot in self.atom_index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }

        let (removed, kept): (Vec<Bond>, Vec<Bond>) =
            std::mem::take(&mut self.bonds)
                .into_iter()
                .partition(|b| b.contains(id));
        self.bonds = kept;
        for bond in &removed {
            self.bond_ids.remove(&bond.id);
        }
        Ok((atom, removed))
    }

    pub fn remove_bond(&mut self, id: &BondId) -> Result<Bond, GraphError> {
        let idx = self
            .bonds
            .iter()
            .position(|b| b.id == *id)
            .ok_or_else(|| GraphError::BondNotFound(id.clone()))?;
        self.bond_ids.remove(id);
        Ok(self.bonds.remove(idx))
    }

    pub fn set_bond_type(&mut self, id: &BondId, bond_type: BondType) -> Result<(), GraphError> {
        let bond = self
            .bonds
            .iter_mut()
            .find(|b| b.id == *id)
            .ok_or_else(|| GraphError::BondNotFound(id.clone()))?;
        bond.bond_type = bond_type;
        Ok(())
    }

    /// Moves an atom. Callers keeping a spatial index must remove the atom from it first.
    pub fn set_position(&mut self, id: &AtomId, position: Point3<f64>) -> Result<(), GraphError> {
        let idx = *self
            .atom_index
            .get(id)
            .ok_or_else(|| GraphError::AtomNotFound(id.clone()))?;
        self.atoms[idx].position = position;
        Ok(())
    }

    /// Commits a batch of new atoms and bonds, all or nothing.
    ///
    /// Bonds in the batch may reference atoms from the same batch.
    pub fn merge(&mut self, atoms: Vec<Atom>, bonds: Vec<Bond>) -> Result<(), GraphError> {
        let mut new_atom_ids = HashSet::with_capacity(atoms.len());
        for atom in &atoms {
            if self.atom_index.contains_key(&atom.id) || !new_atom_ids.insert(atom.id.clone()) {
                return Err(GraphError::DuplicateAtom(atom.id.clone()));
            }
        }
        let mut new_bond_ids = HashSet::with_capacity(bonds.len());
        for bond in &bonds {
            self.check_bond(bond, &new_atom_ids)?;
            if !new_bond_ids.insert(bond.id.clone()) {
                return Err(GraphError::DuplicateBond(bond.id.clone()));
            }
        }

        for atom in atoms {
            self.atom_index.insert(atom.id.clone(), self.atoms.len());
            self.atoms.push(atom);
        }
        self.bond_ids.extend(new_bond_ids);
        self.bonds.extend(bonds);
        Ok(())
    }

    fn check_bond(&self, bond: &Bond, pending_atoms: &HashSet<AtomId>) -> Result<(), GraphError> {
        if self.bond_ids.contains(&bond.id) {
            return Err(GraphError::DuplicateBond(bond.id.clone()));
        }
        if bond.is_self_bond() {
            return Err(GraphError::SelfBond(bond.id.clone()));
        }
        for endpoint in [&bond.from, &bond.to] {
            if !self.atom_index.contains_key(endpoint) && !pending_atoms.contains(endpoint) {
                return Err(GraphError::MissingEndpoint {
                    bond: bond.id.clone(),
                    atom: endpoint.clone(),
                });
            }
        }
        Ok(())
    }
}
