use super::config::EngineConfig;
use super::error::EngineError;
use super::placement::GeometryPlacer;
use super::validation::bond_counts;
use crate::core::chemistry::elements;
use crate::core::models::atom::Atom;
use crate::core::models::ids::{AtomId, BondId};
use crate::core::models::topology::{Bond, BondType};
use crate::core::spatial::grid::SpatialHash;
use nalgebra::{Point3, Unit, Vector3};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

const HYDROGEN: &str = "H";

/// New atoms and bonds proposed by auto-completion, not yet part of any graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl Completion {
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }
}

/// Synthesizes the missing hydrogens of every under-bonded atom.
///
/// Builds its own placer and spatial index from `config`; see [`complete_with`] for the
/// details. The input lists are never modified.
pub fn auto_complete_with_hydrogen(
    atoms: &[Atom],
    bonds: &[Bond],
    config: &EngineConfig,
) -> Result<Completion, EngineError> {
    let mut placer = GeometryPlacer::new(&config.placement);
    let mut environment = SpatialHash::from_atoms(atoms, config.spatial.cell_size)?;
    Ok(complete_with(atoms, bonds, &mut placer, &mut environment))
}

/// Synthesizes hydrogens using a caller-supplied placer and steric environment.
///
/// For each atom whose bond count is below its standard valency, the deficit is filled
/// with hydrogens joined by single bonds. Each hydrogen is placed against the atom's
/// existing bond directions plus the directions of the hydrogens already added to it, so
/// siblings spread out. Every placed hydrogen is inserted into `environment` before the
/// next one is sited. Bond lengths are the sum of covalent radii, falling back to the
/// placer's default bond length.
///
/// Generated identifiers are `{atom}-H{n}` and `{atom}-H{n}-bond`; numbers already in use
/// by any atom or bond are skipped.
#[instrument(skip_all, fields(atoms = atoms.len(), bonds = bonds.len()))]
pub fn complete_with(
    atoms: &[Atom],
    bonds: &[Bond],
    placer: &mut GeometryPlacer,
    environment: &mut SpatialHash,
) -> Completion {
    let counts = bond_counts(atoms, bonds);
    let positions: HashMap<&AtomId, Point3<f64>> =
        atoms.iter().map(|a| (&a.id, a.position)).collect();
    let mut used: HashSet<String> = atoms
        .iter()
        .map(|a| a.id.to_string())
        .chain(bonds.iter().map(|b| b.id.to_string()))
        .collect();

    let mut completion = Completion::default();
    for atom in atoms {
        let Some(standard) = elements::standard_valency(&atom.element) else {
            continue;
        };
        let current = counts.get(&atom.id).copied().unwrap_or(0);
        if current >= standard {
            continue;
        }
        let deficit = standard - current;

        let mut directions = existing_directions(atom, bonds, &positions);
        let bond_length = elements::bond_length(&atom.element, HYDROGEN)
            .unwrap_or(placer.config().default_bond_length);
        let mut serial = 1;

        for _ in 0..deficit {
            let (atom_id, bond_id) = loop {
                let atom_id = format!("{}-H{serial}", atom.id);
                let bond_id = format!("{atom_id}-bond");
                serial += 1;
                if !used.contains(&atom_id) && !used.contains(&bond_id) {
                    break (atom_id, bond_id);
                }
            };
            used.insert(atom_id.clone());
            used.insert(bond_id.clone());

            let position = placer.place(&atom.position, &directions, &*environment, bond_length);
            directions.push(Unit::new_normalize(position - atom.position));

            let hydrogen = Atom::new(AtomId::new(atom_id), HYDROGEN, position);
            environment.insert(hydrogen.clone());
            completion.bonds.push(Bond::new(
                BondId::new(bond_id),
                atom.id.clone(),
                hydrogen.id.clone(),
                BondType::Single,
            ));
            completion.atoms.push(hydrogen);
        }
        debug!(atom = %atom.id, element = %atom.element, added = deficit, "Completed valency");
    }

    info!(hydrogens = completion.len(), "Hydrogen auto-completion finished");
    completion
}

/// Unit vectors from `atom` toward each bonded partner with a known, distinct position.
fn existing_directions(
    atom: &Atom,
    bonds: &[Bond],
    positions: &HashMap<&AtomId, Point3<f64>>,
) -> Vec<Unit<Vector3<f64>>> {
    bonds
        .iter()
        .filter(|b| !b.is_self_bond())
        .filter_map(|b| b.partner_of(&atom.id))
        .filter_map(|partner| positions.get(partner))
        .filter_map(|p| Unit::try_new(p - atom.position, 1e-9))
        .collect()
}
