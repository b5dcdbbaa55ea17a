use super::elements;
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::{Bond, BondType};
use crate::core::spatial::grid::SpatialHash;
use crate::core::spatial::{SpatialError, SpatialQuery};
use std::collections::BTreeMap;
use tracing::debug;

/// Default distance below which two atoms are considered bonded.
pub const DEFAULT_BOND_THRESHOLD: f64 = 2.5;

/// Minimum electronegativity difference for an ionic bond.
pub const IONIC_THRESHOLD: f64 = 1.7;

/// Infers single bonds between every pair of atoms closer than `threshold`.
///
/// Pairs come from a spatial hash with `threshold`-sized cells, so the cost is
/// proportional to the number of close contacts rather than quadratic. Bonds are emitted
/// in `(atom1.id, atom2.id)` order with identifiers `bond-{atom1}-{atom2}`.
///
/// # Errors
///
/// Returns [`SpatialError::InvalidCellSize`] if `threshold` is not positive and finite.
pub fn infer_bonds(atoms: &[Atom], threshold: f64) -> Result<Vec<Bond>, SpatialError> {
    let index = SpatialHash::from_atoms(atoms, threshold)?;
    let bonds: Vec<Bond> = index
        .find_nearby_pairs(threshold)
        .into_iter()
        .filter(|pair| pair.distance < threshold)
        .map(|pair| {
            Bond::new(
                format!("bond-{}-{}", pair.atom1.id, pair.atom2.id),
                pair.atom1.id.clone(),
                pair.atom2.id.clone(),
                BondType::Single,
            )
        })
        .collect();
    debug!(
        atoms = atoms.len(),
        bonds = bonds.len(),
        threshold,
        "Inferred bonds from distances"
    );
    Ok(bonds)
}

/// Uncapped bond-order sum of every bond touching `atom_id`.
pub fn used_valence(atom_id: &AtomId, bonds: &[Bond]) -> u32 {
    bonds
        .iter()
        .filter(|b| b.contains(atom_id))
        .map(|b| b.bond_type.bond_order())
        .sum()
}

/// Checks whether a new bond of `bond_type` between two atoms is chemically reasonable.
///
/// Hydrogen and dative bonds are always allowed. Ionic bonds need an electronegativity
/// difference of at least [`IONIC_THRESHOLD`]. Covalent bonds must keep both atoms within
/// their standard valency; elements without one cannot form covalent bonds here.
pub fn can_form_bond(from: &Atom, to: &Atom, bonds: &[Bond], bond_type: BondType) -> bool {
    match bond_type {
        BondType::Hydrogen | BondType::Dative => true,
        BondType::Ionic => {
            let en = |symbol: &str| elements::electronegativity(symbol).unwrap_or(0.0);
            (en(&from.element) - en(&to.element)).abs() >= IONIC_THRESHOLD
        }
        _ => {
            let order = bond_type.bond_order();
            let fits = |atom: &Atom| {
                let capacity = elements::standard_valency(&atom.element).unwrap_or(0);
                used_valence(&atom.id, bonds) + order <= capacity
            };
            fits(from) && fits(to)
        }
    }
}

/// The bond types that [`can_form_bond`] accepts between two atoms.
pub fn available_bond_types(from: &Atom, to: &Atom, bonds: &[Bond]) -> Vec<BondType> {
    [
        BondType::Hydrogen,
        BondType::Dative,
        BondType::Single,
        BondType::Double,
        BondType::Triple,
        BondType::Ionic,
    ]
    .into_iter()
    .filter(|&ty| can_form_bond(from, to, bonds, ty))
    .collect()
}

/// Drops the bonds of a moved atom that are now too long or lead to a missing partner.
///
/// Bonds not touching `moved` are kept unchanged. If `moved` is not in `atoms` the bond
/// list is returned as-is.
pub fn prune_stretched_bonds(
    moved: &AtomId,
    atoms: &[Atom],
    bonds: &[Bond],
    threshold: f64,
) -> Vec<Bond> {
    let find = |id: &AtomId| atoms.iter().find(|a| a.id == *id);
    let Some(moved_atom) = find(moved) else {
        return bonds.to_vec();
    };
    bonds
        .iter()
        .filter(|bond| match bond.partner_of(moved) {
            None => true,
            Some(partner) => {
                find(partner).is_some_and(|other| moved_atom.distance_to(other) < threshold)
            }
        })
        .cloned()
        .collect()
}

/// Molecular formula in Hill order.
///
/// With carbon present: C first, then H, then the rest alphabetically. Without carbon
/// every element, hydrogen included, is alphabetical, so H is not pulled forward:
/// salt water is `ClH2NaO`, not `H2ClNaO`. Counts of one are omitted.
pub fn molecular_formula(atoms: &[Atom]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for atom in atoms {
        *counts.entry(atom.element.as_str()).or_default() += 1;
    }

    let mut ordered: Vec<(&str, usize)> = Vec::with_capacity(counts.len());
    if let Some(carbon) = counts.remove("C") {
        ordered.push(("C", carbon));
        if let Some(hydrogen) = counts.remove("H") {
            ordered.push(("H", hydrogen));
        }
    }
    ordered.extend(counts);

    ordered
        .into_iter()
        .map(|(element, count)| match count {
            1 => element.to_string(),
            n => format!("{element}{n}"),
        })
        .collect()
}

/// Sum of standard atomic weights in g/mol; unknown elements contribute zero.
pub fn molecular_weight(atoms: &[Atom]) -> f64 {
    atoms
        .iter()
        .map(|a| elements::atomic_weight(&a.element).unwrap_or(0.0))
        .sum()
}
