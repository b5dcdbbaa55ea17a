use super::cache::{ValidationCache, cache_key};
use super::config::ValidationConfig;
use super::report::{
    Severity, SuggestionKind, ValidationResult, ValidationSuggestion, ValidationWarning,
    WarningKind,
};
use crate::core::chemistry::elements;
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::{Bond, BondEnd, BondType};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, trace, warn};

/// Valence-shell electron count the octet rule asks for.
pub const OCTET: u32 = 8;

/// Bond-order a single bond contributes to `element`.
///
/// An atom cannot commit more bond order through one bond than it has valence electrons,
/// so a triple bond counts as 1 toward hydrogen. Validation flags every bond where this
/// cap engages as an `unusual-bond`.
pub fn bond_order_contribution(element: &str, bond_type: BondType) -> u32 {
    let order = bond_type.bond_order();
    match elements::profile_of(element) {
        Some(profile) => order.min(profile.valence_electrons),
        None => order,
    }
}

/// Valence-shell electrons a single bond adds to the atom at `end`, capped like
/// [`bond_order_contribution`].
pub fn shared_electron_contribution(element: &str, bond_type: BondType, end: BondEnd) -> u32 {
    let shared = bond_type.shared_electrons(end);
    match elements::profile_of(element) {
        Some(profile) => shared.min(2 * profile.valence_electrons),
        None => shared,
    }
}

/// Valence-shell electron count under the fixed counting model.
///
/// The unshared remainder of the nominal valence electrons plus every electron counted as
/// shared through the atom's bonds.
pub fn valence_shell_electrons(valence_electrons: u32, shared: u32) -> u32 {
    valence_electrons.saturating_sub(shared) + shared
}

#[derive(Debug, Default, Clone, Copy)]
struct AtomTally {
    bond_count: u32,
    shared: u32,
    implausible_triple: bool,
    /// Highest bond order the atom was asked to commit beyond its valence electrons.
    capped_order: Option<u32>,
}

/// The bonding-rule validator.
///
/// Results are memoized under a canonical key of the graph structure. Validating an
/// unchanged graph again returns the cached result; any structural edit produces a new key.
#[derive(Debug, Clone)]
pub struct ChemicalValidator {
    cache: ValidationCache,
}

impl Default for ChemicalValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl ChemicalValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            cache: ValidationCache::new(config.cache_capacity),
        }
    }

    #[instrument(skip_all, fields(atoms = atoms.len(), bonds = bonds.len()))]
    pub fn validate(&mut self, atoms: &[Atom], bonds: &[Bond]) -> ValidationResult {
        let key = cache_key(atoms, bonds);
        if let Some(hit) = self.cache.get(&key) {
            trace!("Validation cache hit");
            return hit.clone();
        }
        trace!("Validation cache miss");
        let result = evaluate(atoms, bonds);
        self.cache.insert(key, result.clone());
        result
    }

    /// Number of memoized results.
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// One-shot validation without a cache.
pub fn validate_molecule(atoms: &[Atom], bonds: &[Bond]) -> ValidationResult {
    evaluate(atoms, bonds)
}

/// Capped bond-order sum of every atom, keyed by atom id. Bonds to unknown atoms and
/// self-bonds contribute nothing.
pub fn bond_counts(atoms: &[Atom], bonds: &[Bond]) -> HashMap<AtomId, u32> {
    let lookup = index_atoms(atoms);
    let mut counts: HashMap<AtomId, u32> = atoms.iter().map(|a| (a.id.clone(), 0)).collect();
    for bond in bonds {
        if bond.is_self_bond() {
            continue;
        }
        let (Some(from), Some(to)) = (lookup.get(&bond.from), lookup.get(&bond.to)) else {
            continue;
        };
        for atom in [from, to] {
            if let Some(count) = counts.get_mut(&atom.id) {
                *count += bond_order_contribution(&atom.element, bond.bond_type);
            }
        }
    }
    counts
}

fn index_atoms(atoms: &[Atom]) -> HashMap<&AtomId, &Atom> {
    let mut lookup = HashMap::with_capacity(atoms.len());
    for atom in atoms {
        lookup.entry(&atom.id).or_insert(atom);
    }
    lookup
}

fn atom_warning(
    atom: &Atom,
    kind: WarningKind,
    severity: Severity,
    message: String,
) -> ValidationWarning {
    ValidationWarning {
        kind,
        atom_id: Some(atom.id.clone()),
        atom_symbol: Some(atom.element.clone()),
        message,
        severity,
    }
}

fn evaluate(atoms: &[Atom], bonds: &[Bond]) -> ValidationResult {
    let lookup = index_atoms(atoms);
    let mut tallies: HashMap<&AtomId, AtomTally> = HashMap::with_capacity(atoms.len());
    let mut bond_warnings = Vec::new();
    let mut seen_pairs: HashSet<(&AtomId, &AtomId)> = HashSet::new();

    for bond in bonds {
        if bond.is_self_bond() {
            if let Some(atom) = lookup.get(&bond.from) {
                bond_warnings.push(atom_warning(
                    atom,
                    WarningKind::UnusualBond,
                    Severity::Medium,
                    format!("Bond '{}' connects {} to itself", bond.id, atom.element),
                ));
            }
            continue;
        }

        let missing: Vec<&AtomId> = [&bond.from, &bond.to]
            .into_iter()
            .filter(|id| !lookup.contains_key(id))
            .collect();
        if !missing.is_empty() {
            for id in missing {
                warn!(bond = %bond.id, atom = %id, "Bond references a missing atom");
                bond_warnings.push(ValidationWarning {
                    kind: WarningKind::DanglingBond,
                    atom_id: None,
                    atom_symbol: None,
                    message: format!("Bond '{}' references missing atom '{}'", bond.id, id),
                    severity: Severity::High,
                });
            }
            continue;
        }

        let (from, to) = (lookup[&bond.from], lookup[&bond.to]);
        if !seen_pairs.insert(bond.sorted_endpoints()) {
            bond_warnings.push(atom_warning(
                from,
                WarningKind::UnusualBond,
                Severity::Medium,
                format!(
                    "Duplicate bond between {} ({}) and {} ({})",
                    from.element, from.id, to.element, to.id
                ),
            ));
        }

        for (atom, end) in [(from, BondEnd::From), (to, BondEnd::To)] {
            let tally = tallies.entry(&atom.id).or_default();
            tally.bond_count += bond_order_contribution(&atom.element, bond.bond_type);
            tally.shared += shared_electron_contribution(&atom.element, bond.bond_type, end);

            let order = bond.bond_type.bond_order();
            let valence = elements::profile_of(&atom.element).map(|p| p.valence_electrons);
            if bond.bond_type == BondType::Triple && !elements::can_form_triple_bond(&atom.element)
            {
                tally.implausible_triple = true;
                let message = if atom.is_hydrogen() {
                    "Hydrogen has only one electron to share and cannot form a triple bond"
                        .to_string()
                } else {
                    format!("{} has a triple bond (unusual)", atom.element)
                };
                bond_warnings.push(atom_warning(
                    atom,
                    WarningKind::UnusualBond,
                    Severity::Medium,
                    message,
                ));
            } else if let Some(valence) = valence.filter(|&v| order > v) {
                tally.capped_order = tally.capped_order.max(Some(order));
                bond_warnings.push(atom_warning(
                    atom,
                    WarningKind::UnusualBond,
                    Severity::Medium,
                    format!(
                        "{} has {valence} valence electron(s) and cannot form a {} bond ('{}')",
                        atom.element,
                        bond.bond_type,
                        bond.id
                    ),
                ));
            }
        }
    }

    let mut result = ValidationResult::default();
    for atom in atoms {
        let tally = tallies.get(&atom.id).copied().unwrap_or_default();
        let element = atom.element.as_str();
        let valence = elements::valence_electrons(element);
        result.electron_counts.insert(atom.id.clone(), valence);
        result.bond_counts.insert(atom.id.clone(), tally.bond_count);

        let max_bonds = elements::max_bonds(element);
        if tally.bond_count > max_bonds {
            result.push_warning(atom_warning(
                atom,
                WarningKind::ValencyExceeded,
                Severity::High,
                format!("{element} has {} bonds (max: {max_bonds})", tally.bond_count),
            ));
        }

        if elements::is_known(element) {
            let shell = valence_shell_electrons(valence, tally.shared);
            if shell < OCTET && !elements::is_octet_exempt(element) {
                result.push_warning(atom_warning(
                    atom,
                    WarningKind::IncompleteOctet,
                    Severity::Medium,
                    format!("{element} has incomplete octet ({shell} electrons)"),
                ));
            } else if shell > OCTET && elements::is_hypervalent(element) {
                result.push_warning(atom_warning(
                    atom,
                    WarningKind::Hypervalent,
                    Severity::Low,
                    format!("{element} is hypervalent ({shell} electrons)"),
                ));
            } else if shell > OCTET {
                result.push_warning(atom_warning(
                    atom,
                    WarningKind::ExpandedOctet,
                    Severity::High,
                    format!("{element} has expanded octet ({shell} electrons)"),
                ));
            }
        }

        if let Some(standard) = elements::standard_valency(element) {
            if tally.bond_count < standard {
                let deficit = standard - tally.bond_count;
                result.suggestions.push(ValidationSuggestion {
                    kind: SuggestionKind::AddHydrogen,
                    atom_id: atom.id.clone(),
                    atom_symbol: atom.element.clone(),
                    action: format!("Add {deficit} hydrogen atom(s)"),
                    reason: format!(
                        "{element} typically forms {standard} bonds but has {}",
                        tally.bond_count
                    ),
                });
            }
        }
        if elements::is_known(element)
            && elements::is_hypervalent(element)
            && valence_shell_electrons(valence, tally.shared) > OCTET
        {
            result.suggestions.push(ValidationSuggestion {
                kind: SuggestionKind::AddLonePair,
                atom_id: atom.id.clone(),
                atom_symbol: atom.element.clone(),
                action: "Add lone pairs".to_string(),
                reason: format!("{element} holds an expanded octet"),
            });
        }
        let reason = if tally.implausible_triple {
            Some(format!("Triple bond is unusual for {element}"))
        } else {
            tally.capped_order.map(|order| {
                format!("{element} has {valence} valence electron(s) but carries a bond of order {order}")
            })
        };
        if let Some(reason) = reason {
            result.suggestions.push(ValidationSuggestion {
                kind: SuggestionKind::ChangeBondOrder,
                atom_id: atom.id.clone(),
                atom_symbol: atom.element.clone(),
                action: "Consider changing bond order".to_string(),
                reason,
            });
        }
    }

    for warning in bond_warnings {
        result.push_warning(warning);
    }
    check_charge_balance(&lookup, bonds, &mut result);

    debug!(
        valid = result.is_valid,
        warnings = result.warnings.len(),
        suggestions = result.suggestions.len(),
        "Validation complete"
    );
    result
}

/// Ionic bonds should pair an electropositive metal with a non-metal.
fn check_charge_balance(
    lookup: &HashMap<&AtomId, &Atom>,
    bonds: &[Bond],
    result: &mut ValidationResult,
) {
    let ionic: Vec<&Bond> = bonds
        .iter()
        .filter(|b| b.bond_type == BondType::Ionic)
        .collect();
    if ionic.is_empty() {
        return;
    }

    let mut has_cation = false;
    let mut has_anion = false;
    for bond in ionic {
        let (Some(from), Some(to)) = (lookup.get(&bond.from), lookup.get(&bond.to)) else {
            continue;
        };
        for atom in [from, to] {
            if elements::is_metal(&atom.element) {
                has_cation = true;
            } else {
                has_anion = true;
            }
        }
    }

    if !(has_cation && has_anion) {
        result.push_warning(ValidationWarning {
            kind: WarningKind::ChargeImbalance,
            atom_id: None,
            atom_symbol: None,
            message: "Ionic compound lacks proper charge balance".to_string(),
            severity: Severity::Medium,
        });
    }
}
