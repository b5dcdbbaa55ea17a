use super::report::ValidationResult;
use crate::core::models::atom::Atom;
use crate::core::models::topology::Bond;
use std::collections::HashMap;
use std::fmt::Write;

/// Canonical structural key of an atom/bond graph.
///
/// Every atom contributes its id and element, every bond its id, endpoints and type, in
/// input order. Fields are length-prefixed so no identifier content can forge a
/// collision. Positions are excluded: they cannot change a validation result.
pub fn cache_key(atoms: &[Atom], bonds: &[Bond]) -> String {
    let mut key = String::new();
    let mut field = |value: &str| {
        let _ = write!(key, "{}:{}", value.len(), value);
    };
    field("atoms");
    for atom in atoms {
        field(atom.id.as_str());
        field(&atom.element);
    }
    field("bonds");
    for bond in bonds {
        field(bond.id.as_str());
        field(bond.from.as_str());
        field(bond.to.as_str());
        field(&bond.bond_type.to_string());
    }
    key
}

/// Memoized validation results keyed by [`cache_key`].
///
/// When full the cache is cleared before the next insertion; a capacity of zero disables it.
#[derive(Debug, Default, Clone)]
pub struct ValidationCache {
    data: HashMap<String, ValidationResult>,
    capacity: usize,
}

impl ValidationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: HashMap::new(),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ValidationResult> {
        self.data.get(key)
    }

    pub fn insert(&mut self, key: String, result: ValidationResult) {
        if self.capacity == 0 {
            return;
        }
        if self.data.len() >= self.capacity && !self.data.contains_key(&key) {
            self.data.clear();
        }
        self.data.insert(key, result);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
