use phf::{Map, Set, phf_map, phf_set};

/// Hard maximum bond count assumed for elements missing from the table.
pub const DEFAULT_MAX_BONDS: u32 = 4;

/// Static bonding data for one chemical element.
///
/// These values are documented constants of the simplified bonding model, not
/// derived quantities. `standard_valency` is the typical bonding number used for
/// hydrogen suggestions; `max_bonds` is the hard ceiling used for valency errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementProfile {
    /// Nominal valence-electron count.
    pub valence_electrons: u32,
    /// Typical number of covalent bonds, if the element has one.
    pub standard_valency: Option<u32>,
    /// Hard maximum bond-order sum.
    pub max_bonds: u32,
    /// Pauling electronegativity.
    pub electronegativity: Option<f64>,
    /// Single-bond covalent radius in Angstroms.
    pub covalent_radius: f64,
    /// Standard atomic weight in g/mol.
    pub atomic_weight: f64,
}

const fn profile(
    valence_electrons: u32,
    standard_valency: Option<u32>,
    max_bonds: u32,
    electronegativity: Option<f64>,
    covalent_radius: f64,
    atomic_weight: f64,
) -> ElementProfile {
    ElementProfile {
        valence_electrons,
        standard_valency,
        max_bonds,
        electronegativity,
        covalent_radius,
        atomic_weight,
    }
}

static ELEMENTS: Map<&'static str, ElementProfile> = phf_map! {
    "H"  => profile(1, Some(1), 1, Some(2.20), 0.31, 1.008),
    "He" => profile(2, None,    0, None,       0.28, 4.0026),
    "Li" => profile(1, None,    1, Some(0.98), 1.28, 6.94),
    "Be" => profile(2, Some(2), 2, Some(1.57), 0.96, 9.0122),
    "B"  => profile(3, Some(3), 4, Some(2.04), 0.84, 10.81),
    "C"  => profile(4, Some(4), 4, Some(2.55), 0.76, 12.011),
    "N"  => profile(5, Some(3), 4, Some(3.04), 0.71, 14.007),
    "O"  => profile(6, Some(2), 2, Some(3.44), 0.66, 15.999),
    "F"  => profile(7, Some(1), 1, Some(3.98), 0.57, 18.998),
    "Ne" => profile(8, None,    0, None,       0.58, 20.180),
    "Na" => profile(1, None,    1, Some(0.93), 1.66, 22.990),
    "Mg" => profile(2, None,    2, Some(1.31), 1.41, 24.305),
    "Al" => profile(3, Some(3), 4, Some(1.61), 1.21, 26.982),
    "Si" => profile(4, Some(4), 4, Some(1.90), 1.11, 28.085),
    "P"  => profile(5, Some(3), 6, Some(2.19), 1.07, 30.974),
    "S"  => profile(6, Some(2), 6, Some(2.58), 1.05, 32.06),
    "Cl" => profile(7, Some(1), 7, Some(3.16), 1.02, 35.45),
    "Ar" => profile(8, None,    0, None,       1.06, 39.948),
    "K"  => profile(1, None,    1, Some(0.82), 2.03, 39.098),
    "Ca" => profile(2, None,    2, Some(1.00), 1.76, 40.078),
    "Ga" => profile(3, Some(3), 4, Some(1.81), 1.22, 69.723),
    "Ge" => profile(4, Some(4), 4, Some(2.01), 1.20, 72.630),
    "As" => profile(5, Some(3), 6, Some(2.18), 1.19, 74.922),
    "Se" => profile(6, Some(2), 4, Some(2.55), 1.20, 78.971),
    "Br" => profile(7, Some(1), 7, Some(2.96), 1.20, 79.904),
    "Kr" => profile(8, None,    8, Some(3.00), 1.16, 83.798),
    "Rb" => profile(1, None,    1, Some(0.82), 2.20, 85.468),
    "Sr" => profile(2, None,    2, Some(0.95), 1.95, 87.62),
    "In" => profile(3, Some(3), 4, Some(1.78), 1.42, 114.82),
    "Sn" => profile(4, Some(4), 4, Some(1.96), 1.39, 118.71),
    "Sb" => profile(5, Some(3), 6, Some(2.05), 1.39, 121.76),
    "Te" => profile(6, Some(2), 6, Some(2.10), 1.38, 127.60),
    "I"  => profile(7, Some(1), 7, Some(2.66), 1.39, 126.90),
    "Xe" => profile(8, None,    8, Some(2.60), 1.40, 131.29),
    "Cs" => profile(1, None,    1, Some(0.79), 2.44, 132.91),
    "Ba" => profile(2, None,    2, Some(0.89), 2.15, 137.33),
};

/// Elements allowed to exceed eight valence-shell electrons.
static HYPERVALENT: Set<&'static str> = phf_set! {
    "P", "S", "Cl", "Br", "I", "Xe", "Kr", "As", "Se", "Sb", "Te",
};

/// Elements never required to reach a full octet.
static OCTET_EXEMPT: Set<&'static str> = phf_set! {
    "H", "He", "Li", "Be", "B", "Al",
};

/// Elements that plausibly take part in triple bonds.
static TRIPLE_BOND_CAPABLE: Set<&'static str> = phf_set! {
    "C", "N", "O", "S", "P",
};

static METALS: Set<&'static str> = phf_set! {
    "Li", "Na", "K", "Rb", "Cs", "Fr", "Be", "Mg", "Ca", "Sr", "Ba", "Ra",
    "Al", "Ga", "In", "Tl", "Sn", "Pb", "Bi", "Po", "Sc", "Ti", "V", "Cr",
    "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Y", "Zr", "Nb", "Mo", "Tc", "Ru",
    "Rh", "Pd", "Ag", "Cd", "La", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt",
    "Au", "Hg", "Ac", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
};

pub fn profile_of(symbol: &str) -> Option<&'static ElementProfile> {
    ELEMENTS.get(symbol)
}

pub fn is_known(symbol: &str) -> bool {
    ELEMENTS.contains_key(symbol)
}

/// Nominal valence electrons; `0` for unknown elements.
pub fn valence_electrons(symbol: &str) -> u32 {
    profile_of(symbol).map_or(0, |p| p.valence_electrons)
}

pub fn standard_valency(symbol: &str) -> Option<u32> {
    profile_of(symbol).and_then(|p| p.standard_valency)
}

pub fn max_bonds(symbol: &str) -> u32 {
    profile_of(symbol).map_or(DEFAULT_MAX_BONDS, |p| p.max_bonds)
}

pub fn electronegativity(symbol: &str) -> Option<f64> {
    profile_of(symbol).and_then(|p| p.electronegativity)
}

pub fn covalent_radius(symbol: &str) -> Option<f64> {
    profile_of(symbol).map(|p| p.covalent_radius)
}

pub fn atomic_weight(symbol: &str) -> Option<f64> {
    profile_of(symbol).map(|p| p.atomic_weight)
}

pub fn is_hypervalent(symbol: &str) -> bool {
    HYPERVALENT.contains(symbol)
}

pub fn is_octet_exempt(symbol: &str) -> bool {
    OCTET_EXEMPT.contains(symbol)
}

pub fn can_form_triple_bond(symbol: &str) -> bool {
    TRIPLE_BOND_CAPABLE.contains(symbol)
}

pub fn is_metal(symbol: &str) -> bool {
    METALS.contains(symbol)
}

/// Expected single-bond length between two elements: the sum of their covalent radii.
pub fn bond_length(a: &str, b: &str) -> Option<f64> {
    Some(covalent_radius(a)? + covalent_radius(b)?)
}
