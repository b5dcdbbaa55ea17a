use super::ids::{AtomId, BondId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The kind of connection between two atoms.
///
/// Only the covalent kinds carry bond order in the electron-counting model; ionic and
/// hydrogen bonds are recorded for display and for the charge-balance heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondType {
    #[default]
    Single,
    Double,
    Triple,
    Ionic,
    Hydrogen,
    /// Coordinate bond; the `from` atom donates both electrons.
    Dative,
    Aromatic,
}

/// Which end of a bond an atom sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondEnd {
    From,
    To,
}

impl BondType {
    /// Integer bond-order contribution of this bond to each endpoint.
    pub fn bond_order(self) -> u32 {
        match self {
            Self::Single | Self::Dative | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Ionic | Self::Hydrogen => 0,
        }
    }

    /// Electrons this bond adds to the valence shell of the atom at `end`.
    ///
    /// Dative bonds are asymmetric: the donor counts the shared pair, the acceptor
    /// counts nothing.
    pub fn shared_electrons(self, end: BondEnd) -> u32 {
        match (self, end) {
            (Self::Dative, BondEnd::From) => 2,
            (Self::Dative, BondEnd::To) => 0,
            (other, _) => 2 * other.bond_order(),
        }
    }

    /// Returns `true` for bond kinds that share electron pairs.
    pub fn is_covalent(self) -> bool {
        !matches!(self, Self::Ionic | Self::Hydrogen)
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond type string: '{0}'")]
pub struct ParseBondTypeError(pub String);

impl FromStr for BondType {
    type Err = ParseBondTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "i" | "ionic" => Ok(Self::Ionic),
            "h" | "hydrogen" => Ok(Self::Hydrogen),
            "dative" | "coordinate" => Ok(Self::Dative),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for BondType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "single",
                Self::Double => "double",
                Self::Triple => "triple",
                Self::Ionic => "ionic",
                Self::Hydrogen => "hydrogen",
                Self::Dative => "dative",
                Self::Aromatic => "aromatic",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub id: BondId,
    pub from: AtomId,
    pub to: AtomId,
    pub bond_type: BondType,
}

impl Bond {
    pub fn new(
        id: impl Into<BondId>,
        from: impl Into<AtomId>,
        to: impl Into<AtomId>,
        bond_type: BondType,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            bond_type,
        }
    }

    pub fn contains(&self, atom_id: &AtomId) -> bool {
        self.from == *atom_id || self.to == *atom_id
    }

    /// The end of the bond occupied by `atom_id`, if it is an endpoint.
    pub fn end_of(&self, atom_id: &AtomId) -> Option<BondEnd> {
        if self.from == *atom_id {
            Some(BondEnd::From)
        } else if self.to == *atom_id {
            Some(BondEnd::To)
        } else {
            None
        }
    }

    /// The endpoint opposite to `atom_id`.
    pub fn partner_of(&self, atom_id: &AtomId) -> Option<&AtomId> {
        match self.end_of(atom_id)? {
            BondEnd::From => Some(&self.to),
            BondEnd::To => Some(&self.from),
        }
    }

    /// Endpoints sorted so that the same pair always yields the same key.
    pub fn sorted_endpoints(&self) -> (&AtomId, &AtomId) {
        if self.from <= self.to {
            (&self.from, &self.to)
        } else {
            (&self.to, &self.from)
        }
    }

    pub fn is_self_bond(&self) -> bool {
        self.from == self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_type_from_str_parses_valid_strings() {
        assert_eq!("1".parse::<BondType>().unwrap(), BondType::Single);
        assert_eq!("Single".parse::<BondType>().unwrap(), BondType::Single);
        assert_eq!("D".parse::<BondType>().unwrap(), BondType::Double);
        assert_eq!("triple".parse::<BondType>().unwrap(), BondType::Triple);
        assert_eq!("ionic".parse::<BondType>().unwrap(), BondType::Ionic);
        assert_eq!("hydrogen".parse::<BondType>().unwrap(), BondType::Hydrogen);
        assert_eq!("coordinate".parse::<BondType>().unwrap(), BondType::Dative);
        assert_eq!(" ar ".parse::<BondType>().unwrap(), BondType::Aromatic);
    }

    #[test]
    fn bond_type_from_str_rejects_invalid_strings() {
        assert!("".parse::<BondType>().is_err());
        assert!("quadruple".parse::<BondType>().is_err());
        assert!("0".parse::<BondType>().is_err());
    }

    #[test]
    fn bond_type_display_round_trips_through_from_str() {
        for ty in [
            BondType::Single,
            BondType::Double,
            BondType::Triple,
            BondType::Ionic,
            BondType::Hydrogen,
            BondType::Dative,
            BondType::Aromatic,
        ] {
            assert_eq!(ty.to_string().parse::<BondType>().unwrap(), ty);
        }
    }

    #[test]
    fn bond_orders_follow_the_fixed_model() {
        assert_eq!(BondType::Single.bond_order(), 1);
        assert_eq!(BondType::Double.bond_order(), 2);
        assert_eq!(BondType::Triple.bond_order(), 3);
        assert_eq!(BondType::Dative.bond_order(), 1);
        assert_eq!(BondType::Aromatic.bond_order(), 1);
        assert_eq!(BondType::Ionic.bond_order(), 0);
        assert_eq!(BondType::Hydrogen.bond_order(), 0);
    }

    #[test]
    fn dative_bond_attributes_electrons_to_donor_only() {
        assert_eq!(BondType::Dative.shared_electrons(BondEnd::From), 2);
        assert_eq!(BondType::Dative.shared_electrons(BondEnd::To), 0);
        assert_eq!(BondType::Triple.shared_electrons(BondEnd::To), 6);
        assert_eq!(BondType::Ionic.shared_electrons(BondEnd::From), 0);
    }

    #[test]
    fn bond_endpoint_helpers_work() {
        let bond = Bond::new("b1", "z", "a", BondType::Dative);
        let z = AtomId::from("z");
        let a = AtomId::from("a");
        assert!(bond.contains(&z));
        assert!(!bond.contains(&AtomId::from("q")));
        assert_eq!(bond.end_of(&z), Some(BondEnd::From));
        assert_eq!(bond.partner_of(&z), Some(&a));
        assert_eq!(bond.sorted_endpoints(), (&a, &z));
        assert!(!bond.is_self_bond());
        assert!(Bond::new("b2", "a", "a", BondType::Single).is_self_bond());
    }

    #[test]
    fn bond_type_default_is_single() {
        assert_eq!(BondType::default(), BondType::Single);
    }
}
