use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Stable identity of an atom, assigned by the editor that owns the graph.
    AtomId
);

string_id!(
    /// Stable identity of a bond, assigned by the editor that owns the graph.
    BondId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn ids_display_their_inner_string() {
        assert_eq!(AtomId::from("c1").to_string(), "c1");
        assert_eq!(BondId::new(String::from("b-7")).as_str(), "b-7");
    }

    #[test]
    fn ids_order_lexicographically() {
        assert!(AtomId::from("a") < AtomId::from("b"));
        assert!(AtomId::from("a10") < AtomId::from("a9"));
    }

    #[test]
    fn atom_id_can_be_looked_up_by_str() {
        let mut map = HashMap::new();
        map.insert(AtomId::from("o1"), 6);
        assert_eq!(map.get("o1"), Some(&6));
    }
}
