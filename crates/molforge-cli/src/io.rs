use crate::error::{CliError, Result};
use molforge::core::models::atom::Atom;
use molforge::core::models::topology::{Bond, BondType};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// One atom as stored in a molecule file. Editor-only fields are ignored on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomRecord {
    pub id: String,
    pub element: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondRecord {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default = "default_bond_type")]
    pub bond_type: String,
}

fn default_bond_type() -> String {
    BondType::Single.to_string()
}

/// The JSON molecule interchange format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeFile {
    pub atoms: Vec<AtomRecord>,
    #[serde(default)]
    pub bonds: Vec<BondRecord>,
}

impl MoleculeFile {
    pub fn from_parts(atoms: &[Atom], bonds: &[Bond]) -> Self {
        Self {
            atoms: atoms
                .iter()
                .map(|a| AtomRecord {
                    id: a.id.to_string(),
                    element: a.element.clone(),
                    x: a.position.x,
                    y: a.position.y,
                    z: a.position.z,
                })
                .collect(),
            bonds: bonds
                .iter()
                .map(|b| BondRecord {
                    id: b.id.to_string(),
                    from: b.from.to_string(),
                    to: b.to.to_string(),
                    bond_type: b.bond_type.to_string(),
                })
                .collect(),
        }
    }

    /// Converts the records into library types, parsing bond type names.
    pub fn into_parts(self) -> std::result::Result<(Vec<Atom>, Vec<Bond>), anyhow::Error> {
        let atoms = self
            .atoms
            .into_iter()
            .map(|a| Atom::new(a.id, &a.element, Point3::new(a.x, a.y, a.z)))
            .collect();
        let bonds = self
            .bonds
            .into_iter()
            .map(|b| -> std::result::Result<Bond, anyhow::Error> {
                let bond_type: BondType = b.bond_type.parse()?;
                Ok(Bond::new(b.id, b.from, b.to, bond_type))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((atoms, bonds))
    }
}

pub fn read_molecule(path: &Path) -> Result<(Vec<Atom>, Vec<Bond>)> {
    info!("Loading molecule from {:?}", path);
    let content = std::fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<MoleculeFile>(&content)
        .map_err(anyhow::Error::from)
        .and_then(MoleculeFile::into_parts)
        .map_err(|source| CliError::FileParsing {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(atoms = parsed.0.len(), bonds = parsed.1.len(), "Molecule loaded.");
    Ok(parsed)
}

/// Writes a molecule as pretty JSON to `path`, or to standard output when `path` is `None`.
pub fn write_molecule(path: Option<&Path>, atoms: &[Atom], bonds: &[Bond]) -> Result<()> {
    let json = serde_json::to_string_pretty(&MoleculeFile::from_parts(atoms, bonds))?;
    match path {
        Some(path) => {
            info!("Writing molecule to {:?}", path);
            std::fs::write(path, json + "\n")?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const WATER: &str = r##"{
        "atoms": [
            { "id": "o1", "element": "O", "x": 0.0, "y": 0.0, "z": 0.0, "color": "#ff0000" },
            { "id": "h1", "element": "H", "x": 0.96, "y": 0.0, "z": 0.0 },
            { "id": "h2", "element": "H", "x": -0.24, "y": 0.93, "z": 0.0 }
        ],
        "bonds": [
            { "id": "b1", "from": "o1", "to": "h1", "type": "single" },
            { "id": "b2", "from": "o1", "to": "h2" }
        ]
    }"##;

    #[test]
    fn reads_molecules_and_ignores_editor_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("water.json");
        std::fs::write(&path, WATER).unwrap();

        let (atoms, bonds) = read_molecule(&path).unwrap();
        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms[1].position, Point3::new(0.96, 0.0, 0.0));
        assert_eq!(bonds.len(), 2);
        assert_eq!(bonds[1].bond_type, BondType::Single);
    }

    #[test]
    fn unknown_bond_types_are_reported_with_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{ "atoms": [], "bonds": [{ "id": "b", "from": "a", "to": "c", "type": "quintuple" }] }"#,
        )
        .unwrap();

        match read_molecule(&path) {
            Err(CliError::FileParsing { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected a parsing error, got {other:?}"),
        }
    }

    #[test]
    fn written_files_read_back_identically() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("in.json");
        let target = dir.path().join("out.json");
        std::fs::write(&source, WATER).unwrap();

        let (atoms, bonds) = read_molecule(&source).unwrap();
        write_molecule(Some(&target), &atoms, &bonds).unwrap();
        let (atoms_again, bonds_again) = read_molecule(&target).unwrap();
        assert_eq!(atoms, atoms_again);
        assert_eq!(bonds, bonds_again);
    }

    #[test]
    fn missing_files_surface_as_io_errors() {
        let dir = tempdir().unwrap();
        let result = read_molecule(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
