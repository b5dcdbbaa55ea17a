use crate::core::chemistry::{bonding, elements};
use crate::core::models::atom::Atom;
use crate::core::models::graph::{GraphError, MolecularGraph};
use crate::core::models::ids::{AtomId, BondId};
use crate::core::models::topology::{Bond, BondType};
use crate::core::spatial::NearbyPair;
use crate::core::spatial::grid::SpatialHash;
use crate::engine::completion::{Completion, complete_with};
use crate::engine::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::engine::placement::GeometryPlacer;
use crate::engine::report::ValidationResult;
use crate::engine::tasks;
use crate::engine::validation::ChemicalValidator;
use nalgebra::{Point3, Unit, Vector3};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// An editable molecule with a spatial index that follows every edit.
///
/// The graph enforces its structural invariants; the session adds the spatial hash, a
/// validator whose cache survives across edits, and a placer for new atoms. An atom is
/// always removed from the index before its position changes and reinserted afterwards,
/// so index queries never see a stale position.
#[derive(Debug, Clone)]
pub struct EditSession {
    graph: MolecularGraph,
    index: SpatialHash,
    validator: ChemicalValidator,
    placer: GeometryPlacer,
    config: EngineConfig,
}

impl EditSession {
    /// Starts an empty session.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            graph: MolecularGraph::new(),
            index: SpatialHash::new(config.spatial.cell_size)?,
            validator: ChemicalValidator::new(&config.validation),
            placer: GeometryPlacer::new(&config.placement),
            config,
        })
    }

    /// Starts a session over an existing structure.
    ///
    /// # Errors
    ///
    /// Fails with [`EngineError::Graph`] if the lists contain duplicate identifiers,
    /// self-bonds or bonds to missing atoms.
    #[instrument(skip_all, name = "session_from_parts")]
    pub fn from_parts(
        atoms: Vec<Atom>,
        bonds: Vec<Bond>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let graph = MolecularGraph::from_parts(atoms, bonds)?;
        let index = SpatialHash::from_atoms(graph.atoms(), config.spatial.cell_size)?;
        info!(
            atoms = graph.atom_count(),
            bonds = graph.bond_count(),
            "Opened editing session."
        );
        Ok(Self {
            graph,
            index,
            validator: ChemicalValidator::new(&config.validation),
            placer: GeometryPlacer::new(&config.placement),
            config,
        })
    }

    pub fn graph(&self) -> &MolecularGraph {
        &self.graph
    }

    pub fn index(&self) -> &SpatialHash {
        &self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the session, returning the edited graph.
    pub fn into_graph(self) -> MolecularGraph {
        self.graph
    }

    pub fn add_atom(&mut self, atom: Atom) -> Result<(), EngineError> {
        self.graph.add_atom(atom.clone())?;
        self.index.insert(atom);
        Ok(())
    }

    pub fn move_atom(&mut self, id: &AtomId, position: Point3<f64>) -> Result<(), EngineError> {
        let current = self
            .graph
            .atom(id)
            .cloned()
            .ok_or_else(|| GraphError::AtomNotFound(id.clone()))?;
        self.index.remove(&current);
        self.graph.set_position(id, position)?;
        self.index.insert(Atom { position, ..current });
        Ok(())
    }

    /// Removes an atom and its bonds.
    pub fn remove_atom(&mut self, id: &AtomId) -> Result<(Atom, Vec<Bond>), EngineError> {
        let (atom, bonds) = self.graph.remove_atom(id)?;
        self.index.remove(&atom);
        debug!(atom = %atom.id, bonds = bonds.len(), "Removed atom.");
        Ok((atom, bonds))
    }

    pub fn add_bond(&mut self, bond: Bond) -> Result<(), EngineError> {
        Ok(self.graph.add_bond(bond)?)
    }

    pub fn remove_bond(&mut self, id: &BondId) -> Result<Bond, EngineError> {
        Ok(self.graph.remove_bond(id)?)
    }

    pub fn set_bond_type(&mut self, id: &BondId, bond_type: BondType) -> Result<(), EngineError> {
        Ok(self.graph.set_bond_type(id, bond_type)?)
    }

    /// Deletes the bonds of `moved` that are now at least `threshold` long.
    ///
    /// # Return
    ///
    /// The deleted bonds, in graph order.
    pub fn prune_stretched_bonds(
        &mut self,
        moved: &AtomId,
        threshold: f64,
    ) -> Result<Vec<Bond>, EngineError> {
        if !self.graph.contains_atom(moved) {
            return Err(GraphError::AtomNotFound(moved.clone()).into());
        }
        let kept: HashSet<BondId> = bonding::prune_stretched_bonds(
            moved,
            self.graph.atoms(),
            self.graph.bonds(),
            threshold,
        )
        .into_iter()
        .map(|b| b.id)
        .collect();
        let stale: Vec<BondId> = self
            .graph
            .bonds()
            .iter()
            .filter(|b| !kept.contains(&b.id))
            .map(|b| b.id.clone())
            .collect();

        let mut removed = Vec::with_capacity(stale.len());
        for id in &stale {
            removed.push(self.graph.remove_bond(id)?);
        }
        Ok(removed)
    }

    /// Validates the current structure, reusing cached results for unchanged topology.
    pub fn validate(&mut self) -> ValidationResult {
        self.validator.validate(self.graph.atoms(), self.graph.bonds())
    }

    /// Proposes hydrogens for every under-bonded atom without changing the session.
    ///
    /// Apply the proposal with [`EditSession::commit_completion`].
    pub fn complete_hydrogens(&mut self) -> Completion {
        let mut environment = self.index.clone();
        complete_with(
            self.graph.atoms(),
            self.graph.bonds(),
            &mut self.placer,
            &mut environment,
        )
    }

    /// Adds a completion to the graph and the index, all or nothing.
    #[instrument(skip_all, name = "commit_completion")]
    pub fn commit_completion(&mut self, completion: Completion) -> Result<(), EngineError> {
        let Completion { atoms, bonds } = completion;
        self.graph.merge(atoms.clone(), bonds)?;
        let added = atoms.len();
        for atom in atoms {
            self.index.insert(atom);
        }
        info!(atoms = added, "Committed hydrogen completion.");
        Ok(())
    }

    /// Suggests a position for a new `element` atom bonded to `reference`.
    ///
    /// The direction avoids the reference atom's existing bonds and any indexed atom the
    /// bond would point through. The distance is the sum of covalent radii, or the
    /// configured default bond length when either radius is unknown.
    pub fn place_new_atom(
        &mut self,
        reference: &AtomId,
        element: &str,
    ) -> Result<Point3<f64>, EngineError> {
        let anchor = self
            .graph
            .atom(reference)
            .ok_or_else(|| GraphError::AtomNotFound(reference.clone()))?;

        let existing: Vec<Unit<Vector3<f64>>> = self
            .graph
            .neighbors(reference)
            .filter_map(|n| Unit::try_new(n.position - anchor.position, 1e-9))
            .collect();
        let bond_length = elements::bond_length(&anchor.element, element)
            .unwrap_or(self.config.placement.default_bond_length);

        let position = self
            .placer
            .place(&anchor.position, &existing, &self.index, bond_length);
        debug!(reference = %reference, element, "Placed new atom.");
        Ok(position)
    }

    /// All pairs of atoms within `max_distance`, sorted by identifier pair.
    pub fn nearby_pairs(&self, max_distance: f64) -> Vec<NearbyPair<'_>> {
        tasks::nearby_pairs::run(&self.index, max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spatial::SpatialQuery;
    use crate::core::utils::geometry::{angle_between, vsepr_directions};
    use crate::engine::report::WarningKind;

    fn session() -> EditSession {
        EditSession::new(EngineConfig::default()).unwrap()
    }

    fn ethane_fragment() -> EditSession {
        let atoms = vec![
            Atom::new("c1", "C", Point3::origin()),
            Atom::new("c2", "C", Point3::new(1.54, 0.0, 0.0)),
        ];
        let bonds = vec![Bond::new("cc", "c1", "c2", BondType::Single)];
        EditSession::from_parts(atoms, bonds, EngineConfig::default()).unwrap()
    }

    #[test]
    fn moved_atoms_are_found_only_at_their_new_position() {
        let mut session = session();
        session
            .add_atom(Atom::new("a", "C", Point3::new(1.0, 1.0, 1.0)))
            .unwrap();
        let target = Point3::new(9.0, -4.0, 2.5);
        session.move_atom(&AtomId::from("a"), target).unwrap();

        assert!(session.index().query_radius(&Point3::new(1.0, 1.0, 1.0), 0.5).is_empty());
        let found = session.index().query_radius(&target, 0.1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].position, target);
        assert_eq!(session.graph().atom(&AtomId::from("a")).unwrap().position, target);
        assert_eq!(session.index().len(), 1);
    }

    #[test]
    fn edits_on_unknown_atoms_are_rejected() {
        let mut session = session();
        let err = session
            .move_atom(&AtomId::from("ghost"), Point3::origin())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Graph {
                source: GraphError::AtomNotFound(_)
            }
        ));
        assert!(session.add_bond(Bond::new("b", "x", "y", BondType::Single)).is_err());
        assert!(session.place_new_atom(&AtomId::from("ghost"), "H").is_err());
    }

    #[test]
    fn removing_an_atom_drops_it_from_graph_and_index() {
        let mut session = ethane_fragment();
        let (atom, bonds) = session.remove_atom(&AtomId::from("c2")).unwrap();
        assert_eq!(atom.id.as_str(), "c2");
        assert_eq!(bonds.len(), 1);
        assert_eq!(session.graph().bond_count(), 0);
        assert_eq!(session.index().len(), 1);
        assert!(session.nearby_pairs(5.0).is_empty());
    }

    #[test]
    fn completion_is_a_proposal_until_committed() {
        let mut session = session();
        session.add_atom(Atom::new("c", "C", Point3::origin())).unwrap();

        let completion = session.complete_hydrogens();
        assert_eq!(completion.len(), 4);
        assert_eq!(session.graph().atom_count(), 1);
        assert_eq!(session.index().len(), 1);

        session.commit_completion(completion).unwrap();
        assert_eq!(session.graph().atom_count(), 5);
        assert_eq!(session.index().len(), 5);

        let result = session.validate();
        assert!(result.is_valid, "{:?}", result.warnings);
        assert!(!result.has_warning(WarningKind::IncompleteOctet));
        assert!(session.complete_hydrogens().is_empty());
    }

    #[test]
    fn validation_results_are_cached_across_moves() {
        let mut session = ethane_fragment();
        let first = session.validate();
        session
            .move_atom(&AtomId::from("c2"), Point3::new(1.6, 0.1, 0.0))
            .unwrap();
        let second = session.validate();
        assert_eq!(first, second);
        assert_eq!(session.validator.cached_results(), 1);

        session
            .set_bond_type(&BondId::from("cc"), BondType::Triple)
            .unwrap();
        let third = session.validate();
        assert_ne!(third, first);
        assert_eq!(session.validator.cached_results(), 2);
    }

    #[test]
    fn new_atom_completes_a_tetrahedron() {
        let mut session = session();
        session.add_atom(Atom::new("c", "C", Point3::origin())).unwrap();
        let length = elements::bond_length("C", "H").unwrap();
        let directions = vsepr_directions(4);
        for (i, d) in directions.iter().take(3).enumerate() {
            let id = format!("h{i}");
            session
                .add_atom(Atom::new(
                    id.as_str(),
                    "H",
                    Point3::origin() + d.into_inner() * length,
                ))
                .unwrap();
            session
                .add_bond(Bond::new(format!("b{i}"), "c", id.as_str(), BondType::Single))
                .unwrap();
        }

        let placed = session.place_new_atom(&AtomId::from("c"), "H").unwrap();
        let offset = placed - Point3::origin();
        assert!((offset.norm() - length).abs() < 1e-9);
        for d in directions.iter().take(3) {
            assert!(angle_between(&offset, d).to_degrees() > 90.0);
        }
    }

    #[test]
    fn unknown_elements_fall_back_to_the_default_bond_length() {
        let mut session = session();
        session.add_atom(Atom::new("x", "Xx", Point3::origin())).unwrap();
        let placed = session.place_new_atom(&AtomId::from("x"), "H").unwrap();
        let expected = session.config().placement.default_bond_length;
        assert!(((placed - Point3::origin()).norm() - expected).abs() < 1e-9);
    }

    #[test]
    fn stretched_bonds_are_pruned_after_a_move() {
        let mut session = ethane_fragment();
        session
            .move_atom(&AtomId::from("c2"), Point3::new(6.0, 0.0, 0.0))
            .unwrap();
        let removed = session
            .prune_stretched_bonds(&AtomId::from("c2"), bonding::DEFAULT_BOND_THRESHOLD)
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id.as_str(), "cc");
        assert_eq!(session.graph().bond_count(), 0);
    }

    #[test]
    fn nearby_pairs_track_the_index() {
        let mut session = ethane_fragment();
        let pairs = session.nearby_pairs(2.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].atom1.id.as_str(), "c1");
        assert!((pairs[0].distance - 1.54).abs() < 1e-12);

        session
            .move_atom(&AtomId::from("c1"), Point3::new(-3.0, 0.0, 0.0))
            .unwrap();
        assert!(session.nearby_pairs(2.0).is_empty());
    }
}
