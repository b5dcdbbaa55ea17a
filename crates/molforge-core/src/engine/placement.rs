use super::config::{PlacementConfig, PlacementPolicy};
use crate::core::spatial::SpatialQuery;
use crate::core::utils::geometry::{fibonacci_sphere, random_unit_vector};
use nalgebra::{Point3, Unit, Vector3};
use rand::{SeedableRng, rngs::StdRng};
use tracing::trace;

const EPSILON: f64 = 1e-9;
/// Fraction of the accumulated force applied per relaxation step.
const RELAXATION_STEP: f64 = 0.1;
/// Upper bound on the force magnitude of one relaxation step.
const MAX_FORCE: f64 = 1.0;

/// Angular-repulsion cost of a candidate direction against the existing bond directions.
pub fn direction_cost(candidate: &Vector3<f64>, existing: &[Unit<Vector3<f64>>]) -> f64 {
    existing
        .iter()
        .map(|v| (1.0 + candidate.dot(&v.into_inner())).powi(4))
        .sum()
}

/// Computes collision-aware directions for new bonded atoms.
///
/// Candidate directions come from the configured [`PlacementPolicy`]. The cheapest candidate
/// against the existing bond directions seeds a short relaxation that pushes the direction
/// away from those bonds and from any environment atom it would point through.
#[derive(Debug, Clone)]
pub struct GeometryPlacer {
    config: PlacementConfig,
    rng: Option<StdRng>,
}

impl GeometryPlacer {
    pub fn new(config: &PlacementConfig) -> Self {
        let rng = match config.policy {
            PlacementPolicy::Deterministic => None,
            PlacementPolicy::Randomized { seed: Some(seed), .. } => Some(StdRng::seed_from_u64(seed)),
            PlacementPolicy::Randomized { seed: None, .. } => Some(StdRng::from_entropy()),
        };
        Self {
            config: config.clone(),
            rng,
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Position of a new atom bonded to `reference` at `bond_length`.
    pub fn place(
        &mut self,
        reference: &Point3<f64>,
        existing: &[Unit<Vector3<f64>>],
        environment: &dyn SpatialQuery,
        bond_length: f64,
    ) -> Point3<f64> {
        let direction = self.direction(reference, existing, environment);
        reference + direction.into_inner() * bond_length
    }

    /// Unit direction for a new bond from `reference`.
    ///
    /// With no existing directions and no environment atoms inside the steric cutoff the
    /// relaxation applies no force, so the deterministic policy returns its first candidate.
    pub fn direction(
        &mut self,
        reference: &Point3<f64>,
        existing: &[Unit<Vector3<f64>>],
        environment: &dyn SpatialQuery,
    ) -> Unit<Vector3<f64>> {
        // --- Phase 1: Candidate generation ---
        let candidates = self.candidates();

        // --- Phase 2: Scoring ---
        let mut best = candidates.first().copied().unwrap_or_else(Vector3::y_axis);
        let mut best_cost = f64::INFINITY;
        for candidate in &candidates {
            let cost = direction_cost(candidate, existing);
            if cost < best_cost {
                best_cost = cost;
                best = *candidate;
            }
        }
        trace!(cost = best_cost, candidates = candidates.len(), "Selected seed direction");

        // --- Phase 3: Relaxation ---
        let obstacles: Vec<(Unit<Vector3<f64>>, f64)> = environment
            .query_radius(reference, self.config.steric_cutoff)
            .into_iter()
            .filter_map(|atom| {
                let offset = atom.position - reference;
                let distance = offset.norm();
                (distance > EPSILON).then(|| (Unit::new_unchecked(offset / distance), distance))
            })
            .collect();

        let mut direction = best;
        for _ in 0..self.config.relaxation_iterations {
            let force = self.relaxation_force(&direction, existing, &obstacles);
            if force.norm_squared() == 0.0 {
                break;
            }
            direction = Unit::new_normalize(direction.into_inner() + force * RELAXATION_STEP);
        }
        direction
    }

    fn candidates(&mut self) -> Vec<Unit<Vector3<f64>>> {
        match (self.config.policy, self.rng.as_mut()) {
            (PlacementPolicy::Randomized { samples, .. }, Some(rng)) => {
                (0..samples).map(|_| random_unit_vector(rng)).collect()
            }
            _ => fibonacci_sphere(self.config.candidate_count),
        }
    }

    fn relaxation_force(
        &self,
        direction: &Unit<Vector3<f64>>,
        existing: &[Unit<Vector3<f64>>],
        obstacles: &[(Unit<Vector3<f64>>, f64)],
    ) -> Vector3<f64> {
        let mut force = Vector3::zeros();

        for v in existing {
            let away = direction.into_inner() - v.into_inner();
            let distance = away.norm();
            if distance > EPSILON {
                force += away / (distance * distance * distance);
            }
        }

        let threshold = self.config.steric_cosine_threshold;
        for (toward, distance) in obstacles {
            let cos = direction.dot(&toward.into_inner());
            if cos > threshold {
                force -= toward.into_inner() * ((cos - threshold) / distance);
            }
        }

        let magnitude = force.norm();
        if magnitude > MAX_FORCE {
            force *= MAX_FORCE / magnitude;
        }
        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::spatial::LinearScan;
    use crate::core::utils::geometry::angle_between;
    use crate::engine::config::EngineConfigBuilder;

    fn deterministic() -> GeometryPlacer {
        GeometryPlacer::new(&PlacementConfig::default())
    }

    fn randomized(seed: u64) -> GeometryPlacer {
        let config = EngineConfigBuilder::new()
            .policy(PlacementPolicy::Randomized {
                samples: 48,
                seed: Some(seed),
            })
            .build()
            .unwrap();
        GeometryPlacer::new(&config.placement)
    }

    #[test]
    fn isolated_atom_is_placed_at_bond_length() {
        let reference = Point3::new(1.0, -2.0, 3.0);
        let mut placer = deterministic();
        let placed = placer.place(&reference, &[], &LinearScan::new(&[]), 1.09);
        assert!(((placed - reference).norm() - 1.09).abs() < 1e-9);
    }

    #[test]
    fn isolated_atom_uses_first_deterministic_candidate() {
        let mut placer = deterministic();
        let direction = placer.direction(&Point3::origin(), &[], &LinearScan::new(&[]));
        assert_eq!(direction, fibonacci_sphere(32)[0]);
    }

    #[test]
    fn single_neighbor_yields_obtuse_angle() {
        let mut placer = deterministic();
        for existing in [Vector3::x(), -Vector3::y(), Vector3::new(1.0, 1.0, -2.0)] {
            let existing = Unit::new_normalize(existing);
            let direction = placer.direction(&Point3::origin(), &[existing], &LinearScan::new(&[]));
            assert!((direction.norm() - 1.0).abs() < 1e-9);
            assert!(angle_between(&direction, &existing).to_degrees() >= 90.0);
        }
    }

    #[test]
    fn deterministic_policy_is_reproducible() {
        let existing = [Unit::new_normalize(Vector3::new(0.3, 0.9, 0.1))];
        let environment = vec![Atom::new("n", "N", Point3::new(0.0, -1.4, 0.2))];
        let a = deterministic().direction(&Point3::origin(), &existing, &LinearScan::new(&environment));
        let b = deterministic().direction(&Point3::origin(), &existing, &LinearScan::new(&environment));
        assert_eq!(a, b);
    }

    #[test]
    fn seeded_randomized_policy_is_reproducible() {
        let existing = [Unit::new_normalize(Vector3::z())];
        let env = LinearScan::new(&[]);
        let mut first = randomized(11);
        let mut second = randomized(11);
        for _ in 0..3 {
            let a = first.direction(&Point3::origin(), &existing, &env);
            let b = second.direction(&Point3::origin(), &existing, &env);
            assert_eq!(a, b);
            assert!((a.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn obstacles_push_the_direction_away() {
        let baseline = fibonacci_sphere(32)[0];
        let toward = Unit::new_normalize(baseline.into_inner() + Vector3::z() * 0.2);
        let environment = vec![
            Atom::new("self", "C", Point3::origin()),
            Atom::new("x", "C", Point3::origin() + toward.into_inner() * 1.5),
        ];

        let mut placer = deterministic();
        let direction =
            placer.direction(&Point3::origin(), &[], &LinearScan::new(&environment));
        let before = baseline.dot(&toward.into_inner());
        let after = direction.dot(&toward.into_inner());
        assert!(after < before - 1e-6, "{after} !< {before}");
    }

    #[test]
    fn obstacles_beyond_the_cutoff_are_ignored() {
        let baseline = fibonacci_sphere(32)[0];
        let environment = vec![Atom::new("far", "C", Point3::origin() + baseline.into_inner() * 6.0)];
        let mut placer = deterministic();
        let direction =
            placer.direction(&Point3::origin(), &[], &LinearScan::new(&environment));
        assert_eq!(direction, baseline);
    }

    #[test]
    fn cost_penalizes_directions_near_existing_bonds() {
        let existing = [Unit::new_normalize(Vector3::x())];
        assert!(direction_cost(&Vector3::x(), &existing) > direction_cost(&-Vector3::x(), &existing));
        assert_eq!(direction_cost(&Vector3::x(), &[]), 0.0);
    }
}
