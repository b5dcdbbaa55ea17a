use nalgebra::{Unit, Vector3};
use rand::Rng;
use std::f64::consts::{PI, TAU};

/// Golden angle in radians, `π(3 − √5)`.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// `n` quasi-uniform unit vectors on a Fibonacci lattice.
///
/// The sequence is fully deterministic and walks from the north pole (`+y`) to the south
/// pole, so the first vector is always close to `+y`.
pub fn fibonacci_sphere(n: usize) -> Vec<Unit<Vector3<f64>>> {
    (0..n)
        .map(|i| {
            let y = 1.0 - (2.0 * i as f64 + 1.0) / n as f64;
            let radius = (1.0 - y * y).max(0.0).sqrt();
            let theta = GOLDEN_ANGLE * i as f64;
            Unit::new_normalize(Vector3::new(theta.cos() * radius, y, theta.sin() * radius))
        })
        .collect()
}

/// A unit vector drawn uniformly from the sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Unit<Vector3<f64>> {
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let phi: f64 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Unit::new_normalize(Vector3::new(r * phi.cos(), r * phi.sin(), z))
}

/// Angle between two vectors in radians; `0` if either is zero-length.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// `sides` evenly spaced directions in the xy-plane, starting at `−y`.
pub fn regular_polygon_directions(sides: usize) -> Vec<Unit<Vector3<f64>>> {
    let step = TAU / sides as f64;
    (0..sides)
        .map(|i| {
            let angle = -PI / 2.0 + step * i as f64;
            Unit::new_normalize(Vector3::new(angle.cos(), angle.sin(), 0.0))
        })
        .collect()
}

fn ring_around_y(count: usize, offset: f64, height: f64) -> impl Iterator<Item = Vector3<f64>> {
    (0..count).map(move |i| {
        let angle = offset + TAU * i as f64 / count as f64;
        Vector3::new(angle.cos(), height, angle.sin())
    })
}

/// Ideal electron-domain directions for a central atom with `domains` electron domains.
///
/// | domains | geometry |
/// |---------|----------|
/// | 2 | linear |
/// | 3 | trigonal planar |
/// | 4 | tetrahedral |
/// | 5 | trigonal bipyramidal |
/// | 6 | octahedral |
/// | 7 | pentagonal bipyramidal |
/// | 8 | square antiprismatic |
///
/// Other counts fall back to [`regular_polygon_directions`].
pub fn vsepr_directions(domains: usize) -> Vec<Unit<Vector3<f64>>> {
    let raw: Vec<Vector3<f64>> = match domains {
        2 => vec![Vector3::x(), -Vector3::x()],
        3 => return regular_polygon_directions(3),
        4 => vec![
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(1.0, -1.0, -1.0),
            Vector3::new(-1.0, 1.0, -1.0),
            Vector3::new(-1.0, -1.0, 1.0),
        ],
        5 => [Vector3::y(), -Vector3::y()]
            .into_iter()
            .chain(ring_around_y(3, 0.0, 0.0))
            .collect(),
        6 => vec![
            Vector3::x(),
            -Vector3::x(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::z(),
            -Vector3::z(),
        ],
        7 => [Vector3::y(), -Vector3::y()]
            .into_iter()
            .chain(ring_around_y(5, 0.0, 0.0))
            .collect(),
        8 => ring_around_y(4, 0.0, 0.7)
            .chain(ring_around_y(4, PI / 4.0, -0.7))
            .collect(),
        _ => return regular_polygon_directions(domains),
    };
    raw.into_iter().map(Unit::new_normalize).collect()
}
