use crate::cli::PlaceArgs;
use crate::error::{CliError, Result};
use crate::io;
use molforge::core::models::ids::AtomId;
use molforge::engine::config::EngineConfig;
use molforge::workflows::session::EditSession;
use nalgebra::Point3;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct PlacedAtom<'a> {
    reference: &'a str,
    element: &'a str,
    x: f64,
    y: f64,
    z: f64,
}

pub fn run(args: PlaceArgs, config: &EngineConfig) -> Result<()> {
    if let Some(length) = args.bond_length {
        if !(length.is_finite() && length > 0.0) {
            return Err(CliError::Argument(format!(
                "--bond-length must be a positive number, got {}",
                length
            )));
        }
    }

    let (atoms, bonds) = io::read_molecule(&args.input)?;
    let mut session = EditSession::from_parts(atoms, bonds, config.clone())?;

    let reference = AtomId::from(args.atom.as_str());
    let mut position = session.place_new_atom(&reference, &args.element)?;
    if let (Some(length), Some(anchor)) = (args.bond_length, session.graph().atom(&reference)) {
        position = at_distance(&anchor.position, &position, length);
    }
    info!(
        "Placed {} bonded to '{}' at ({:.4}, {:.4}, {:.4}).",
        args.element, args.atom, position.x, position.y, position.z
    );

    if args.json {
        let placed = PlacedAtom {
            reference: &args.atom,
            element: &args.element,
            x: position.x,
            y: position.y,
            z: position.z,
        };
        println!("{}", serde_json::to_string_pretty(&placed)?);
    } else {
        println!("{:.4}\t{:.4}\t{:.4}", position.x, position.y, position.z);
    }
    Ok(())
}

/// Moves `point` along the ray from `anchor` so it sits exactly `length` away.
fn at_distance(anchor: &Point3<f64>, point: &Point3<f64>, length: f64) -> Point3<f64> {
    anchor + (point - anchor).normalize() * length
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_length_override_keeps_the_direction() {
        let anchor = Point3::new(1.0, 1.0, 1.0);
        let placed = Point3::new(1.0, 1.0, 2.09);
        let scaled = at_distance(&anchor, &placed, 1.5);
        assert!((scaled - Point3::new(1.0, 1.0, 2.5)).norm() < 1e-12);
    }
}
