use crate::cli::PairsArgs;
use crate::error::{CliError, Result};
use crate::io;
use molforge::core::spatial::NearbyPair;
use molforge::core::spatial::grid::SpatialHash;
use molforge::engine::config::EngineConfig;
use molforge::engine::error::EngineError;
use molforge::engine::tasks::nearby_pairs;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize, PartialEq)]
struct PairRecord<'a> {
    atom1: &'a str,
    atom2: &'a str,
    distance: f64,
}

impl<'a> From<&NearbyPair<'a>> for PairRecord<'a> {
    fn from(pair: &NearbyPair<'a>) -> Self {
        Self {
            atom1: pair.atom1.id.as_str(),
            atom2: pair.atom2.id.as_str(),
            distance: pair.distance,
        }
    }
}

pub fn run(args: PairsArgs, config: &EngineConfig) -> Result<()> {
    if !(args.max_distance.is_finite() && args.max_distance >= 0.0) {
        return Err(CliError::Argument(format!(
            "--max-distance must be a non-negative number, got {}",
            args.max_distance
        )));
    }
    let (atoms, _) = io::read_molecule(&args.input)?;
    let index =
        SpatialHash::from_atoms(&atoms, config.spatial.cell_size).map_err(EngineError::from)?;

    let pairs = nearby_pairs::run(&index, args.max_distance);
    info!("Found {} pair(s) within {} A.", pairs.len(), args.max_distance);

    let records: Vec<PairRecord<'_>> = pairs.iter().map(PairRecord::from).collect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}\t{}\t{:.4}", record.atom1, record.atom2, record.distance);
        }
    }
    Ok(())
}
