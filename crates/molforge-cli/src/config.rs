use crate::cli::EngineArgs;
use crate::error::{CliError, Result};
use molforge::engine::config::{
    ConfigFile, DEFAULT_RANDOM_SAMPLES, EngineConfig, EngineConfigBuilder, PlacementPolicy,
    PolicyKind,
};
use molforge::engine::error::EngineError;
use std::str::FromStr;
use tracing::debug;

/// Resolves the engine configuration from the config file, `--set` overrides and flags,
/// in increasing order of precedence.
pub fn build_engine_config(args: &EngineArgs) -> Result<EngineConfig> {
    let mut file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    apply_set_values(&mut file, &args.set_values)?;

    let samples = file
        .placement
        .as_ref()
        .and_then(|p| p.samples)
        .unwrap_or(DEFAULT_RANDOM_SAMPLES);
    let mut builder = file.apply(EngineConfigBuilder::new());

    if let Some(size) = args.cell_size {
        builder = builder.cell_size(size);
    }
    if let Some(seed) = args.seed {
        builder = builder.policy(PlacementPolicy::Randomized {
            samples,
            seed: Some(seed),
        });
    }

    let config = builder.build().map_err(EngineError::from)?;
    debug!("Resolved engine configuration: {:?}", config);
    Ok(config)
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}

fn apply_set_values(file: &mut ConfigFile, set_values: &[String]) -> Result<()> {
    for kv_pair in set_values {
        let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            "spatial.cell-size" => {
                file.spatial.get_or_insert_with(Default::default).cell_size =
                    Some(parse_value(key, value)?);
            }
            "placement.policy" => {
                let policy = match value {
                    "deterministic" => PolicyKind::Deterministic,
                    "randomized" => PolicyKind::Randomized,
                    other => {
                        return Err(CliError::Config(format!(
                            "Unknown placement policy '{}'. Expected 'deterministic' or 'randomized'.",
                            other
                        )));
                    }
                };
                file.placement.get_or_insert_with(Default::default).policy = Some(policy);
            }
            "placement.samples" => {
                file.placement.get_or_insert_with(Default::default).samples =
                    Some(parse_value(key, value)?);
            }
            "placement.seed" => {
                file.placement.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value)?);
            }
            "placement.candidate-count" => {
                file.placement
                    .get_or_insert_with(Default::default)
                    .candidate_count = Some(parse_value(key, value)?);
            }
            "placement.relaxation-iterations" => {
                file.placement
                    .get_or_insert_with(Default::default)
                    .relaxation_iterations = Some(parse_value(key, value)?);
            }
            "placement.steric-cutoff" => {
                file.placement
                    .get_or_insert_with(Default::default)
                    .steric_cutoff = Some(parse_value(key, value)?);
            }
            "placement.steric-cosine-threshold" => {
                file.placement
                    .get_or_insert_with(Default::default)
                    .steric_cosine_threshold = Some(parse_value(key, value)?);
            }
            "placement.default-bond-length" => {
                file.placement
                    .get_or_insert_with(Default::default)
                    .default_bond_length = Some(parse_value(key, value)?);
            }
            "validation.cache-capacity" => {
                file.validation
                    .get_or_insert_with(Default::default)
                    .cache_capacity = Some(parse_value(key, value)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(())
}
