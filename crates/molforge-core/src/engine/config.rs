use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CELL_SIZE: f64 = 2.0;
pub const DEFAULT_CANDIDATE_COUNT: usize = 32;
pub const DEFAULT_RELAXATION_ITERATIONS: usize = 10;
pub const DEFAULT_STERIC_CUTOFF: f64 = 5.0;
pub const DEFAULT_STERIC_COSINE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_BOND_LENGTH: f64 = 1.0;
pub const DEFAULT_RANDOM_SAMPLES: usize = 64;
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// How candidate directions are generated when placing a new bonded atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPolicy {
    /// A fixed Fibonacci lattice; identical input always yields the identical position.
    #[default]
    Deterministic,
    /// Uniformly sampled unit vectors. A fixed seed makes the sequence reproducible;
    /// `None` draws the seed from entropy.
    Randomized { samples: usize, seed: Option<u64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialConfig {
    pub cell_size: f64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    pub policy: PlacementPolicy,
    pub candidate_count: usize,
    pub relaxation_iterations: usize,
    pub steric_cutoff: f64,
    pub steric_cosine_threshold: f64,
    /// Used when the covalent radius of either partner is unknown.
    pub default_bond_length: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            policy: PlacementPolicy::Deterministic,
            candidate_count: DEFAULT_CANDIDATE_COUNT,
            relaxation_iterations: DEFAULT_RELAXATION_ITERATIONS,
            steric_cutoff: DEFAULT_STERIC_CUTOFF,
            steric_cosine_threshold: DEFAULT_STERIC_COSINE_THRESHOLD,
            default_bond_length: DEFAULT_BOND_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Maximum number of memoized results; `0` disables caching.
    pub cache_capacity: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub spatial: SpatialConfig,
    pub placement: PlacementConfig,
    pub validation: ValidationConfig,
}

impl EngineConfig {
    /// Loads a configuration file, filling unspecified keys with defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        Ok(ConfigFile::load(path)?.apply(EngineConfigBuilder::new()).build()?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigLoadError> {
        Ok(ConfigFile::parse(content, "<inline>")?
            .apply(EngineConfigBuilder::new())
            .build()?)
    }
}

#[derive(Default, Debug, Clone)]
pub struct EngineConfigBuilder {
    cell_size: Option<f64>,
    policy: Option<PlacementPolicy>,
    candidate_count: Option<usize>,
    relaxation_iterations: Option<usize>,
    steric_cutoff: Option<f64>,
    steric_cosine_threshold: Option<f64>,
    default_bond_length: Option<f64>,
    cache_capacity: Option<usize>,
}

fn invalid(parameter: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        parameter,
        reason: reason.into(),
    }
}

fn positive_finite(parameter: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(
            parameter,
            format!("must be a positive finite number, got {value}"),
        ))
    }
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell_size(mut self, size: f64) -> Self {
        self.cell_size = Some(size);
        self
    }
    pub fn policy(mut self, policy: PlacementPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
    pub fn candidate_count(mut self, count: usize) -> Self {
        self.candidate_count = Some(count);
        self
    }
    pub fn relaxation_iterations(mut self, iterations: usize) -> Self {
        self.relaxation_iterations = Some(iterations);
        self
    }
    pub fn steric_cutoff(mut self, cutoff: f64) -> Self {
        self.steric_cutoff = Some(cutoff);
        self
    }
    pub fn steric_cosine_threshold(mut self, threshold: f64) -> Self {
        self.steric_cosine_threshold = Some(threshold);
        self
    }
    pub fn default_bond_length(mut self, length: f64) -> Self {
        self.default_bond_length = Some(length);
        self
    }
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let spatial = SpatialConfig {
            cell_size: positive_finite("cell_size", self.cell_size.unwrap_or(DEFAULT_CELL_SIZE))?,
        };

        let policy = self.policy.unwrap_or_default();
        if let PlacementPolicy::Randomized { samples: 0, .. } = policy {
            return Err(invalid("samples", "randomized placement needs at least one sample"));
        }
        let candidate_count = self.candidate_count.unwrap_or(DEFAULT_CANDIDATE_COUNT);
        if candidate_count == 0 {
            return Err(invalid("candidate_count", "must be at least 1"));
        }
        let steric_cutoff = self.steric_cutoff.unwrap_or(DEFAULT_STERIC_CUTOFF);
        if !(steric_cutoff.is_finite() && steric_cutoff >= 0.0) {
            return Err(invalid(
                "steric_cutoff",
                format!("must be a non-negative finite number, got {steric_cutoff}"),
            ));
        }
        let steric_cosine_threshold = self
            .steric_cosine_threshold
            .unwrap_or(DEFAULT_STERIC_COSINE_THRESHOLD);
        if !(-1.0..1.0).contains(&steric_cosine_threshold) {
            return Err(invalid(
                "steric_cosine_threshold",
                format!("must lie in [-1, 1), got {steric_cosine_threshold}"),
            ));
        }

        let placement = PlacementConfig {
            policy,
            candidate_count,
            relaxation_iterations: self
                .relaxation_iterations
                .unwrap_or(DEFAULT_RELAXATION_ITERATIONS),
            steric_cutoff,
            steric_cosine_threshold,
            default_bond_length: positive_finite(
                "default_bond_length",
                self.default_bond_length.unwrap_or(DEFAULT_BOND_LENGTH),
            )?,
        };

        Ok(EngineConfig {
            spatial,
            placement,
            validation: ValidationConfig {
                cache_capacity: self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
            },
        })
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SpatialSection {
    pub cell_size: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    Deterministic,
    Randomized,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PlacementSection {
    pub policy: Option<PolicyKind>,
    pub samples: Option<usize>,
    pub seed: Option<u64>,
    pub candidate_count: Option<usize>,
    pub relaxation_iterations: Option<usize>,
    pub steric_cutoff: Option<f64>,
    pub steric_cosine_threshold: Option<f64>,
    pub default_bond_length: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ValidationSection {
    pub cache_capacity: Option<usize>,
}

/// The on-disk TOML form of [`EngineConfig`]; every key is optional.
///
/// ```toml
/// [spatial]
/// cell-size = 2.0
///
/// [placement]
/// policy = "randomized"
/// samples = 64
/// seed = 7
///
/// [validation]
/// cache-capacity = 128
/// ```
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub spatial: Option<SpatialSection>,
    pub placement: Option<PlacementSection>,
    pub validation: Option<ValidationSection>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        debug!("Loading engine configuration from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigLoadError> {
        toml::from_str(content).map_err(|e| ConfigLoadError::Toml {
            path: origin.to_string(),
            source: e,
        })
    }

    /// Copies every key present in the file onto `builder`.
    ///
    /// `samples` and `seed` only configure the randomized policy; without
    /// `policy = "randomized"` they are ignored with a warning.
    pub fn apply(self, mut builder: EngineConfigBuilder) -> EngineConfigBuilder {
        if let Some(size) = self.spatial.and_then(|s| s.cell_size) {
            builder = builder.cell_size(size);
        }
        if let Some(placement) = self.placement {
            match placement.policy {
                Some(PolicyKind::Randomized) => {
                    builder = builder.policy(PlacementPolicy::Randomized {
                        samples: placement.samples.unwrap_or(DEFAULT_RANDOM_SAMPLES),
                        seed: placement.seed,
                    });
                }
                Some(PolicyKind::Deterministic) | None => {
                    if placement.samples.is_some() || placement.seed.is_some() {
                        warn!(
                            samples = ?placement.samples,
                            seed = ?placement.seed,
                            "Ignoring randomized placement settings without policy = \"randomized\""
                        );
                    }
                    if placement.policy.is_some() {
                        builder = builder.policy(PlacementPolicy::Deterministic);
                    }
                }
            }
            if let Some(count) = placement.candidate_count {
                builder = builder.candidate_count(count);
            }
            if let Some(iterations) = placement.relaxation_iterations {
                builder = builder.relaxation_iterations(iterations);
            }
            if let Some(cutoff) = placement.steric_cutoff {
                builder = builder.steric_cutoff(cutoff);
            }
            if let Some(threshold) = placement.steric_cosine_threshold {
                builder = builder.steric_cosine_threshold(threshold);
            }
            if let Some(length) = placement.default_bond_length {
                builder = builder.default_bond_length(length);
            }
        }
        if let Some(capacity) = self.validation.and_then(|v| v.cache_capacity) {
            builder = builder.cache_capacity(capacity);
        }
        builder
    }
}
