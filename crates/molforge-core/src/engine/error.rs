use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::graph::GraphError;
use crate::core::spatial::SpatialError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid engine configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Graph edit rejected: {source}")]
    Graph {
        #[from]
        source: GraphError,
    },

    #[error("Spatial index error: {source}")]
    Spatial {
        #[from]
        source: SpatialError,
    },
}
