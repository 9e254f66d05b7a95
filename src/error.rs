//! Error types for the simulator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "group {group}: placed {placed} of {requested} particles before {attempts} \
         consecutive overlapping draws; the sphere is too small for this count and particle radius"
    )]
    SeedingDensity {
        group: usize,
        placed: usize,
        requested: usize,
        attempts: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SimError>;
