use std::fmt;

use thiserror::Error;

/// Which capability call a control failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Shard,
    Update,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Shard => "shard",
            Stage::Update => "update",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("control '{control}' failed during {stage}: {source}")]
pub struct ControlFailure {
    pub control: String,
    pub stage: Stage,
    #[source]
    pub source: anyhow::Error,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher is already initialized")]
    AlreadyInitialized,
    #[error("dispatcher has not been initialized")]
    NotInitialized,
    #[error("control '{name}' is already registered")]
    DuplicateControl { name: String },
    #[error(transparent)]
    Control(#[from] ControlFailure),
}

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("failed to serialize value for fingerprinting: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("configuration key '{key}' is not a scalar value")]
    NonScalar { key: String },
}
