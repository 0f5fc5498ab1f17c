//! Error types for the fallible parts of the crate.
//!
//! Driving a behavior never fails: malformed transitions degrade to
//! `Continue` and binding mismatches are logged and ignored. Only loading and
//! validating a [`BehaviorConfig`](crate::BehaviorConfig) can report errors.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read behavior config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "serde")]
    #[error("failed to parse behavior config")]
    Parse(#[from] ron::error::SpannedError),

    #[error("behavior name must not be empty")]
    EmptyName,

    #[error("behavior name is {len} bytes long, limit is {max}")]
    NameTooLong { len: usize, max: usize },
}
