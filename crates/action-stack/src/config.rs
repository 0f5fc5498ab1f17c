//! Behavior configuration and loaders.
use std::env;

use crate::error::{ConfigError, Result};

/// Longest accepted behavior name, in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// How a behavior resolves the actor it drives.
///
/// Hooks always receive the actor the host passes to the current call. The
/// binding decides what happens when that actor is not the one the behavior
/// was started with (for example because the entity was destroyed and
/// recreated between calls).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActorBinding {
    /// Resolve the actor from every call. A different actor rebinds the
    /// behavior, and `reset` ends the old stack against the actor passed in.
    #[default]
    Live,
    /// Bind to the first actor the behavior is driven with. Calls made with
    /// any other actor are refused; `reset` with another actor discards the
    /// old stack without running its hooks and binds the new one.
    Cached,
}

/// Configuration shared by a behavior and its transition engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BehaviorConfig {
    /// Display name of the behavior, used in logs.
    pub name: String,
    pub actor_binding: ActorBinding,
    /// Emit a debug-level record for every applied transition.
    pub log_transitions: bool,
    /// Maximum length of [`BehaviorRoot::debug_string`](crate::BehaviorRoot::debug_string).
    pub debug_string_limit: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            name: "behavior".to_owned(),
            actor_binding: ActorBinding::Live,
            log_transitions: true,
            debug_string_limit: 256,
        }
    }
}

impl BehaviorConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_binding(mut self, binding: ActorBinding) -> Self {
        self.actor_binding = binding;
        self
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BEHAVIOR_NAME` - Display name (default: "behavior")
    /// - `BEHAVIOR_ACTOR_BINDING` - `live` or `cached` (default: live)
    /// - `BEHAVIOR_LOG_TRANSITIONS` - Log every transition (default: true)
    /// - `BEHAVIOR_DEBUG_LIMIT` - Debug string length limit (default: 256)
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = env::var("BEHAVIOR_NAME") {
            config.name = name;
        }
        if let Some(binding) = read_env::<ActorBinding>("BEHAVIOR_ACTOR_BINDING") {
            config.actor_binding = binding;
        }
        if let Some(enable) = read_env::<bool>("BEHAVIOR_LOG_TRANSITIONS") {
            config.log_transitions = enable;
        }
        if let Some(limit) = read_env::<usize>("BEHAVIOR_DEBUG_LIMIT") {
            config.debug_string_limit = limit.max(1);
        }

        config
    }

    /// Parses a RON document, e.g. `(name: "guard", actor_binding: cached)`.
    #[cfg(feature = "serde")]
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a RON config file.
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(ConfigError::NameTooLong {
                len: self.name.len(),
                max: MAX_NAME_LEN,
            });
        }
        Ok(())
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
