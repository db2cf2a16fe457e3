//! Configuration merge system
//!
//! Implements the 4-layer configuration merge:
//! 1. Built-in defaults
//! 2. Studio config (~/.config/nuke-deadline/config.toml)
//! 3. Project config (.deadline/nuke.toml)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
pub use settings::{
    BasicAuth, DeadlineSettings, NukeSettings, SearchReplace, SubmitSettings,
    DEFAULT_PLUGIN_NAME,
};

use std::path::PathBuf;

/// Default project config location, relative to the working directory.
pub const PROJECT_CONFIG_PATH: &str = ".deadline/nuke.toml";

/// Default studio config location under `$HOME`.
pub fn default_studio_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config/nuke-deadline/config.toml"))
}
