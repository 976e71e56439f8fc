use std::path::Path;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use retention::RetentionConfig;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "retainer.toml";

/// Prefix for environment overrides, e.g. `RETAINER__DRIVER__DRY_RUN=true`.
pub const ENV_PREFIX: &str = "RETAINER__";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Dry-run mode: log retention decisions without mutating blocks.
    ///
    /// Env: RETAINER__DRIVER__DRY_RUN
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Base retention period and override tiers
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Bucket pass behaviour
    #[serde(default)]
    pub driver: DriverConfig,
}

impl Configuration {
    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from_path(DEFAULT_CONFIG_FILE)
    }

    /// Load defaults, then the TOML file at `path` if it exists, then
    /// environment overrides.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        let config = Self::figment(path.as_ref())
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}
