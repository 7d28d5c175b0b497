//! Config loader: assembles defaults, files and environment into a FixityConfig.

use crate::config::merge::merge_policy;
use crate::config::sources::{global_file, local_file};
use crate::config::FixityConfig;
use config::{ConfigError, Environment, File};
use std::path::Path;
use tracing::debug;

/// Prefix for environment overrides, e.g. `FIXITY__FIXITY_THREADS=8`.
const ENV_PREFIX: &str = "FIXITY";
const ENV_SEPARATOR: &str = "__";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with precedence (highest first): environment, local
    /// `config/` files under `base_dir`, global file, defaults.
    pub fn load(base_dir: &Path) -> Result<FixityConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = local_file::add_to_builder(builder, base_dir)?;
        let config: FixityConfig = builder.add_source(env_source()).build()?.try_deserialize()?;
        debug!(
            file_systems = config.file_systems.len(),
            fixity_threads = config.fixity_threads,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load an explicit configuration file; environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<FixityConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Configuration from defaults alone
    pub fn default_config() -> FixityConfig {
        FixityConfig::default()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
