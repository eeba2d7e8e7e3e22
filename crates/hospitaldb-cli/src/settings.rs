use std::path::Path;

use hospitaldb_core::{ExistingRows, PopulateConfig};

use crate::CliError;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub if_populated: Option<ExistingRows>,
}

/// Load population settings from a TOML file, or the defaults when no file
/// is given, then apply command-line overrides.
pub fn load_config(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<PopulateConfig, CliError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => PopulateConfig::default(),
    };

    if let Some(seed) = overrides.seed {
        config.seed = Some(seed);
    }
    if let Some(policy) = overrides.if_populated {
        config.if_populated = policy;
    }

    config.validate()?;
    Ok(config)
}
