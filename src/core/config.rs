use std::fs::{read_to_string, write};
use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};

use serde_derive::{Deserialize, Serialize};

use toml::from_str;

use crate::core::common::{LoggingOptions, LookupOptions, PipelineOptions};

#[derive(Deserialize, Debug, Default, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    pub pipeline_options: PipelineOptions,
    pub lookup_options: LookupOptions,
    pub logging_options: LoggingOptions,
}

impl Config {
    /// `None` when `filename` does not exist. A file that exists but cannot
    /// be read or parsed is an error, never silently replaced by defaults.
    pub fn load(filename: &str) -> Result<Option<Config>> {
        let config = match read_to_string(filename) {
            Ok(config) => config,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Error reading configuration file `{filename}`")),
        };
        let config: Config =
            from_str(&config).with_context(|| format!("Invalid configuration file `{filename}`"))?;
        Ok(Some(config))
    }

    /// Write the default configuration to `filename`.
    /// An existing file is only replaced when `force` is set.
    pub fn generate(filename: &str, force: bool) -> Result<()> {
        if Path::new(filename).exists() && !force {
            bail!("Configuration file `{filename}` already exists. Use `--force` to overwrite it.")
        }
        let config = Config::default();
        let toml_config = toml::to_string(&config)?;
        write(filename, toml_config)?;
        println!("Configuration file `{filename}` created.");
        Ok(())
    }
}
