use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::path::PathBuf;

use config::{Config, Environment, File};
use eyre::{Context, Result};
use serde::Deserialize;

/// Load a settings object from the config locations.
/// Further documentation can be found in the `settings` module.
pub(crate) fn load_settings_object<'de, T, S>(agent_prefix: &str, ignore_prefixes: &[S]) -> Result<T>
where
    T: Deserialize<'de>,
    S: AsRef<str>,
{
    // Derive additional prefix from agent name
    let prefix = format!("FW_{}", agent_prefix).to_ascii_uppercase();

    let filtered_env: HashMap<String, String> = env::vars()
        .filter(|(k, _v)| {
            !ignore_prefixes
                .iter()
                .any(|prefix| k.starts_with(prefix.as_ref()))
        })
        .collect();

    let mut base_config_sources = vec![];
    let mut builder = Config::builder();

    // Load the default config files (`./config/*.json`) when the directory
    // is present
    if let Ok(entries) = PathBuf::from("./config").read_dir() {
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                base_config_sources.push(format!("{:?}", path));
                builder = builder.add_source(File::from(path));
            }
        }
    }

    // Load a set of additional user specified config files
    let config_file_paths: Vec<String> = env::var("CONFIG_FILES")
        .map(|s| s.split(',').map(|s| s.to_string()).collect())
        .unwrap_or_default();

    let builder = config_file_paths.iter().fold(builder, |builder, path| {
        builder.add_source(File::with_name(path))
    });

    let config_deserializer = builder
        // Use a base configuration env variable prefix
        .add_source(
            Environment::with_prefix("FW_BASE")
                .separator("_")
                .source(Some(filtered_env.clone())),
        )
        .add_source(
            Environment::with_prefix(&prefix)
                .separator("_")
                .source(Some(filtered_env)),
        )
        .build()?;

    match Config::try_deserialize::<T>(config_deserializer) {
        Ok(cfg) => Ok(cfg),
        Err(err) => {
            let mut err = if let Some(source_err) = err.source() {
                let source = format!("Config error source: {source_err}");
                Err(err).context(source)
            } else {
                Err(err.into())
            };

            for cfg_path in base_config_sources.iter().chain(config_file_paths.iter()) {
                err = err.with_context(|| format!("Config loaded: {cfg_path}"));
            }

            err.context("Config deserialization error, please check the account list and connection settings")
        }
    }
}
