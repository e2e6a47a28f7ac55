// Configuration file loader for the Voice & Search API
//
// Values from the optional TOML file are exported as environment variables, so the
// `Default` impls in `config` see them. Variables already present in the process
// environment always win.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info, warn};
use thiserror::Error;
use toml::Value;

pub const CONFIG_FILE_PATH: &str = "voice_search_api.conf";

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads `voice_search_api.conf` from the working directory if present
///
/// Returns false when no file was applied. A missing file is not an error.
pub fn load_config() -> bool {
    let path = Path::new(CONFIG_FILE_PATH);
    if !path.exists() {
        debug!("No configuration file at {}", path.display());
        return false;
    }

    match load_config_from(path) {
        Ok(applied) => {
            info!(
                "Configuration loaded from {} ({} values applied)",
                path.display(),
                applied
            );
            true
        }
        Err(e) => {
            warn!("Ignoring configuration file: {}", e);
            false
        }
    }
}

/// Applies every scalar of the file at `path` that is not already set in the
/// environment, returning how many variables were set
pub fn load_config_from(path: &Path) -> Result<usize, ConfigFileError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let mut applied = 0;
    for (key, value) in parse_flat_config(&content)? {
        if env::var_os(&key).is_some() {
            debug!("{} already set in environment, keeping it", key);
            continue;
        }
        env::set_var(&key, value);
        applied += 1;
    }
    Ok(applied)
}

/// Top-level scalars of a TOML document as strings; nested tables and arrays are skipped
pub fn parse_flat_config(content: &str) -> Result<HashMap<String, String>, toml::de::Error> {
    let table = content.parse::<toml::Table>()?;

    Ok(table
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Integer(i) => i.to_string(),
                Value::Float(f) => f.to_string(),
                Value::Boolean(b) => b.to_string(),
                other => {
                    warn!("Skipping {} value for {}", other.type_str(), key);
                    return None;
                }
            };
            Some((key, text))
        })
        .collect())
}
