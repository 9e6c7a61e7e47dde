use std::fs;
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, Table, Value};

use crate::io::paths::config_path;
use crate::model::config::Config;

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config.toml: {0}")]
    Syntax(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Load the config, falling back to defaults when `config.toml` is absent.
pub fn load_config(data_dir: &Path) -> Result<Config, ConfigError> {
    Ok(read_config(data_dir)?.0)
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(data_dir: &Path) -> Result<(Config, DocumentMut), ConfigError> {
    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    let config: Config = toml::from_str(&text)?;
    let doc: DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &DocumentMut) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    let write_err = |source| ConfigError::Write {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(data_dir).map_err(write_err)?;
    fs::write(&path, doc.to_string()).map_err(write_err)
}

/// Look up a dotted key (`layout.node_width`) in the effective config,
/// defaults included. Returns the TOML rendering of the value.
pub fn get_value(config: &Config, key: &str) -> Result<String, ConfigError> {
    let full = toml::Value::try_from(config).map_err(|_| ConfigError::UnknownKey(key.into()))?;
    let mut current = &full;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    }
    Ok(match current {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Set a dotted key in the document. `raw` is parsed as a TOML value
/// (number, boolean, ...) and kept as a string when that fails. The edited
/// document must still parse as a valid config.
pub fn set_value(doc: &mut DocumentMut, key: &str, raw: &str) -> Result<Config, ConfigError> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, tables)) = parts.split_last() else {
        return Err(ConfigError::UnknownKey(key.to_string()));
    };
    if leaf.is_empty() || tables.is_empty() {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }

    let mut table: &mut Table = doc.as_table_mut();
    for part in tables {
        if !table.contains_key(part) {
            table.insert(part, Item::Table(Table::new()));
        }
        table = table[*part]
            .as_table_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    }
    let value: Value = raw.parse().unwrap_or_else(|_| Value::from(raw));
    table[*leaf] = Item::Value(value);

    let config: Config = toml::from_str(&doc.to_string())?;
    if get_value(&config, key).is_err() {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }
    Ok(config)
}
