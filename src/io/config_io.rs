use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;
use crate::model::config::Config;
use crate::model::language::Language;

const CONFIG_FILE: &str = "config.toml";

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

fn read_config_text(data_dir: &Path) -> Result<Option<String>, ConfigError> {
    let path = config_path(data_dir);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::ReadError { path, source: e }),
    }
}

/// Read config.toml. A missing file means all defaults.
pub fn read_config(data_dir: &Path) -> Result<Config, ConfigError> {
    match read_config_text(data_dir)? {
        Some(text) => Ok(toml::from_str(&text)?),
        None => Ok(Config::default()),
    }
}

/// Set `habits.language`, keeping the rest of the file's formatting and
/// comments intact. Creates the file if it does not exist.
pub fn set_language(data_dir: &Path, lang: Language) -> Result<(), ConfigError> {
    let text = read_config_text(data_dir)?.unwrap_or_default();
    let mut doc: toml_edit::DocumentMut = text.parse()?;
    set_language_in_doc(&mut doc, lang);

    let path = config_path(data_dir);
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|e| ConfigError::WriteError { path, source: e })
}

/// Update the language key in the config document
pub fn set_language_in_doc(doc: &mut toml_edit::DocumentMut, lang: Language) {
    if !doc.contains_key("habits") {
        doc["habits"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["habits"]["language"] = toml_edit::value(lang.tag());
}
