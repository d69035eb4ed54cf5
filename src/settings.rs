//! Code for loading program settings.
use crate::inclusions::InclusionsOptions;
use crate::log::DEFAULT_LOG_LEVEL;
use crate::matrix::{InterpolationWeights, NormalizeOptions};
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "ratesheet.toml";

/// Environment variable overriding where the settings file is read from
const SETTINGS_PATH_ENV: &str = "RATESHEET_SETTINGS";

const DEFAULT_SETTINGS_FILE_HEADER: &str = "# Program settings for the ratesheet tools.
# Uncomment a line to override the default value.
";

/// Default log level for program
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Get the path to where the settings file will be read from
pub fn get_settings_file_path() -> PathBuf {
    std::env::var_os(SETTINGS_PATH_ENV)
        .map_or_else(|| PathBuf::from(SETTINGS_FILE_NAME), PathBuf::from)
}

/// Read and deserialise a TOML file
fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let contents = fs::read_to_string(file_path)
        .with_context(|| format!("could not read file {}", file_path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("could not parse settings file {}", file_path.display()))
}

/// Program settings from config file
#[derive(Debug, DocumentedFields, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// The default program log level
    pub log_level: String,
    /// Options for normalising pricing matrices
    pub normalize: NormalizeOptions,
    /// Options for processing inclusion lists
    pub inclusions: InclusionsOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            normalize: NormalizeOptions::default(),
            inclusions: InclusionsOptions::default(),
        }
    }
}

impl Settings {
    /// Read the contents of a settings file from the configured path.
    ///
    /// If the file is not present, default values for settings will be used
    ///
    /// # Returns
    ///
    /// The program settings as a `Settings` struct or an error if the file is invalid
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    /// Read from the specified path, falling back to defaults when the file is missing
    pub fn load_from_path(file_path: &Path) -> Result<Settings> {
        if !file_path.is_file() {
            return Ok(Settings::default());
        }

        read_toml(file_path)
    }

    /// The contents of the default settings file
    pub fn default_file_contents() -> String {
        let settings = Settings::default();

        // Convert to TOML
        let settings_raw = toml::to_string(&settings).expect("could not convert settings to TOML");

        // Iterate through the generated TOML, commenting out lines and adding docs.
        // Table headers stay uncommented so the file remains valid TOML when a key
        // under them is uncommented.
        let mut out = DEFAULT_SETTINGS_FILE_HEADER.to_string();
        for line in settings_raw.split('\n') {
            let line = line.trim();
            if line.starts_with('[') {
                write!(&mut out, "\n{line}\n").unwrap();
            } else if let Some((field, _)) = line.split_once('=') {
                // Use doc comment to document parameter. All fields should have doc comments.
                let field = field.trim();
                for doc_line in field_docs(field).split('\n') {
                    writeln!(&mut out, "# # {}", doc_line.trim()).unwrap();
                }

                writeln!(&mut out, "# {line}").unwrap();
            }
        }

        out
    }
}

/// Doc comment for a settings field, searching each section's struct in turn
fn field_docs(field: &str) -> &'static str {
    Settings::get_field_docs(field)
        .or_else(|_| NormalizeOptions::get_field_docs(field))
        .or_else(|_| InterpolationWeights::get_field_docs(field))
        .or_else(|_| InclusionsOptions::get_field_docs(field))
        .expect("missing doc comment for settings field")
}
