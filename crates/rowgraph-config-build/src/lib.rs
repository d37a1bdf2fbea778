//! Loads `rowgraph.toml`, the generation options read by build scripts.

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error as ThisError;

/// Default config file name, resolved relative to the crate running `build.rs`.
pub const CONFIG_FILE: &str = "rowgraph.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io { path: String, source: io::Error },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub generate: GenerateConfig,
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.generate.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&source)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load(path)
    }
}

///
/// GenerateConfig
///
/// Naming and lookup options for generated mapping functions.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    pub function_prefix: String,
    pub function_suffix: String,

    /// Also emit `{prefix}{entity}_list` returning the roots in first-seen order.
    pub list_functions: bool,

    pub lookup: Lookup,
}

impl GenerateConfig {
    /// Name of the id→entity mapping function for an entity.
    #[must_use]
    pub fn function_name(&self, entity_name: &str) -> String {
        format!(
            "{}{}{}",
            self.function_prefix,
            entity_name.to_case(Case::Snake),
            self.function_suffix
        )
    }

    /// Name of the list companion for an entity.
    #[must_use]
    pub fn list_function_name(&self, entity_name: &str) -> String {
        format!(
            "{}{}_list",
            self.function_prefix,
            entity_name.to_case(Case::Snake)
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.function_prefix.is_empty() && self.function_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "function_prefix and function_suffix cannot both be empty".to_string(),
            ));
        }
        if self.list_functions && self.function_prefix.is_empty() && self.function_suffix == "_list"
        {
            return Err(ConfigError::Invalid(
                "function_suffix '_list' collides with list function names".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            function_prefix: "to_".to_string(),
            function_suffix: "_map".to_string(),
            list_functions: true,
            lookup: Lookup::default(),
        }
    }
}

///
/// Lookup
///
/// How a row's target id is matched against an already-built id→entity map.
/// Both strategies select zero or one entity.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookup {
    /// Direct keyed lookup.
    #[default]
    Indexed,

    /// Filter the whole map by key equality.
    Scan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").expect("empty config should parse");

        assert_eq!(config, Config::default());
        assert_eq!(config.generate.function_name("ParkingSpot"), "to_parking_spot_map");
        assert_eq!(
            config.generate.list_function_name("ParkingSpot"),
            "to_parking_spot_list"
        );
    }

    #[test]
    fn reads_generate_section() {
        let config = Config::from_toml(
            r#"
            [generate]
            function_prefix = "map_"
            function_suffix = ""
            list_functions = false
            lookup = "scan"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.generate.lookup, Lookup::Scan);
        assert!(!config.generate.list_functions);
        assert_eq!(config.generate.function_name("Customer"), "map_customer");
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Config::from_toml("[generate]\nfunction_prefx = \"x\"\n")
            .expect_err("typo should be rejected");

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unnamed_functions() {
        let err = Config::from_toml("[generate]\nfunction_prefix = \"\"\nfunction_suffix = \"\"\n")
            .expect_err("empty names should be rejected");

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_or_default("does/not/exist/rowgraph.toml")
            .expect("missing file should not fail");

        assert_eq!(config, Config::default());
    }
}
