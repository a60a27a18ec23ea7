//! Configuration loading for the ApX front end.
//!
//! `defaults/apx.default.toml` is embedded into the crate so the documented
//! defaults and the runtime defaults cannot drift. Callers layer their own
//! files and overrides on top through [`Loader`] before deserializing into
//! [`ApxConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/apx.default.toml");

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ApxConfig {
    pub parser: ParserConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParserConfig {
    /// Stop parsing after the first syntax error and keep one diagnostic.
    pub stop_at_first_error: bool,
    pub max_diagnostics: usize,
    /// How deeply groups, blocks and patterns may nest before parsing gives up
    /// on the statement.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            stop_at_first_error: false,
            max_diagnostics: 200,
            max_depth: 128,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Warn about variables and names with no visible binding.
    pub warn_unresolved: bool,
    /// Also warn about command names that are neither defined nor built in.
    pub warn_unresolved_commands: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            warn_unresolved: true,
            warn_unresolved_commands: false,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file, ignored when absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. from a command-line flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<ApxConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<ApxConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_match_default_impl() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config, ApxConfig::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("parser.stop_at_first_error", true)
            .expect("override to apply")
            .set_override("resolver.warn_unresolved_commands", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(config.parser.stop_at_first_error);
        assert!(config.resolver.warn_unresolved_commands);
        assert_eq!(config.parser.max_diagnostics, 200);
        assert_eq!(config.parser.max_depth, 128);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/apx.toml")
            .build()
            .expect("config to build");
        assert!(config.resolver.warn_unresolved);
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new().with_file("/nonexistent/apx.toml").build();
        assert!(result.is_err());
    }
}
