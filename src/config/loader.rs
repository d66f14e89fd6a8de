//! Options file loading and parsing

use crate::compiler::CompilerSettings;
use crate::config::types::PostProcess;
use crate::constants::{
    DEFAULT_CONTEXT_NAME, DEFAULT_EXPRESSION_PATTERN, DEFAULT_STATEMENT_PATTERN,
};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::ioutils::read_from;
use crate::paths;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Site-wide options read from `--opts`.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteOptions {
    /// Base locals every template renders against.
    pub locals: Map<String, Value>,
    pub expression: Option<String>,
    pub statement: Option<String>,
    pub escape: Option<String>,
    #[serde(alias = "contextName", alias = "variable")]
    pub context_name: Option<String>,
    /// MiniJinja pattern producing output paths from `path`, `dir` and `name`.
    pub rename: Option<String>,
    #[serde(alias = "renameExcept")]
    pub rename_except: Vec<String>,
    #[serde(alias = "ignorePaths")]
    pub ignore_paths: Vec<String>,
    #[serde(alias = "postProcess", alias = "pipeline")]
    pub post_process: Vec<PostProcess>,
}

impl SiteOptions {
    /// Loads options from a `.json`, `.yaml` or `.yml` file, or JSON from
    /// stdin when `path` is `-`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.to_str_checked()?;
        if name == "-" {
            return Self::from_json(&read_from(std::io::stdin())?);
        }

        let content = std::fs::read_to_string(path)?;
        match paths::extension(name) {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            other => Err(Error::ConfigError(format!(
                "unsupported options file extension '{}' for '{name}', expected json, yaml or yml",
                other.unwrap_or_default()
            ))),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Compiler settings, with defaults for every delimiter left unset.
    pub fn compiler_settings(&self) -> Result<CompilerSettings> {
        CompilerSettings::new(
            self.expression.as_deref().unwrap_or(DEFAULT_EXPRESSION_PATTERN),
            self.statement.as_deref().unwrap_or(DEFAULT_STATEMENT_PATTERN),
            self.escape.as_deref(),
            self.context_name.as_deref().unwrap_or(DEFAULT_CONTEXT_NAME),
        )
    }
}
