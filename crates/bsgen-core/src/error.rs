//! Error handling for the bsgen templating library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Every failure of the renderers is
//! a deterministic consequence of bad input, so each kind gets its own variant
//! and callers can match on it.
//!
//! # Examples
//!
//! ```
//! use bsgen_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::template("something went wrong"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Result type for bsgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bsgen operations
#[derive(Debug, Error)]
pub enum Error {
    /// A concrete path did not match the parameterized template path
    #[error("Path \"{value}\" does not match config path \"{template}\".")]
    PathMismatch { value: String, template: String },

    /// A placeholder expression is malformed or references an unknown helper
    #[error("Invalid placeholder `{expression}` in {path}: {reason}")]
    TemplateSyntax {
        path: String,
        expression: String,
        reason: String,
    },

    /// Path matching requires exactly one `{{ name }}` placeholder
    #[error(
        "Template path \"{template}\" contains {count} `{{{{ name }}}}` placeholders, expected exactly one"
    )]
    AmbiguousPlaceholder { template: String, count: usize },

    /// A step declares a kind no generator handles
    #[error("There is no generator for step type \"{0}\".")]
    UnsupportedStepKind(String),

    /// Template lookup failed
    #[error("Template \"{name}\" not found in {config}.")]
    TemplateNotFound { name: String, config: String },

    /// A template with the same id is already configured
    #[error("Template {0} already exists in config file. Add the --force option to overwrite it.")]
    TemplateExists(String),

    /// The template definition is structurally invalid
    #[error("Invalid template \"{template}\": {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// An include references a template that does not exist
    #[error("Template \"{template}\" includes unknown template \"{include}\".")]
    IncludeNotFound { template: String, include: String },

    /// A required parameter was not supplied and has no default
    #[error("Template \"{template}\" requires parameter \"{parameter}\".")]
    MissingParameter { template: String, parameter: String },

    /// A parameter value could not be parsed
    #[error("Invalid parameter \"{parameter}\": {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// Refusing to overwrite an existing file
    #[error("File {} already exists, add --force to overwrite.", .0.display())]
    FileExists(PathBuf),

    /// A step expected an existing file
    #[error("File {} does not exist.", .0.display())]
    FileNotFound(PathBuf),

    /// Two steps would create the same file
    #[error("More than one step creates {0}.")]
    Conflict(String),

    /// One or more steps failed during preparation
    #[error("Preparation failed: {}", join_errors(.0))]
    Preparation(Vec<Error>),

    /// No configuration file could be discovered
    #[error("Config file not found. Create one with `bsgen init` in the local or home directory.")]
    ConfigNotFound,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON conversion error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid regular expression in a step
    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    pub(crate) fn invalid_template(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            reason: reason.into(),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
