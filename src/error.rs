use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON. Original error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML. Original error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid regular expression. Original error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Failed to parse ignore globs. Original error: {0}")]
    GlobSetParseError(#[from] globset::Error),

    #[error("Failed to render rename pattern. Original error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    /// A required argument was empty or otherwise malformed.
    #[error("Invalid input: {0}.")]
    InputValidation(String),

    #[error("Expected a non-empty path, got: '{path}'.")]
    InvalidPath { path: String },

    /// A directory segment is literally named `index`.
    #[error("Name 'index' is not allowed for directories: '{path}'.")]
    ReservedName { path: String },

    #[error("Duplicate meta for directory: '{dir}'.")]
    DuplicateMeta { dir: String },

    #[error("Template not found at path: '{path}'.")]
    TemplateNotFound { path: String },

    #[error("Failed to resolve echo: {0}.")]
    EchoResolution(String),

    #[error("Invalid legend: {0}.")]
    InvalidLegend(String),

    /// Echo expansion nested deeper than the allowed limit, which only happens
    /// when an echo refers back to itself.
    #[error("Echo for '{name}' recursed deeper than {depth} levels; is it cyclic?")]
    EchoCycle { name: String, depth: usize },

    #[error("Syntax error: {0}.")]
    Syntax(String),

    #[error("Failed to compile a template for path: '{path}'. Error: {source}")]
    TemplateCompile {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Evaluation error: {0}.")]
    Evaluation(String),

    #[error("Failed to render template at path: '{path}'. Error: {source}")]
    TemplateExecution {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to parse meta file '{path}'. Original error: {source}")]
    MetaParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("Cannot proceed: source directory '{source_dir}' does not exist.")]
    SourceDoesNotExistError { source_dir: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias for Results with statil's Error as the error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(crate::constants::exit_codes::FAILURE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_mentions_path_and_cause() {
        let err = Error::TemplateExecution {
            path: "nested/page".to_string(),
            source: Box::new(Error::Evaluation("boom".to_string())),
        };
        let message = err.to_string();
        assert!(message.contains("nested/page"));
        assert!(message.contains("boom"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn compile_error_mentions_path() {
        let err = Error::TemplateCompile {
            path: "index".to_string(),
            source: Box::new(Error::Syntax("unexpected 'end'".to_string())),
        };
        assert!(err.to_string().contains("'index'"));
    }
}
