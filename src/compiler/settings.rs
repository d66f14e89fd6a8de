use crate::constants::{
    DEFAULT_CONTEXT_NAME, DEFAULT_EXPRESSION_PATTERN, DEFAULT_STATEMENT_PATTERN,
};
use crate::error::{Error, Result};
use regex::Regex;

/// Delimiters and naming used when compiling templates.
///
/// Each delimiter pattern must contain exactly one capture group holding the
/// code between the delimiters.
#[derive(Debug, Clone)]
pub struct CompilerSettings {
    expression: Regex,
    statement: Regex,
    escape: Option<Regex>,
    context_name: String,
    combined: Regex,
}

impl CompilerSettings {
    /// Creates settings from raw patterns, validating each of them.
    ///
    /// # Arguments
    /// * `expression` - Pattern whose capture is evaluated and appended
    /// * `statement` - Pattern whose capture is executed without output
    /// * `escape` - Optional pattern whose capture is evaluated and HTML-escaped
    /// * `context_name` - Identifier binding the render context inside templates
    pub fn new(
        expression: &str,
        statement: &str,
        escape: Option<&str>,
        context_name: &str,
    ) -> Result<Self> {
        let expression = delimiter("expression", expression)?;
        let statement = delimiter("statement", statement)?;
        let escape = escape.map(|pattern| delimiter("escape", pattern)).transpose()?;

        if !is_identifier(context_name) {
            return Err(Error::InputValidation(format!(
                "context name must be an identifier, got: '{context_name}'"
            )));
        }

        // Escape goes first so `{{- x }}` is not swallowed by `{{ x }}`.
        let mut alternatives = Vec::with_capacity(3);
        if let Some(escape) = &escape {
            alternatives.push(format!("(?:{})", escape.as_str()));
        }
        alternatives.push(format!("(?:{})", expression.as_str()));
        alternatives.push(format!("(?:{})", statement.as_str()));
        let combined = Regex::new(&alternatives.join("|"))?;

        Ok(Self {
            expression,
            statement,
            escape,
            context_name: context_name.to_string(),
            combined,
        })
    }

    pub fn expression(&self) -> &Regex {
        &self.expression
    }

    pub fn statement(&self) -> &Regex {
        &self.statement
    }

    pub fn escape(&self) -> Option<&Regex> {
        self.escape.as_ref()
    }

    pub fn context_name(&self) -> &str {
        &self.context_name
    }

    /// The alternation of every delimiter, escape first when present.
    pub(crate) fn combined(&self) -> &Regex {
        &self.combined
    }
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXPRESSION_PATTERN,
            DEFAULT_STATEMENT_PATTERN,
            None,
            DEFAULT_CONTEXT_NAME,
        )
        .expect("default delimiters are valid")
    }
}

fn delimiter(kind: &str, pattern: &str) -> Result<Regex> {
    if pattern.is_empty() {
        return Err(Error::InputValidation(format!("{kind} pattern must not be empty")));
    }
    let regex = Regex::new(pattern)?;
    // captures_len counts the implicit whole-match group.
    if regex.captures_len() != 2 {
        return Err(Error::InputValidation(format!(
            "{kind} pattern must have exactly one capture group, got: '{pattern}'"
        )));
    }
    Ok(regex)
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}
