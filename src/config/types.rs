//! Basic types for configuration

use clap::ValueEnum;
use serde::Deserialize;
use std::fmt::Display;

/// Named post-processors selectable from the command line or options file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum PostProcess {
    /// Strip leading and trailing whitespace.
    Trim,
    /// End the content with exactly one newline.
    FinalNewline,
}

impl PostProcess {
    /// Applies the processor; `None` leaves the content unchanged.
    pub fn apply(&self, content: &str) -> Option<String> {
        match self {
            PostProcess::Trim => {
                let trimmed = content.trim();
                (trimmed.len() != content.len()).then(|| trimmed.to_string())
            }
            PostProcess::FinalNewline => {
                let body = content.trim_end_matches(['\n', '\r']);
                let fixed = format!("{body}\n");
                (fixed != content).then_some(fixed)
            }
        }
    }
}

impl Display for PostProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PostProcess::Trim => "trim",
            PostProcess::FinalNewline => "final-newline",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_content() {
        assert_eq!(PostProcess::Trim.apply("  a \n"), Some("a".to_string()));
        assert_eq!(PostProcess::Trim.apply("a"), None);
    }

    #[test]
    fn normalizes_final_newline() {
        assert_eq!(PostProcess::FinalNewline.apply("a"), Some("a\n".to_string()));
        assert_eq!(PostProcess::FinalNewline.apply("a\n\n"), Some("a\n".to_string()));
        assert_eq!(PostProcess::FinalNewline.apply("a\n"), None);
    }

    #[test]
    fn display_post_process_variants() {
        assert_eq!(PostProcess::Trim.to_string(), "trim");
        assert_eq!(PostProcess::FinalNewline.to_string(), "final-newline");
    }
}
