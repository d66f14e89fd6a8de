//! Constants used throughout statil

/// File extensions registered as directory metadata instead of templates
pub const META_EXTENSIONS: &[&str] = &["yaml", "json"];

/// Base name of the template that wraps every page in its directory
pub const INDEX: &str = "index";

/// Default expression delimiter: `{{ expr }}`
pub const DEFAULT_EXPRESSION_PATTERN: &str = r"\{\{\s*([\s\S]+?)\s*\}\}";

/// Default statement delimiter: `<< stmt >>`
pub const DEFAULT_STATEMENT_PATTERN: &str = r"<<\s*([\s\S]+?)\s*>>";

/// Suggested escape delimiter: `{{- expr }}`, disabled unless configured
pub const SUGGESTED_ESCAPE_PATTERN: &str = r"\{\{-\s*([\s\S]+?)\s*\}\}";

/// Default name under which templates see their own context
pub const DEFAULT_CONTEXT_NAME: &str = "$";

/// Upper bound on nested echo expansion
pub const MAX_ECHO_DEPTH: usize = 32;

/// Reserved keys of the render context
pub mod locals {
    pub const CONTENT: &str = "$content";
    pub const TITLE: &str = "$title";
    pub const PATH: &str = "$path";
    pub const META: &str = "$meta";
    pub const NAME: &str = "name";
    pub const FILES: &str = "files";
}

/// Legend keys with special meaning
pub mod legend {
    pub const NAME: &str = "name";
    pub const ECHO: &str = "echo";
    pub const REPEAT: &str = "repeat";
}

/// Separator placed between parts of `$title`
pub const TITLE_SEPARATOR: &str = " | ";

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
