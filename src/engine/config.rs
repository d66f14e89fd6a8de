use crate::compiler::CompilerSettings;
use crate::error::Result;
use crate::helpers;
use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::fmt;

/// A host function callable from templates by name.
pub type Helper = Box<dyn Fn(&[Value]) -> Result<Value>>;

/// Maps a virtual output path to a new one; `None` keeps the original.
pub type RenameFn = Box<dyn Fn(&str) -> Option<String>>;

/// Transforms rendered content for a given output path; `None` keeps the
/// content unchanged.
pub type PostProcessor = Box<dyn Fn(&str, &str) -> Option<String>>;

/// Settings fixed for the lifetime of a [`Statil`](super::Statil).
pub struct EngineConfig {
    pub settings: CompilerSettings,
    pub helpers: IndexMap<String, Helper>,
    pub rename: Option<RenameFn>,
    /// Virtual paths the rename hook never touches.
    pub rename_except: IndexSet<String>,
    pub post_process: Vec<PostProcessor>,
    /// Logical template paths left out of `render_all`.
    pub ignore_paths: GlobSet,
}

impl EngineConfig {
    /// Applies the rename hook to `path` unless it is excluded.
    pub fn rename(&self, path: String) -> String {
        if self.rename_except.contains(&path) {
            return path;
        }
        match &self.rename {
            Some(rename) => rename(&path).unwrap_or(path),
            None => path,
        }
    }

    /// Runs every post-processor in order over `content`.
    pub fn post_process(&self, content: String, path: &str) -> String {
        self.post_process
            .iter()
            .fold(content, |content, processor| processor(&content, path).unwrap_or(content))
    }

    pub fn is_path_ignored(&self, path: &str) -> bool {
        self.ignore_paths.is_match(path)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settings: CompilerSettings::default(),
            helpers: helpers::default_helpers(),
            rename: None,
            rename_except: IndexSet::new(),
            post_process: Vec::new(),
            ignore_paths: GlobSet::empty(),
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("settings", &self.settings)
            .field("helpers", &self.helpers.keys().collect::<Vec<_>>())
            .field("rename", &self.rename.is_some())
            .field("rename_except", &self.rename_except)
            .field("post_process", &self.post_process.len())
            .field("ignore_paths", &self.ignore_paths.len())
            .finish()
    }
}

/// Compiles a list of glob patterns into a [`GlobSet`].
pub fn build_glob_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern.as_ref())?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_falls_back_to_original() {
        let mut config = EngineConfig::default();
        assert_eq!(config.rename("a/b".into()), "a/b");

        config.rename = Some(Box::new(|path| path.starts_with('a').then(|| format!("{path}.html"))));
        config.rename_except.insert("a/keep".into());
        assert_eq!(config.rename("a/b".into()), "a/b.html");
        assert_eq!(config.rename("b".into()), "b");
        assert_eq!(config.rename("a/keep".into()), "a/keep");
    }

    #[test]
    fn post_processors_chain_and_skip_none() {
        let mut config = EngineConfig::default();
        config.post_process.push(Box::new(|content, _| Some(content.trim().to_string())));
        config.post_process.push(Box::new(|_, _| None));
        config.post_process.push(Box::new(|content, path| Some(format!("{content} @ {path}"))));
        assert_eq!(config.post_process("  x  ".into(), "p"), "x @ p");
    }

    #[test]
    fn ignore_globs_match_logical_paths() {
        let mut config = EngineConfig::default();
        config.ignore_paths = build_glob_set(&["partials/**", "draft"]).unwrap();
        assert!(config.is_path_ignored("partials/nav"));
        assert!(config.is_path_ignored("draft"));
        assert!(!config.is_path_ignored("index"));
        assert!(build_glob_set(&["a/{"]).is_err());
    }
}
