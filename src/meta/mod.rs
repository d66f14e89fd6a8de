//! Directory metadata: legends, ignore patterns and echo expansion.

use crate::error::{Error, Result};
use crate::paths;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;

pub mod echo;
pub mod types;

pub use echo::resolve_echo;
pub use types::{Legend, Meta};

/// Holds at most one [`Meta`] per directory.
///
/// Every lookup takes a file path and consults the file's directory; a path
/// ending in `/` names the directory itself.
pub trait MetadataStore {
    /// Stores `meta` for `dir`. A second meta for the same directory fails
    /// with [`Error::DuplicateMeta`], whatever the file extensions were.
    fn register(&mut self, meta: Meta, dir: &str) -> Result<()>;

    fn meta_for(&self, path: &str) -> Option<&Meta>;

    /// Mutable access to the live entry; changes are seen by later renders.
    fn meta_for_mut(&mut self, path: &str) -> Option<&mut Meta>;

    /// The legend named after the base name of `path`, if any.
    fn legend_for(&self, path: &str) -> Option<&Legend> {
        let path = paths::normalize(path);
        self.meta_for(&path)?.legend(paths::basename(&path))
    }

    /// True when the directory's `ignore` pattern matches the base name.
    fn is_ignored(&self, path: &str) -> Result<bool> {
        let Some(pattern) = self.meta_for(path).and_then(|meta| meta.ignore.as_deref()) else {
            return Ok(false);
        };
        if pattern.is_empty() {
            return Ok(false);
        }
        let regex = Regex::new(pattern)?;
        Ok(regex.is_match(paths::basename(&paths::normalize(path))))
    }
}

/// In-memory store keyed by normalized directory path, root being `""`.
#[derive(Debug, Default, Clone)]
pub struct DirectoryMetaStore {
    metas: IndexMap<String, Meta>,
}

impl DirectoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }
}

/// Directory a lookup path refers to.
fn directory_of(path: &str) -> String {
    let normalized = paths::normalize(path);
    if path.ends_with('/') || path.ends_with('\\') {
        normalized
    } else {
        paths::dirname(&normalized).to_string()
    }
}

impl MetadataStore for DirectoryMetaStore {
    fn register(&mut self, meta: Meta, dir: &str) -> Result<()> {
        let dir = paths::normalize(dir);
        if self.metas.contains_key(&dir) {
            return Err(Error::DuplicateMeta { dir });
        }
        debug!("Registered meta for directory '{dir}'");
        self.metas.insert(dir, meta);
        Ok(())
    }

    fn meta_for(&self, path: &str) -> Option<&Meta> {
        self.metas.get(&directory_of(path))
    }

    fn meta_for_mut(&mut self, path: &str) -> Option<&mut Meta> {
        self.metas.get_mut(&directory_of(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(dir: &str, source: &str) -> DirectoryMetaStore {
        let mut store = DirectoryMetaStore::new();
        store.register(Meta::parse(source, "meta.yaml").unwrap(), dir).unwrap();
        store
    }

    #[test]
    fn looks_up_by_directory() {
        let store = store_with("planets", "files:\n  - name: earth\n    title: Earth\n");
        assert!(store.meta_for("planets/earth").is_some());
        assert!(store.meta_for("planets/").is_some());
        assert!(store.meta_for("planets").is_none());
        assert_eq!(store.legend_for("planets/earth").unwrap().name(), Some("earth"));
        assert!(store.legend_for("planets/mars").is_none());
        assert!(store.legend_for("moons/earth").is_none());
    }

    #[test]
    fn rejects_duplicate_directories() {
        let mut store = store_with("docs", "ignore: x\n");
        let err = store.register(Meta::default(), "docs").unwrap_err();
        assert!(matches!(err, Error::DuplicateMeta { dir } if dir == "docs"));
    }

    #[test]
    fn ignores_matching_base_names() {
        let store = store_with("", "ignore: ^partial\n");
        assert!(store.is_ignored("partial-nav").unwrap());
        assert!(!store.is_ignored("page").unwrap());
        assert!(!store.is_ignored("nested/partial-nav").unwrap());
    }

    #[test]
    fn absent_or_empty_ignore_never_ignores() {
        assert!(!DirectoryMetaStore::new().is_ignored("page").unwrap());
        let store = store_with("", "ignore: ''\n");
        assert!(!store.is_ignored("page").unwrap());
    }

    #[test]
    fn invalid_ignore_pattern_is_an_error() {
        let store = store_with("", "ignore: '(unclosed'\n");
        assert!(matches!(store.is_ignored("page"), Err(Error::Regex(_))));
    }

    #[test]
    fn meta_entries_are_live() {
        let mut store = store_with("", "files: []\n");
        assert!(!store.is_ignored("draft").unwrap());
        store.meta_for_mut("draft").unwrap().ignore = Some("draft".to_string());
        assert!(store.is_ignored("draft").unwrap());
    }
}
