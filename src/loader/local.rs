use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::loader::interface::FileLoader;
use indexmap::IndexMap;
use log::debug;
use std::path::Path;
use walkdir::WalkDir;

/// Loader for site sources from the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    /// Creates a new LocalLoader instance.
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> FileLoader for LocalLoader<P> {
    /// Reads every regular file below the root, in sorted walk order.
    fn load(&self) -> Result<IndexMap<String, String>> {
        let root = self.path.as_ref();
        if !root.is_dir() {
            return Err(Error::SourceDoesNotExistError {
                source_dir: root.display().to_string(),
            });
        }

        let mut files = IndexMap::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|err| Error::Other(err.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let logical = entry.path().to_logical(root)?;
            let content = std::fs::read_to_string(entry.path())?;
            debug!("Loaded '{logical}'");
            files.insert(logical, content);
        }
        Ok(files)
    }
}
