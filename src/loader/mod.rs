use crate::error::Result;
use crate::loader::interface::FileLoader;
use crate::loader::local::LocalLoader;
use indexmap::IndexMap;
use std::path::Path;

pub mod interface;
pub mod local;

/// Loads every file of the directory at `path`.
///
/// # Arguments
/// * `path` - Root directory of the site sources
///
/// # Returns
/// * `Result<IndexMap<String, String>>` - Logical paths mapped to contents
pub fn load_dir<P: AsRef<Path>>(path: P) -> Result<IndexMap<String, String>> {
    LocalLoader::new(path).load()
}
