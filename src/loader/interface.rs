use crate::error::Result;
use indexmap::IndexMap;

/// Trait for loading the source files of a site.
pub trait FileLoader {
    /// Loads every file under the source.
    ///
    /// # Returns
    /// * `Result<IndexMap<String, String>>` - Logical `/`-separated paths
    ///   relative to the source root, mapped to UTF-8 contents, sorted by path
    fn load(&self) -> Result<IndexMap<String, String>>;
}
