use std::path::Path;

use crate::error::{Error, Result};

/// Extension trait for Path to provide conversions into logical template paths
pub trait PathExt {
    /// Converts a path to a string slice, returning an error if the path contains invalid Unicode characters.
    ///
    /// # Examples
    /// ```
    /// use statil::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let path = Path::new("test");
    /// assert_eq!(path.to_str_checked().unwrap(), "test");
    /// ```
    fn to_str_checked(&self) -> Result<&str>;

    /// Converts a path into a logical, `/`-separated path relative to `root`.
    ///
    /// # Examples
    /// ```
    /// use statil::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let path = Path::new("site/nested/page.html");
    /// assert_eq!(path.to_logical(Path::new("site")).unwrap(), "nested/page.html");
    /// ```
    fn to_logical(&self, root: &Path) -> Result<String>;
}

impl PathExt for Path {
    fn to_str_checked(&self) -> Result<&str> {
        self.to_str().ok_or_else(|| {
            Error::Other(anyhow::anyhow!(
                "Path '{}' contains invalid Unicode characters",
                self.display()
            ))
        })
    }

    fn to_logical(&self, root: &Path) -> Result<String> {
        let relative = self.strip_prefix(root).unwrap_or(self);
        let segments = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                Error::Other(anyhow::anyhow!(
                    "Path '{}' contains invalid Unicode characters",
                    self.display()
                ))
            })?;
        Ok(crate::paths::normalize(&segments.join("/")))
    }
}
