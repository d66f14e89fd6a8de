use std::path::Path;

use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;

pub fn create_dir_all<P: AsRef<Path>>(dest_path: P) -> Result<()> {
    let dest_path = dest_path.as_ref();
    std::fs::create_dir_all(dest_path).map_err(Error::IoError)
}

pub fn write_file<P: AsRef<Path>>(content: &str, dest_path: P) -> Result<()> {
    let dest_path = dest_path.as_ref();
    if let Some(parent) = dest_path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(dest_path, content).map_err(Error::IoError)
}

/// Writes every rendered file below `out_dir`, creating directories as
/// needed. Contents are written verbatim.
pub fn write_files<P: AsRef<Path>>(out_dir: P, files: &IndexMap<String, String>) -> Result<()> {
    let out_dir = out_dir.as_ref();
    create_dir_all(out_dir)?;
    for (path, content) in files {
        let dest = out_dir.join(path);
        debug!("Writing '{}'", dest.display());
        write_file(content, dest)?;
    }
    Ok(())
}

pub fn read_from(mut reader: impl std::io::Read) -> Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf).map_err(Error::IoError)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = IndexMap::new();
        files.insert("index".to_string(), "root\n".to_string());
        files.insert("a/b/page.html".to_string(), "it's \"verbatim\"".to_string());

        write_files(dir.path(), &files).unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("index")).unwrap(), "root\n");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a/b/page.html")).unwrap(),
            "it's \"verbatim\""
        );
    }

    #[test]
    fn reads_from_any_reader() {
        assert_eq!(read_from("abc".as_bytes()).unwrap(), "abc");
    }
}
