use statil::cli::{run, Args};
use log::debug;
use std::fs;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn relative_files(dir: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(dir).unwrap().to_path_buf())
        .collect()
}

/// Prints which rendered files are missing, unexpected, or differ in content.
///
/// # Arguments
/// * `actual` - The rendered output directory.
/// * `expected` - The directory with expected output.
pub fn print_dir_diff(actual: &Path, expected: &Path) {
    let actual_files = relative_files(actual);
    let expected_files = relative_files(expected);

    println!("\n=== Directory Comparison ===");
    println!("Actual output:   {actual:?}");
    println!("Expected output: {expected:?}");

    for file in actual_files.difference(&expected_files) {
        println!("  + {file:?} (only in actual)");
    }
    for file in expected_files.difference(&actual_files) {
        println!("  - {file:?} (only in expected)");
    }
    for file in actual_files.intersection(&expected_files) {
        let rendered = fs::read_to_string(actual.join(file)).unwrap();
        let wanted = fs::read_to_string(expected.join(file)).unwrap();
        if rendered != wanted {
            println!("\n  File: {file:?}");
            println!("  --- Actual content:\n{rendered}");
            println!("  --- Expected content:\n{wanted}");
        }
    }
    println!("=== End of Comparison ===\n");
}

/// Renders the site at `src` with the statil CLI runner, compares the output to the expected directory,
/// prints any differences, and asserts that the directories are identical.
///
/// # Arguments
/// * `src` - Path to the site source directory.
/// * `expected_dir` - Path to the directory with expected output.
/// * `opts` - Optional path to an options file.
pub fn run_and_assert(src: &str, expected_dir: &str, opts: Option<&str>) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let args = Args {
        src: src.into(),
        out: tmp_dir.path().to_path_buf(),
        opts: opts.map(Into::into),
        dirs: Vec::new(),
        rename: None,
        rename_except: Vec::new(),
        post_process: Vec::new(),
        ignore: Vec::new(),
        verbose: 2,
        dry_run: false,
    };
    run(args).unwrap();
    let result = dir_diff::is_different(tmp_dir.path(), expected_dir);
    match result {
        Ok(different) => {
            if different {
                print_dir_diff(tmp_dir.path(), expected_dir.as_ref());
                panic!("Directories differ. See above for details.");
            }
        }
        Err(e) => {
            debug!("Error comparing directories: {e}");
        }
    }
    assert!(!dir_diff::is_different(tmp_dir.path(), expected_dir).unwrap());
}
