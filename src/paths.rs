//! Helpers for logical template paths.
//!
//! Logical paths are always relative, use `/` as the separator regardless of
//! the host platform, and never carry `.` segments. The root directory is the
//! empty string.

/// Normalizes a path: unifies separators, drops empty and `.` segments and
/// folds `..` into its parent where possible.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Joins two logical paths and normalizes the result.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        normalize(name)
    } else {
        normalize(&format!("{dir}/{name}"))
    }
}

/// Returns the directory part of `path`, or `""` for top-level entries.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..index],
        None => "",
    }
}

/// Returns the last segment of `path`.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Returns the extension of the last segment without the dot, if any.
///
/// A leading dot (as in `.hidden`) does not start an extension.
pub fn extension(path: &str) -> Option<&str> {
    let name = basename(path);
    match name.rfind('.') {
        Some(index) if index > 0 => Some(&name[index + 1..]),
        _ => None,
    }
}

/// Removes the file extension, keeping the directory and the base name.
///
/// ```
/// assert_eq!(statil::paths::strip_extension("nested/page.html"), "nested/page");
/// assert_eq!(statil::paths::strip_extension("index"), "index");
/// ```
pub fn strip_extension(path: &str) -> String {
    let path = normalize(path);
    let name = basename(&path);
    let stem = match name.rfind('.') {
        Some(index) if index > 0 => &name[..index],
        _ => name,
    };
    join(dirname(&path), stem)
}

/// Computes the relative path leading from `from` to `to`, segment by segment.
pub fn relative(from: &str, to: &str) -> String {
    let from = normalize(from);
    let to = normalize(to);
    let from_segments: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_segments
        .iter()
        .zip(to_segments.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_segments.len() - common];
    parts.extend(&to_segments[common..]);
    parts.join("/")
}

/// Tells whether `path` equals `ancestor` or lies below it.
pub fn is_within(ancestor: &str, path: &str) -> bool {
    let relative = relative(ancestor, path);
    relative.split('/').next() != Some("..")
}
