//! Helpers for `/`-separated VFS path strings

/// Split `path` into its meaningful segments.
///
/// Empty, `.` and `..` segments are dropped; `..` is not resolved against
/// anything, so `../a/b` yields `["a", "b"]`.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect()
}

/// Last element of `path`, ignoring trailing separators.
///
/// An empty path yields `"."` and a path made only of separators yields `"/"`.
pub fn basename(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Join a child name onto `root` without doubling the separator.
pub fn join(root: &str, child: &str) -> String {
    if root.is_empty() {
        child.to_string()
    } else if root.ends_with('/') {
        format!("{}{}", root, child)
    } else {
        format!("{}/{}", root, child)
    }
}

/// Canonical key for a path: its segments joined by `/`.
pub fn key(path: &str) -> String {
    segments(path).join("/")
}
