//! Path manipulation utilities for repository-relative locations

/// Normalize a repository-relative location
///
/// Config authors write `dev`, `/dev` or `dev/` interchangeably; the
/// repository API reports `dev/values.yaml`. Leading and trailing slashes are
/// dropped so both sides compare cleanly.
pub fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Check whether `path` is `location` itself or lies below it
pub fn is_within(path: &str, location: &str) -> bool {
    let path = normalize(path);
    let location = normalize(location);
    if location.is_empty() {
        return true;
    }
    path == location
        || (path.starts_with(location) && path[location.len()..].starts_with('/'))
}

/// Move a file path from below `source` to below `target`
///
/// The `source` prefix is replaced by `target`; the rest of the path is kept.
/// Paths that do not lie below `source` are returned normalized but
/// otherwise unchanged.
pub fn rewrite_prefix(path: &str, source: &str, target: &str) -> String {
    let path = normalize(path);
    let source = normalize(source);
    let target = normalize(target);

    if !is_within(path, source) {
        return path.to_string();
    }
    let rest = path[source.len()..].trim_start_matches('/');
    match (target.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => target.to_string(),
        (false, false) => format!("{}/{}", target, rest),
    }
}
