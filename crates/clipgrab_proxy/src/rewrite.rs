/// Strips `prefix` from `path`.
///
/// Returns `None` unless `path` is the prefix itself or lies below it on a
/// segment boundary: `/api/x` and `/api` match `/api`, `/apix` does not.
pub fn rewrite_path(path: &str, prefix: &str) -> Option<String> {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return Some(path.to_string());
    }
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some("/".to_string())
    } else if rest.starts_with('/') {
        Some(rest.to_string())
    } else {
        None
    }
}

/// `{origin}{path}` plus `?{query}` when present.
pub fn target_url(origin: &str, path: &str, query: Option<&str>) -> String {
    let mut target = format!("{}{}", origin.trim_end_matches('/'), path);
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }
    target
}
