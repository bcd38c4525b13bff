//! Base URL resolution and path joining

/// Normalize a configured base URL: surrounding whitespace and one
/// trailing slash are removed. Empty means same-origin.
pub fn resolve_base_url(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_suffix('/').unwrap_or(raw).to_string()
}

fn is_absolute(path: &str) -> bool {
    let prefix: String = path.chars().take(8).collect::<String>().to_ascii_lowercase();
    prefix.starts_with("http://") || prefix.starts_with("https://")
}

/// Join `base` and `path` without doubling slashes.
///
/// Absolute `http(s)://` paths are returned untouched; with an empty base
/// the (slash-prefixed) path stays relative.
pub fn build_url(base: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    let normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    if base.is_empty() {
        normalized
    } else {
        format!("{}{}", base, normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_url_strips_one_trailing_slash() {
        assert_eq!(resolve_base_url("https://api.example.com/"), "https://api.example.com");
        assert_eq!(resolve_base_url("https://api.example.com"), "https://api.example.com");
        assert_eq!(resolve_base_url(""), "");
        assert_eq!(resolve_base_url("/"), "");
    }

    #[test]
    fn test_build_url_joins_base_and_path() {
        assert_eq!(
            build_url("https://api.example.com", "/api/chat/send"),
            "https://api.example.com/api/chat/send"
        );
        assert_eq!(
            build_url("https://api.example.com", "api/chat/send"),
            "https://api.example.com/api/chat/send"
        );
    }

    #[test]
    fn test_build_url_same_origin() {
        assert_eq!(build_url("", "/api/chat/history"), "/api/chat/history");
        assert_eq!(build_url("", "api/chat/history"), "/api/chat/history");
    }

    #[test]
    fn test_build_url_keeps_absolute_paths() {
        assert_eq!(
            build_url("https://api.example.com", "HTTP://other.example.com/x"),
            "HTTP://other.example.com/x"
        );
        assert_eq!(
            build_url("", "https://other.example.com/x"),
            "https://other.example.com/x"
        );
    }
}
