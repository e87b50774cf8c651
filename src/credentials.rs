//! Upstream credential selection for a single request.

use axum::http::HeaderMap;

/// Pick the Gemini API key for this request.
///
/// Priority: `Authorization` (with any `Bearer ` prefix stripped), then
/// `x-api-key`, then the process default. Empty values are skipped.
pub fn resolve_api_key(headers: &HeaderMap, default: Option<&str>) -> Option<String> {
    let bearer = header_str(headers, "authorization")
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim());

    bearer
        .filter(|k| !k.is_empty())
        .or_else(|| {
            header_str(headers, "x-api-key")
                .map(str::trim)
                .filter(|k| !k.is_empty())
        })
        .or(default.filter(|k| !k.is_empty()))
        .map(str::to_string)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_bearer_wins() {
        let h = headers(&[("authorization", "Bearer from-bearer"), ("x-api-key", "from-x")]);
        assert_eq!(
            resolve_api_key(&h, Some("default")),
            Some("from-bearer".to_string())
        );
    }

    #[test]
    fn test_x_api_key_second() {
        let h = headers(&[("x-api-key", "from-x")]);
        assert_eq!(resolve_api_key(&h, Some("default")), Some("from-x".to_string()));
    }

    #[test]
    fn test_empty_bearer_falls_through() {
        let h = headers(&[("authorization", "Bearer "), ("x-api-key", "from-x")]);
        assert_eq!(resolve_api_key(&h, None), Some("from-x".to_string()));
    }

    #[test]
    fn test_authorization_without_bearer_used_as_is() {
        let h = headers(&[("authorization", "raw-key")]);
        assert_eq!(resolve_api_key(&h, None), Some("raw-key".to_string()));
    }

    #[test]
    fn test_default_last() {
        assert_eq!(
            resolve_api_key(&HeaderMap::new(), Some("default")),
            Some("default".to_string())
        );
        assert_eq!(resolve_api_key(&HeaderMap::new(), None), None);
        assert_eq!(resolve_api_key(&HeaderMap::new(), Some("")), None);
    }
}
