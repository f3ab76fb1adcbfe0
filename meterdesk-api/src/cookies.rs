/// Refresh-token cookie handling
///
/// Refresh tokens travel in cookies (`refreshToken` for the user realm,
/// `refreshProjectToken` for the project realm) with a lifetime matching
/// the token's 180 days. Parsing and formatting are done directly on the
/// `Cookie`/`Set-Cookie` headers.
use axum::http::HeaderMap;

/// Cookie carrying the user refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Cookie carrying the project refresh token
pub const PROJECT_REFRESH_COOKIE: &str = "refreshProjectToken";

/// Cookie lifetime in seconds, matching the refresh token's 180 days
pub const REFRESH_COOKIE_MAX_AGE_SECONDS: i64 = 180 * 24 * 60 * 60;

/// Reads a named cookie from the request headers
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Formats a `Set-Cookie` value installing a refresh token
pub fn set_cookie(name: &str, value: &str) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        name, value, REFRESH_COOKIE_MAX_AGE_SECONDS
    )
}

/// Formats a `Set-Cookie` value clearing a cookie
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; SameSite=Lax", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn test_get_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "theme=dark; refreshToken=abc.def.ghi; other=1".parse().unwrap(),
        );

        assert_eq!(
            get_cookie(&headers, REFRESH_COOKIE),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(get_cookie(&headers, "theme"), Some("dark".to_string()));
        assert_eq!(get_cookie(&headers, PROJECT_REFRESH_COOKIE), None);
    }

    #[test]
    fn test_get_cookie_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE), None);
    }

    #[test]
    fn test_set_and_clear_cookie() {
        let set = set_cookie(REFRESH_COOKIE, "tok");
        assert!(set.starts_with("refreshToken=tok"));
        assert!(set.contains(&format!("Max-Age={}", REFRESH_COOKIE_MAX_AGE_SECONDS)));

        let clear = clear_cookie(REFRESH_COOKIE);
        assert!(clear.contains("Max-Age=0"));
    }
}
