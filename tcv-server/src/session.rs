//! Anonymous reviewer sessions
//!
//! A reviewer is identified only by an opaque `session_id` cookie. The id is
//! minted on the first feedback submission that arrives without one.

use axum::http::{header, HeaderMap};
use rand::Rng;

pub const SESSION_COOKIE: &str = "session_id";

/// One year
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 365;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Value of the `session_id` cookie, if the request carries a non-empty one
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `session_<unix-millis>_<9 base36 chars>`
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("session_{}_{}", tcv_common::time::unix_millis(), suffix)
}

/// `Set-Cookie` value for a freshly minted session
pub fn session_cookie(session_id: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, session_id, SESSION_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Best-effort client address from proxy headers
///
/// First entry of `X-Forwarded-For`, else `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_id_shape() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_session_ids_differ() {
        assert_ne!(generate_session_id(), generate_session_id());
    }

    #[test]
    fn test_session_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_id=session_1_abc; other=1"),
        );
        assert_eq!(session_from_headers(&headers).as_deref(), Some("session_1_abc"));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_id="));
        assert!(session_from_headers(&headers).is_none());

        assert!(session_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("session_1_abc", false);
        assert_eq!(
            cookie,
            "session_id=session_1_abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=31536000"
        );
        assert!(session_cookie("x", true).ends_with("; Secure"));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.9.9.9"));
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.1"));

        headers.remove("x-forwarded-for");
        assert_eq!(client_ip(&headers).as_deref(), Some("10.9.9.9"));

        assert!(client_ip(&HeaderMap::new()).is_none());
    }
}
