/// Flash-notice cookie helpers
///
/// Browser-facing handlers never leave the user on an error page: they
/// attach a one-shot human-readable notice to a `flash` cookie and
/// redirect to a safe default. The next dashboard render consumes the
/// notice and clears the cookie.
///
/// Messages are percent-encoded so arbitrary text survives the cookie
/// value grammar.
use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};

/// Name of the one-shot notice cookie
pub const FLASH_COOKIE: &str = "flash";

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Builds a redirect carrying a flash notice
///
/// The notice lives for one minute at most; the dashboard clears it
/// eagerly on render.
pub fn flash_redirect(message: &str, to: &str) -> Response {
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age=60",
        FLASH_COOKIE,
        percent_encode(message)
    );
    with_set_cookie(Redirect::to(to), &cookie)
}

/// Reads (without clearing) the pending flash notice, if any
pub fn peek_flash(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, FLASH_COOKIE).map(percent_decode)
}

/// Cookie string that removes the flash cookie
pub fn clear_flash_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", FLASH_COOKIE)
}

/// Cookie string that establishes a login session
pub fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

/// Cookie string that ends the login session
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Attaches a `Set-Cookie` header to any response
pub fn with_set_cookie(response: impl IntoResponse, cookie: &str) -> Response {
    let mut response = response.into_response();
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Extracts a named cookie's raw value from the `Cookie` header
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(header::COOKIE)?.to_str().ok()?;

    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Percent-encodes everything outside the cookie-safe unreserved set
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Decodes a percent-encoded cookie value
///
/// Malformed escapes are passed through verbatim rather than rejected;
/// a garbled notice beats a dropped one.
fn percent_decode(input: String) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
            ) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_encode_decode_roundtrip() {
        let messages = [
            "Task added successfully!",
            "Invalid due date: 01/02/2024",
            "plain",
            "100% done; really=yes",
        ];

        for message in messages {
            let encoded = percent_encode(message);
            assert!(!encoded.contains(' '));
            assert!(!encoded.contains(';'));
            assert_eq!(percent_decode(encoded), message);
        }
    }

    #[test]
    fn test_malformed_escape_passes_through() {
        assert_eq!(percent_decode("50%".to_string()), "50%");
        assert_eq!(percent_decode("%ZZoops".to_string()), "%ZZoops");
    }

    #[test]
    fn test_cookie_value_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session=abc123; flash=Task%20added"),
        );

        assert_eq!(cookie_value(&headers, "session").as_deref(), Some("abc123"));
        assert_eq!(
            cookie_value(&headers, "flash").as_deref(),
            Some("Task%20added")
        );
        assert!(cookie_value(&headers, "other").is_none());
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert!(cookie_value(&headers, "session").is_none());
    }

    #[test]
    fn test_peek_flash_decodes() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("flash=Task%20added%20successfully%21"),
        );
        assert_eq!(
            peek_flash(&headers).as_deref(),
            Some("Task added successfully!")
        );
    }

    #[test]
    fn test_flash_redirect_sets_cookie_and_redirects() {
        let response = flash_redirect("Task added successfully!", "/dashboard");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("flash="));
        assert!(cookie.contains("HttpOnly"));

        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/dashboard");
    }
}
