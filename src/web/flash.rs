//! One-shot status messages ("flash" messages).
//!
//! Mutating handlers attach a message list to the response as a cookie; the
//! next rendered page reads it, hands the messages to the template, and sends
//! a removal cookie. The message list rides the response explicitly — there
//! is no server-side session state.
//!
//! The payload is the JSON-serialized message list, base64-encoded so it is
//! cookie-safe.

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

pub const COOKIE_NAME: &str = "messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Build the `Set-Cookie` value carrying `messages` to the next page.
pub fn set(messages: &[Flash]) -> String {
    let payload = serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string());
    Cookie::build((COOKIE_NAME, URL_SAFE_NO_PAD.encode(payload)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
        .to_string()
}

/// Build the `Set-Cookie` value that removes the message cookie.
pub fn clear() -> String {
    let mut cookie = Cookie::new(COOKIE_NAME, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie.to_string()
}

/// Read pending messages from the request's `Cookie` header.
///
/// A missing, unparsable, or tampered cookie yields no messages — stale
/// client state must never fail a page render.
pub fn read(headers: &HeaderMap) -> Vec<Flash> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == COOKIE_NAME)
        .and_then(|cookie| URL_SAFE_NO_PAD.decode(cookie.value()).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn set_then_read_returns_the_messages() {
        let header = set(&[
            Flash::success("Task added successfully!"),
            Flash::error("Something went wrong!"),
        ]);
        let pair = header.split(';').next().unwrap();
        let messages = read(&headers_with_cookie(pair));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].level, Level::Success);
        assert_eq!(messages[0].message, "Task added successfully!");
        assert_eq!(messages[1].level, Level::Error);
    }

    #[test]
    fn read_finds_the_cookie_among_others() {
        let header = set(&[Flash::success("hi")]);
        let pair = header.split(';').next().unwrap();
        let messages = read(&headers_with_cookie(&format!("theme=dark; {pair}; sid=abc")));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn garbage_cookie_yields_no_messages() {
        assert!(read(&headers_with_cookie("messages=%%%not-base64")).is_empty());
        assert!(read(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn clear_expires_the_cookie() {
        let header = clear();
        assert!(header.starts_with("messages="));
        assert!(header.contains("Max-Age=0"));
    }
}
