//! Masking of credentials in printed HTTP logs.
//!
//! The bearer token, the Basic credentials used for deletion and the
//! password posted to the auth endpoint would otherwise end up in the
//! terminal whenever `--capture-http` is on.

use http::header::{HeaderMap, HeaderValue};
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// The mask string used to replace sensitive values.
const MASK: &str = "*****";

/// Global flag for masking (set by the CLI at startup).
static MASK_SENSITIVE: AtomicBool = AtomicBool::new(true);

pub fn set_mask_sensitive(enabled: bool) {
    MASK_SENSITIVE.store(enabled, Ordering::Relaxed);
}

pub fn should_mask_sensitive() -> bool {
    MASK_SENSITIVE.load(Ordering::Relaxed)
}

/// Query parameter and JSON field names to mask (case-insensitive comparison).
const SENSITIVE_KEYS: &[&str] = &[
    "access_token",
    "api_key",
    "apikey",
    "token",
    "secret",
    "password",
];

/// Header names to mask (case-insensitive comparison).
const SENSITIVE_HEADERS: &[&str] = &["authorization", "x-api-key", "cookie", "set-cookie"];

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|&k| key == k)
}

/// Masks sensitive query parameters in a URL, keeping the original encoding of the rest.
pub fn mask_url(url: &Url) -> Url {
    let mut masked_url = url.clone();

    let Some(query) = url.query() else {
        return masked_url;
    };

    let masked_query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _value)) if is_sensitive_key(key) => format!("{key}={MASK}"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    masked_url.set_query(Some(&masked_query));
    masked_url
}

/// Masks sensitive header values in a HeaderMap.
pub fn mask_headers(headers: &HeaderMap) -> HeaderMap {
    let mut masked = HeaderMap::new();

    for (name, value) in headers.iter() {
        let name_lower = name.as_str().to_lowercase();
        let masked_value = if SENSITIVE_HEADERS.iter().any(|&h| name_lower == h) {
            HeaderValue::from_static(MASK)
        } else {
            value.clone()
        };
        masked.append(name.clone(), masked_value);
    }

    masked
}

/// Masks sensitive fields of a JSON body at any depth. Non-JSON bodies are returned as-is.
pub fn mask_json_body(body: &str) -> String {
    fn walk(value: &mut serde_json::Value) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, v) in map.iter_mut() {
                    if is_sensitive_key(key) {
                        *v = serde_json::Value::String(MASK.to_string());
                    } else {
                        walk(v);
                    }
                }
            }
            serde_json::Value::Array(items) => items.iter_mut().for_each(walk),
            _ => {}
        }
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(mut value) => {
            walk(&mut value);
            value.to_string()
        }
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    fn url_with_token() {
        let url = Url::parse("https://booker.example.com/booking?token=abc&firstname=Ivan").unwrap();
        let masked = mask_url(&url).to_string();
        assert!(masked.contains("token=*****"));
        assert!(masked.contains("firstname=Ivan"));
    }

    #[test]
    fn url_case_insensitive_and_repeated() {
        let url = Url::parse("https://booker.example.com/?TOKEN=a&token=b&checkin=2025-01-01")
            .unwrap();
        let masked = mask_url(&url).to_string();
        assert!(masked.contains("TOKEN=*****&token=*****"));
        assert!(masked.contains("checkin=2025-01-01"));
    }

    #[test]
    fn url_without_query_is_unchanged() {
        let url = Url::parse("https://booker.example.com/booking/1").unwrap();
        assert_eq!(mask_url(&url), url);
    }

    #[test]
    fn bearer_and_basic_are_masked() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer abc".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        let masked = mask_headers(&headers);
        assert_eq!(masked.get("authorization").unwrap(), "*****");
        assert_eq!(masked.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn auth_payload_is_masked() {
        let masked = mask_json_body(r#"{"username":"admin","password":"password123"}"#);
        assert!(masked.contains("\"username\":\"admin\""));
        assert!(masked.contains("\"password\":\"*****\""));

        let masked = mask_json_body(r#"{"token":"abc123"}"#);
        assert_eq!(masked, r#"{"token":"*****"}"#);
    }

    #[test]
    fn nested_and_non_json_bodies() {
        let masked = mask_json_body(r#"[{"session":{"token":"x"}}]"#);
        assert_eq!(masked, r#"[{"session":{"token":"*****"}}]"#);
        assert_eq!(mask_json_body("Internal Server Error"), "Internal Server Error");
    }

    #[test]
    #[serial]
    fn toggle_masking() {
        set_mask_sensitive(false);
        assert!(!should_mask_sensitive());

        set_mask_sensitive(true);
        assert!(should_mask_sensitive());
    }
}
