use std::collections::HashMap;

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::Cookie;
use tracing::warn;

use super::session::SessionStore;

/// Session storage carried by the client as cookies.
///
/// Reads come from the request `Cookie` header; writes are queued as
/// `Set-Cookie` headers and applied to the response with [`CookieStore::apply`].
#[derive(Debug, Default)]
pub struct CookieStore {
    jar: HashMap<String, String>,
    pending: Vec<Cookie<'static>>,
    secure: bool,
}

impl CookieStore {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut jar = HashMap::new();
        for header_value in headers.get_all(header::COOKIE) {
            let Ok(cookie_str) = header_value.to_str() else {
                continue;
            };
            for piece in cookie_str.split(';') {
                if let Ok(c) = Cookie::parse_encoded(piece.trim().to_string()) {
                    jar.insert(c.name().to_string(), c.value().to_string());
                }
            }
        }
        Self {
            jar,
            pending: Vec::new(),
            secure: false,
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Appends the queued `Set-Cookie` headers.
    pub fn apply(self, headers: &mut HeaderMap) {
        for c in self.pending {
            match HeaderValue::from_str(&c.encoded().to_string()) {
                Ok(v) => {
                    headers.append(header::SET_COOKIE, v);
                }
                Err(e) => warn!(error = %e, cookie = c.name(), "unencodable cookie dropped"),
            }
        }
    }
}

impl SessionStore for CookieStore {
    fn get(&self, key: &str) -> Option<String> {
        self.jar.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.jar.insert(key.to_string(), value.to_string());
        let c = Cookie::build((key.to_string(), value.to_string()))
            .path("/")
            .same_site(cookie::SameSite::Lax)
            .secure(self.secure)
            .permanent()
            .build();
        self.pending.push(c);
    }

    fn remove(&mut self, key: &str) {
        self.jar.remove(key);
        let c = Cookie::build((key.to_string(), String::new()))
            .path("/")
            .same_site(cookie::SameSite::Lax)
            .secure(self.secure)
            .max_age(cookie::time::Duration::ZERO)
            .build();
        self.pending.push(c);
    }
}
