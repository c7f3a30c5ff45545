use axum::http::header::{InvalidHeaderValue, COOKIE};
use axum::http::{HeaderMap, HeaderValue};

use super::token::TOKEN_TTL_SECS;

/// Name of the cookie carrying the session credential.
pub const TOKEN_COOKIE: &str = "token";

/// Cookie attributes for the session credential.
///
/// Production serves a front-end from another origin over HTTPS, so the cookie
/// must be `Secure` and `SameSite=None`; elsewhere it stays same-site only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookiePolicy {
    pub production: bool,
}

impl CookiePolicy {
    pub fn new(production: bool) -> Self { Self { production } }

    fn attributes(&self) -> &'static str {
        if self.production {
            "HttpOnly; Secure; SameSite=None; Path=/"
        } else {
            "HttpOnly; SameSite=Strict; Path=/"
        }
    }

    /// `Set-Cookie` value storing the credential for its whole lifetime.
    pub fn issue(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&format!("{}={}; Max-Age={}; {}", TOKEN_COOKIE, token, TOKEN_TTL_SECS, self.attributes()))
    }

    /// `Set-Cookie` value telling the client to drop the credential.
    pub fn clear(&self) -> HeaderValue {
        let value = match self.production {
            true => "token=; Max-Age=0; HttpOnly; Secure; SameSite=None; Path=/",
            false => "token=; Max-Age=0; HttpOnly; SameSite=Strict; Path=/",
        };
        HeaderValue::from_static(value)
    }
}

/// Find a cookie by name across all `Cookie` headers. Empty values count as absent.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(s) = header.to_str() else { continue; };
        for part in s.split(';') {
            let Some((k, v)) = part.trim().split_once('=') else { continue; };
            if k == name && !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }
    None
}
