//! Cookie handling.
//!
//! `Set-Cookie` values from the upstream are parsed into a name/value pair
//! and an ordered attribute list, mutated, then written back. Attributes the
//! gateway does not touch keep their position, spelling and value.

use std::fmt;

use axum::http::{header, HeaderMap};

/// One `;`-separated attribute of a `Set-Cookie` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttribute {
    pub name: String,
    pub value: Option<String>,
}

impl CookieAttribute {
    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A parsed `Set-Cookie` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub attributes: Vec<CookieAttribute>,
}

impl SetCookie {
    /// Parse a `Set-Cookie` value. Returns `None` for a blank value.
    ///
    /// A leading pair without `=` is kept as a nameless value, the way
    /// browsers store it.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(';');
        let pair = parts.next()?.trim();
        if pair.is_empty() {
            return None;
        }

        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
            None => (String::new(), pair.to_string()),
        };

        let attributes = parts
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((name, value)) => CookieAttribute {
                    name: name.trim().to_string(),
                    value: Some(value.trim().to_string()),
                },
                None => CookieAttribute {
                    name: part.to_string(),
                    value: None,
                },
            })
            .collect();

        Some(Self {
            name,
            value,
            attributes,
        })
    }

    /// First attribute named `name` (case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<&CookieAttribute> {
        self.attributes.iter().find(|attr| attr.is(name))
    }

    pub fn domain(&self) -> Option<&str> {
        self.attribute("Domain").and_then(|attr| attr.value.as_deref())
    }

    /// Replace the value of every `Domain` attribute. Returns false when the
    /// cookie has none; no attribute is added in that case.
    pub fn replace_domain(&mut self, domain: &str) -> bool {
        let mut replaced = false;
        for attr in self.attributes.iter_mut().filter(|attr| attr.is("Domain")) {
            attr.value = Some(domain.to_string());
            replaced = true;
        }
        replaced
    }

    pub fn is_secure(&self) -> bool {
        self.attribute("Secure").is_some()
    }

    /// Append `Secure` unless already present.
    pub fn ensure_secure(&mut self) {
        if !self.is_secure() {
            self.attributes.push(CookieAttribute {
                name: "Secure".to_string(),
                value: None,
            });
        }
    }

    pub fn same_site(&self) -> Option<&str> {
        self.attribute("SameSite").and_then(|attr| attr.value.as_deref())
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.value)?;
        } else {
            write!(f, "{}={}", self.name, self.value)?;
        }
        for attr in &self.attributes {
            match &attr.value {
                Some(value) => write!(f, "; {}={}", attr.name, value)?,
                None => write!(f, "; {}", attr.name)?,
            }
        }
        Ok(())
    }
}

/// Rewrite an upstream `Set-Cookie` value for delivery under `host`.
///
/// `Domain` becomes `host` (without port) when present, `Secure` is always
/// ensured and `SameSite` is left as received. Blank values are returned as is.
pub fn rewrite_set_cookie(raw: &str, host: Option<&str>) -> String {
    let Some(mut cookie) = SetCookie::parse(raw) else {
        return raw.to_string();
    };

    if let Some(host) = host.map(host_without_port).filter(|h| !h.is_empty()) {
        cookie.replace_domain(host);
    }
    cookie.ensure_secure();
    cookie.to_string()
}

/// Strip the port from a `Host` header value, keeping IPv6 brackets.
pub fn host_without_port(host: &str) -> &str {
    let host = host.trim();
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Look up a request cookie by name across every `Cookie` header.
pub fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}
