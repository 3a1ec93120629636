//! Authenticated device sessions

use bravia_http::HttpRequest;

use crate::service::Service;

/// Header carrying a pre-shared key
pub const PSK_HEADER: &str = "X-Auth-PSK";

/// Session cookies returned by a successful registration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    /// Collect `name=value` pairs from `Set-Cookie` header values, ignoring
    /// attributes such as `Path` and `max-age`.
    pub fn from_set_cookie<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut jar = Self::default();
        for header in headers {
            let pair = header.split(';').next().unwrap_or_default().trim();
            if let Some((name, value)) = pair.split_once('=') {
                jar.insert(name.trim(), value.trim());
            }
        }
        jar
    }

    /// Insert or replace a cookie
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.cookies.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.cookies.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for a `Cookie` request header
    pub fn header_value(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// How a session proves itself to the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    PreSharedKey(String),
    Cookies(CookieJar),
}

/// An authenticated connection to one device.
///
/// Sessions are immutable; re-registering produces a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_address: String,
    credential: Credential,
}

impl Session {
    pub fn with_psk(base_address: impl Into<String>, psk: impl Into<String>) -> Self {
        Self {
            base_address: base_address.into(),
            credential: Credential::PreSharedKey(psk.into()),
        }
    }

    pub fn with_cookies(base_address: impl Into<String>, cookies: CookieJar) -> Self {
        Self {
            base_address: base_address.into(),
            credential: Credential::Cookies(cookies),
        }
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn service_url(&self, service: Service) -> String {
        service.url(&self.base_address)
    }

    pub fn ircc_url(&self) -> String {
        format!("http://{}/sony/IRCC", self.base_address)
    }

    /// Host part of the base address, without any port
    pub fn host(&self) -> &str {
        host_of(&self.base_address)
    }

    /// Attach the credential to an outgoing request.
    ///
    /// A PSK session sends only the PSK header; a cookie session sends only
    /// its cookies.
    pub fn authorize(&self, request: HttpRequest) -> HttpRequest {
        match &self.credential {
            Credential::PreSharedKey(psk) => request.header(PSK_HEADER, psk.as_str()),
            Credential::Cookies(jar) if jar.is_empty() => request,
            Credential::Cookies(jar) => request.header("Cookie", jar.header_value()),
        }
    }
}

/// Strip a `:port` suffix, leaving bracketed IPv6 literals intact
pub(crate) fn host_of(address: &str) -> &str {
    if let Some(rest) = address.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match address.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => address,
    }
}
