//! Attributes of the CSRF cookie

use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};
use serde::Deserialize;

/// Default CSRF cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "_csrf";

/// Default cookie lifetime in seconds: 12 hours.
pub const DEFAULT_MAX_AGE: i64 = 60 * 60 * 12;

/// Latest `Expires` ever written, 9999-12-31T23:59:59Z.
const MAX_EXPIRES_UNIX: i64 = 253_402_300_799;

/// `SameSite` policy for the CSRF cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSiteMode {
    /// Omit the attribute and let the browser apply its default.
    Default,
    /// `SameSite=Lax`
    Lax,
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=None`
    None,
}

impl SameSiteMode {
    /// The `cookie` crate value for this mode, `None` when the attribute is omitted.
    pub fn as_same_site(self) -> Option<SameSite> {
        match self {
            Self::Default => None,
            Self::Lax => Some(SameSite::Lax),
            Self::Strict => Some(SameSite::Strict),
            Self::None => Some(SameSite::None),
        }
    }
}

/// Attributes carried by every CSRF cookie a store writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    /// Cookie name, also the name the sealed value is bound to.
    /// Default: "_csrf"
    pub name: String,

    /// Lifetime in seconds. Zero or negative writes a session cookie.
    /// Default: 12 hours
    pub max_age: i64,

    /// Mark the cookie `Secure`.
    /// Default: true
    pub secure: bool,

    /// Mark the cookie `HttpOnly`.
    /// Default: true
    pub http_only: bool,

    /// Cookie path.
    /// Default: "/"
    pub path: String,

    /// Cookie domain. Default: None
    pub domain: Option<String>,

    /// SameSite policy. Default: Lax
    pub same_site: SameSiteMode,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            max_age: DEFAULT_MAX_AGE,
            secure: true,
            http_only: true,
            path: "/".to_string(),
            domain: None,
            same_site: SameSiteMode::Lax,
        }
    }
}

impl CookieOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the lifetime in seconds.
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    /// Set the secure flag.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the HttpOnly flag.
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set the cookie path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the SameSite policy.
    pub fn same_site(mut self, same_site: SameSiteMode) -> Self {
        self.same_site = same_site;
        self
    }

    /// Whether cookies written with these options outlive the browser session.
    pub fn is_persistent(&self) -> bool {
        self.max_age > 0
    }

    /// Build the cookie for `value` as issued at `issued_at`.
    pub fn cookie_at(&self, value: String, issued_at: OffsetDateTime) -> Cookie<'static> {
        let mut builder = Cookie::build((self.name.clone(), value))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only);

        if let Some(same_site) = self.same_site.as_same_site() {
            builder = builder.same_site(same_site);
        }

        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            builder = builder.domain(domain.to_string());
        }

        if self.is_persistent() {
            let lifetime = Duration::seconds(self.max_age);
            builder = builder.max_age(lifetime);
            if let Some(expires) = expires_at(issued_at, lifetime) {
                builder = builder.expires(expires);
            }
        }

        builder.build()
    }
}

/// `issued_at + lifetime`, clamped to the last second of year 9999.
fn expires_at(issued_at: OffsetDateTime, lifetime: Duration) -> Option<OffsetDateTime> {
    issued_at
        .checked_add(lifetime)
        .filter(|expires| expires.unix_timestamp() <= MAX_EXPIRES_UNIX)
        .or_else(|| OffsetDateTime::from_unix_timestamp(MAX_EXPIRES_UNIX).ok())
}
