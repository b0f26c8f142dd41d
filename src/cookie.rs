//! The stored cookie record and the structured `Set-Cookie` attributes
//! handed to the jar by its HTTP client.

use time::OffsetDateTime;

/// A cookie as kept inside a storage backend.
///
/// `domain` carries no leading dot and is lower case; `path` carries no
/// trailing slash unless it is `/` itself. A record with an empty name is
/// a reusable empty slot, not a cookie — storage hands such slots back
/// from `find` and the jar fills them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// `None` marks a session cookie.
    pub expires: Option<OffsetDateTime>,
    pub secure: bool,
    pub http_only: bool,
    /// Set when the cookie was created without a `Domain` attribute; only
    /// exact-host requests may match it.
    pub host_only: bool,
    pub created: OffsetDateTime,
    pub last_access: OffsetDateTime,
}

impl Default for Cookie {
    fn default() -> Self {
        Cookie {
            name: String::new(),
            value: String::new(),
            domain: String::new(),
            path: String::new(),
            expires: None,
            secure: false,
            http_only: false,
            host_only: false,
            created: OffsetDateTime::UNIX_EPOCH,
            last_access: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

impl Cookie {
    /// An empty slot awaiting population.
    pub(crate) fn is_empty_slot(&self) -> bool {
        self.name.is_empty()
    }

    /// Turn this record back into an empty slot so the caller can tell
    /// "fresh" from "existing" after a `find`.
    pub(crate) fn clear(&mut self) {
        self.name.clear();
        self.value.clear();
    }

    /// Whether the record is past its expiry. Session cookies never
    /// expire here; they die with the jar.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        match self.expires {
            Some(expires) => expires < now,
            None => false,
        }
    }

    /// RFC 6265 section 5.1.3 domain matching: the host equals the cookie
    /// domain, or the cookie is a domain cookie, its domain is a
    /// dot-aligned suffix of the host, and the host is a host name rather
    /// than an IP literal. The IP check guards request hosts like
    /// `1.2.3.4` against domain cookies with a numeric suffix such as
    /// `2.3.4` set from an unrelated host name.
    pub(crate) fn domain_match(&self, host: &str) -> bool {
        if self.domain == host {
            return true;
        }
        !self.host_only
            && !crate::urlutil::is_ip(host)
            && host.len() > self.domain.len()
            && host.ends_with(&self.domain)
            && host.as_bytes()[host.len() - self.domain.len() - 1] == b'.'
    }

    /// RFC 6265 section 5.1.4 path matching: identical paths, or the
    /// cookie path is a prefix ending in `/`, or the first uncovered
    /// request character is `/`.
    pub(crate) fn path_match(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        if request_path.starts_with(&self.path) {
            if self.path.ends_with('/') {
                // "/any/" covers "/any/path"
                return true;
            }
            if request_path.as_bytes().get(self.path.len()) == Some(&b'/') {
                // "/any" covers "/any/some"
                return true;
            }
        }
        false
    }

    /// Whether to attach this cookie to a request for `host` and `path`.
    /// Secure cookies travel only on secure requests.
    pub(crate) fn should_send(
        &self,
        host: &str,
        path: &str,
        secure: bool,
        now: OffsetDateTime,
    ) -> bool {
        self.domain_match(host)
            && self.path_match(path)
            && !self.is_expired(now)
            && (secure || !self.secure)
    }
}

/// Structured attributes of one received `Set-Cookie` header. Parsing the
/// header line is the HTTP client's job; the jar only decides acceptance.
#[derive(Debug, Clone, Default)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    /// The `Domain` attribute, verbatim; empty when absent.
    pub domain: String,
    /// The `Path` attribute, verbatim; empty when absent.
    pub path: String,
    /// Absolute `Expires`, if present.
    pub expires: Option<OffsetDateTime>,
    /// `Max-Age` in seconds: negative requests deletion, zero means the
    /// attribute was absent, positive wins over `expires`.
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
}
