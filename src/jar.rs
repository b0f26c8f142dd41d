//! The cookie jar: acceptance pipeline, retrieval ordering, cap
//! enforcement and the persistence entry points.

use std::sync::Mutex;

use thiserror::Error;
use time::{Duration, OffsetDateTime};
use url::Url;

use crate::cookie::{Cookie, SetCookie};
use crate::persist::PersistError;
use crate::psl;
use crate::storage::flat::FlatStorage;
use crate::storage::partitioned::{DomainKey, PartitionedStorage};
use crate::storage::Storage;
use crate::urlutil;

/// RFC 6265 section 6.1 asks user agents for at least 50 cookies per
/// domain, 3000 cookies in total and 4096 bytes per cookie; these are the
/// construction defaults.
const MAX_COOKIES_PER_DOMAIN: usize = 50;
const MAX_COOKIES_TOTAL: usize = 3000;
const MAX_BYTES_PER_COOKIE: usize = 4096;

/// Construction-time jar configuration. Immutable afterwards: changing a
/// cap at runtime would race the cleanup pass, so resizing means building
/// a new jar and feeding it the old jar's `encode` output.
#[derive(Debug, Clone)]
pub struct JarConfig {
    /// Cap across the whole jar; 0 means unlimited.
    pub max_cookies_total: usize,
    /// Cap per logical domain; 0 means unlimited.
    pub max_cookies_per_domain: usize,
    /// Cookies whose name plus value exceed this many bytes are dropped
    /// silently; 0 means unlimited.
    pub max_bytes_per_cookie: usize,
    /// Partition storage by registrable domain instead of keeping one
    /// flat list.
    pub partitioned: bool,
    /// Accept a host cookie for an IP-literal host whose `Domain`
    /// attribute equals the host, the way common browsers do.
    pub allow_ip_host_cookie: bool,
    /// Refuse domain cookies for public suffixes such as `co.uk`.
    pub reject_public_suffixes: bool,
}

impl Default for JarConfig {
    fn default() -> Self {
        JarConfig {
            max_cookies_total: MAX_COOKIES_TOTAL,
            max_cookies_per_domain: MAX_COOKIES_PER_DOMAIN,
            max_bytes_per_cookie: MAX_BYTES_PER_COOKIE,
            partitioned: false,
            allow_ip_host_cookie: false,
            reject_public_suffixes: true,
        }
    }
}

/// Why the acceptance pipeline refused a cookie. Rejections are silent by
/// design and only show up in trace logs and internal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Domain cookies need a hostname; the request host is an IP literal.
    #[error("request host is not a hostname")]
    NoHostname,
    /// `Domain=.` or `Domain=..something`.
    #[error("malformed domain attribute")]
    Malformed,
    /// The domain attribute carries no dot; TLDs take no domain cookies.
    #[error("domain cookies may not be set for a TLD")]
    TldCookieForbidden,
    /// The domain attribute names a public suffix of another host.
    #[error("domain attribute is a public suffix")]
    IllegalPublicSuffix,
    /// The request host is not the attribute domain or a subdomain of it.
    #[error("domain attribute does not cover the request host")]
    BadDomain,
    /// Name plus value exceed the per-cookie byte limit.
    #[error("cookie exceeds the per-cookie byte limit")]
    Oversize,
}

/// What one received cookie did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpdateAction {
    Invalid(RejectReason),
    Create,
    Update,
    Delete,
    NoSuchCookie,
}

/// An RFC 6265 cookie store for http(s) URLs.
///
/// One coarse mutex guards every operation for its whole duration; the
/// jar performs no blocking work while holding it. The lock is not
/// reentrant: jar methods must not be called from within another call on
/// the same jar.
pub struct Jar {
    config: JarConfig,
    storage: Mutex<Box<dyn Storage + Send>>,
}

impl Default for Jar {
    fn default() -> Self {
        Jar::new(JarConfig::default())
    }
}

impl Jar {
    pub fn new(config: JarConfig) -> Self {
        let storage: Box<dyn Storage + Send> = if config.partitioned {
            Box::new(PartitionedStorage::new(DomainKey::EffectiveTldPlusOne))
        } else {
            // the flat cap enables find-time slot recycling at capacity
            Box::new(FlatStorage::new(config.max_cookies_total))
        };
        Jar {
            config,
            storage: Mutex::new(storage),
        }
    }

    pub fn config(&self) -> &JarConfig {
        &self.config
    }

    /// Ingest the cookies received in a response to a request on `url`.
    ///
    /// Non-http(s) URLs are ignored entirely. Unacceptable cookies are
    /// dropped silently. Each processed cookie advances the working clock
    /// by one nanosecond so creation and access times totally order the
    /// batch even on coarse system clocks.
    pub fn set_cookies(&self, url: &Url, cookies: &[SetCookie]) {
        if !urlutil::is_http_like(url) {
            return;
        }
        let host = match urlutil::canonical_host(url) {
            Some(host) => host,
            None => return,
        };
        let default_path = urlutil::default_path(url);
        let mut now = OffsetDateTime::now_utc();

        let mut storage = self.lock_storage();
        for received in cookies {
            let action = update(&self.config, storage.as_mut(), &host, &default_path, now, received);
            if let UpdateAction::Invalid(reason) = action {
                tracing::trace!(name = %received.name, %reason, "ignoring cookie");
            }
            now += Duration::nanoseconds(1);
        }

        storage.cleanup(
            self.config.max_cookies_total,
            self.config.max_cookies_per_domain,
            now,
        );
    }

    /// The ordered `(name, value)` list a request to `url` would carry:
    /// longer paths first, then earlier creation (RFC 6265 section 5.4).
    ///
    /// Every returned cookie gets a fresh, strictly increasing access
    /// time, so recently read cookies survive cap eviction.
    pub fn cookies(&self, url: &Url) -> Vec<(String, String)> {
        if !urlutil::is_http_like(url) {
            return Vec::new();
        }
        let host = match urlutil::canonical_host(url) {
            Some(host) => host,
            None => return Vec::new(),
        };
        let secure = urlutil::is_secure(url);
        let path = match url.path() {
            "" => "/",
            p => p,
        };
        let mut now = OffsetDateTime::now_utc();

        let mut storage = self.lock_storage();
        let mut selection = storage.retrieve(&host, path, secure, now);
        selection.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.created.cmp(&b.created))
        });

        let mut pairs = Vec::with_capacity(selection.len());
        for cookie in selection {
            cookie.last_access = now;
            now += Duration::nanoseconds(1);
            pairs.push((cookie.name.clone(), cookie.value.clone()));
        }
        pairs
    }

    /// Snapshot of every cookie that is not expired at `now`, sweeping
    /// the ones that are. Ingest and retrieval read the real clock, but
    /// this takes `now` as an argument so tests can step a synthetic
    /// clock across expiry boundaries without sleeping.
    pub fn all(&self, now: OffsetDateTime) -> Vec<Cookie> {
        self.lock_storage().all(now)
    }

    /// Serialise the jar's persistent cookies: session cookies and
    /// expired records are left out.
    pub fn encode(&self) -> Result<Vec<u8>, PersistError> {
        let now = OffsetDateTime::now_utc();
        self.lock_storage().encode(now)
    }

    /// Replace the jar's contents with a payload from [`Jar::encode`],
    /// dropping whatever has expired since it was written.
    pub fn decode(&self, data: &[u8]) -> Result<(), PersistError> {
        let now = OffsetDateTime::now_utc();
        self.lock_storage().decode(data, now)
    }

    fn lock_storage(&self) -> std::sync::MutexGuard<'_, Box<dyn Storage + Send>> {
        // a poisoning panic cannot leave records in an unusable state,
        // only in a partially updated one, so keep serving
        match self.storage.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Store, update or delete one received cookie. `host` is the canonical
/// request host, `default_path` the directory of the request path.
fn update(
    config: &JarConfig,
    storage: &mut dyn Storage,
    host: &str,
    default_path: &str,
    now: OffsetDateTime,
    received: &SetCookie,
) -> UpdateAction {
    if config.max_bytes_per_cookie > 0
        && received.name.len() + received.value.len() > config.max_bytes_per_cookie
    {
        return UpdateAction::Invalid(RejectReason::Oversize);
    }

    let (domain, host_only) = match domain_and_type(config, host, &received.domain) {
        Ok(pair) => pair,
        Err(reason) => return UpdateAction::Invalid(reason),
    };

    let path = if received.path.is_empty() || !received.path.starts_with('/') {
        default_path.to_string()
    } else {
        received.path.clone()
    };

    // Max-Age takes precedence over Expires
    let mut delete_request = false;
    let mut expires = None;
    if received.max_age < 0 {
        delete_request = true;
    } else if received.max_age > 0 {
        expires = Some(now + Duration::seconds(received.max_age));
    } else if let Some(exp) = received.expires {
        if exp < now {
            delete_request = true;
        } else {
            expires = Some(exp);
        }
    }

    if delete_request {
        return if storage.delete(&domain, &path, &received.name) {
            UpdateAction::Delete
        } else {
            UpdateAction::NoSuchCookie
        };
    }

    let cookie = storage.find(&domain, &path, &received.name, now);
    if cookie.is_empty_slot() {
        cookie.name = received.name.clone();
        cookie.value = received.value.clone();
        cookie.domain = domain;
        cookie.path = path;
        cookie.expires = expires;
        cookie.secure = received.secure;
        cookie.http_only = received.http_only;
        cookie.host_only = host_only;
        cookie.created = now;
        cookie.last_access = now;
        UpdateAction::Create
    } else {
        // identity fields and the creation time stay put
        cookie.value = received.value.clone();
        cookie.expires = expires;
        cookie.secure = received.secure;
        cookie.http_only = received.http_only;
        cookie.host_only = host_only;
        cookie.last_access = now;
        UpdateAction::Update
    }
}

/// Decide the stored domain and the host-only flag for a cookie received
/// from `host` with the given `Domain` attribute (RFC 6265 section 5.3
/// steps 4 to 6).
fn domain_and_type(
    config: &JarConfig,
    host: &str,
    domain_attr: &str,
) -> Result<(String, bool), RejectReason> {
    if domain_attr.is_empty() {
        // no Domain attribute: a host cookie
        return Ok((host.to_string(), true));
    }

    if urlutil::is_ip(host) {
        if config.allow_ip_host_cookie && domain_attr == host {
            // browsers accept this; RFC 6265 domain matching does not
            return Ok((host.to_string(), true));
        }
        return Err(RejectReason::NoHostname);
    }

    let stripped = domain_attr.strip_prefix('.').unwrap_or(domain_attr);
    let domain = stripped.to_ascii_lowercase();
    if domain.is_empty() || domain.starts_with('.') {
        // "Domain=." or "Domain=..something"
        return Err(RejectReason::Malformed);
    }

    if !domain.contains('.') {
        return Err(RejectReason::TldCookieForbidden);
    }

    if config.reject_public_suffixes && !psl::allow_domain_cookie(&domain) {
        // RFC 6265 section 5.3 step 5: a public suffix identical to the
        // request host degrades to a host cookie, anything else is refused
        if host == domain_attr {
            return Ok((host.to_string(), true));
        }
        return Err(RejectReason::IllegalPublicSuffix);
    }

    if host != domain && !host.ends_with(&format!(".{domain}")) {
        return Err(RejectReason::BadDomain);
    }

    Ok((domain, false))
}
