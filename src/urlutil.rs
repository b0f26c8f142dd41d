//! URL helpers for the jar: canonical hosts, default paths and scheme
//! classification per RFC 6265 section 5.1.

use std::net::IpAddr;

use url::{Host, Url};

/// Canonical request host per RFC 6265 section 5.1.2: lower case, no
/// trailing dot, no port. IPv6 literals are returned without brackets.
///
/// IDN labels reach us already punycoded because the `url` parser applies
/// IDNA when it parses special-scheme URLs.
pub(crate) fn canonical_host(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(d) => {
            let mut host = d.to_ascii_lowercase();
            if host.ends_with('.') {
                // treat fully qualified names the same as plain ones
                host.pop();
            }
            if host.is_empty() {
                return None;
            }
            Some(host)
        }
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

/// The "directory" of the request path, used when a cookie carries no
/// usable `Path` attribute. RFC 6265 section 5.1.4:
///
/// ```text
///  request path |  default
/// --------------+----------
///  ""           |  "/"
///  "xy/z"       |  "/"
///  "/abc"       |  "/"
///  "/ab/xy/km"  |  "/ab/xy"
///  "/abc/"      |  "/abc"
/// ```
///
/// The trailing slash is stripped during storage to keep `path_match`
/// working on plain prefixes.
pub(crate) fn default_path(url: &Url) -> String {
    let path = url.path();

    if path.is_empty() || !path.starts_with('/') {
        return "/".to_string();
    }

    // path starts with '/', so rfind cannot miss
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => path[..i].to_string(),
    }
}

/// Whether a cookie marked `Secure` may travel on this URL.
pub(crate) fn is_secure(url: &Url) -> bool {
    url.scheme() == "https"
}

/// The jar stores and returns cookies for http(s) URLs only.
pub(crate) fn is_http_like(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Strict IP detection: the host must round-trip through the address
/// parser unchanged. "1.1.1.300" and "123.foo.bar.net" are host names.
pub(crate) fn is_ip(host: &str) -> bool {
    match host.parse::<IpAddr>() {
        Ok(ip) => ip.to_string() == host,
        Err(_) => false,
    }
}
