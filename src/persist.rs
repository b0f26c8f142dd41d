//! Saving and restoring jar contents.
//!
//! The wire form is a JSON array of mirror records with unix-nanosecond
//! timestamps. Only the round-trip filter is contractual: encoding keeps
//! non-expired records that carry an explicit expiry, decoding applies the
//! same filter again, so session cookies and stale persistent cookies
//! never survive a round trip. Both storage backends share this payload
//! shape, which also lets a flat jar's payload load into a partitioned
//! one and vice versa.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::cookie::Cookie;
use crate::jar::Jar;

/// Errors from the persistence hook and the file helpers.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The in-memory records could not be serialised.
    #[error("cookie payload could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The payload is not a cookie payload.
    #[error("cookie payload is malformed: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// A timestamp in the payload is outside the representable range.
    #[error("cookie timestamp out of range in payload")]
    InvalidTimestamp,

    /// Reading or writing the backing file failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Serialisable mirror of a stored cookie. `expires` is mandatory here:
/// session cookies are filtered out before this struct is built.
#[derive(Debug, Serialize, Deserialize)]
struct PersistentCookie {
    name: String,
    value: String,
    domain: String,
    path: String,
    expires_unix_nanos: i128,
    secure: bool,
    http_only: bool,
    host_only: bool,
    created_unix_nanos: i128,
    last_access_unix_nanos: i128,
}

impl PersistentCookie {
    fn from_cookie(cookie: &Cookie, expires: OffsetDateTime) -> Self {
        PersistentCookie {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
            expires_unix_nanos: expires.unix_timestamp_nanos(),
            secure: cookie.secure,
            http_only: cookie.http_only,
            host_only: cookie.host_only,
            created_unix_nanos: cookie.created.unix_timestamp_nanos(),
            last_access_unix_nanos: cookie.last_access.unix_timestamp_nanos(),
        }
    }

    fn into_cookie(self) -> Result<Cookie, PersistError> {
        let ts = |nanos| {
            OffsetDateTime::from_unix_timestamp_nanos(nanos)
                .map_err(|_| PersistError::InvalidTimestamp)
        };
        Ok(Cookie {
            name: self.name,
            value: self.value,
            domain: self.domain,
            path: self.path,
            expires: Some(ts(self.expires_unix_nanos)?),
            secure: self.secure,
            http_only: self.http_only,
            host_only: self.host_only,
            created: ts(self.created_unix_nanos)?,
            last_access: ts(self.last_access_unix_nanos)?,
        })
    }
}

/// Serialise every non-expired record with an explicit expiry.
pub(crate) fn encode_records<'a, I>(cookies: I, now: OffsetDateTime) -> Result<Vec<u8>, PersistError>
where
    I: Iterator<Item = &'a Cookie>,
{
    let records: Vec<PersistentCookie> = cookies
        .filter_map(|c| match c.expires {
            Some(expires) if !c.is_expired(now) && !c.is_empty_slot() => {
                Some(PersistentCookie::from_cookie(c, expires))
            }
            _ => None,
        })
        .collect();
    serde_json::to_vec(&records).map_err(PersistError::Serialize)
}

/// Deserialise a payload, dropping records that have expired since it was
/// written. Malformed payloads are reported to the caller.
pub(crate) fn decode_records(data: &[u8], now: OffsetDateTime) -> Result<Vec<Cookie>, PersistError> {
    let records: Vec<PersistentCookie> =
        serde_json::from_slice(data).map_err(PersistError::Deserialize)?;

    let mut cookies = Vec::with_capacity(records.len());
    for record in records {
        let cookie = record.into_cookie()?;
        if cookie.is_expired(now) {
            continue;
        }
        cookies.push(cookie);
    }
    Ok(cookies)
}

/// Write the jar's persistent cookies to `path`.
pub fn save(jar: &Jar, path: &Path) -> Result<(), PersistError> {
    let payload = jar.encode()?;
    fs::write(path, payload)?;
    Ok(())
}

/// Replace the jar's contents with the cookies stored at `path`.
pub fn load(jar: &Jar, path: &Path) -> Result<(), PersistError> {
    let payload = fs::read(path)?;
    jar.decode(&payload)
}
