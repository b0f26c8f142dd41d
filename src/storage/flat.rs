//! The flat backend: one unsorted vector, scanned linearly.

use std::collections::HashMap;

use time::OffsetDateTime;

use crate::cookie::Cookie;
use crate::leastused::LeastUsed;
use crate::persist::{self, PersistError};
use crate::storage::Storage;

/// A linear store of cookies with an optional capacity.
///
/// With `max_cookies > 0`, `find` reuses the least recently accessed slot
/// instead of growing past the cap, so a full store stays full rather
/// than oscillating through cleanup.
#[derive(Debug, Default)]
pub struct FlatStorage {
    max_cookies: usize,
    cookies: Vec<Cookie>,
}

impl FlatStorage {
    /// `max_cookies == 0` means unlimited.
    pub fn new(max_cookies: usize) -> Self {
        FlatStorage {
            max_cookies,
            cookies: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cookies.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Swap-remove the record at `index`. Callers removing several
    /// indices must process them in descending order.
    pub(crate) fn remove_at(&mut self, index: usize) {
        self.cookies.swap_remove(index);
    }

    pub(crate) fn push(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    /// Indices of the per-domain excess, least recently accessed first
    /// chosen, collected against the current (stable) index layout.
    fn per_domain_doomed(&self, max_per_domain: usize) -> Vec<usize> {
        let mut bins: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, c) in self.cookies.iter().enumerate() {
            bins.entry(c.domain.as_str()).or_default().push(i);
        }

        let mut doomed = Vec::new();
        for indices in bins.values() {
            let excess = indices.len().saturating_sub(max_per_domain);
            if excess == 0 {
                continue;
            }
            let mut lu = LeastUsed::new(excess);
            for &i in indices {
                lu.insert(self.cookies[i].last_access, i);
            }
            doomed.extend(lu.into_data());
        }
        doomed
    }

    fn remove_doomed(&mut self, mut doomed: Vec<usize>) -> usize {
        let removed = doomed.len();
        doomed.sort_unstable_by(|a, b| b.cmp(a));
        for i in doomed {
            self.remove_at(i);
        }
        removed
    }
}

impl Storage for FlatStorage {
    fn find(&mut self, domain: &str, path: &str, name: &str, now: OffsetDateTime) -> &mut Cookie {
        let mut expired_idx = None;
        let mut oldest_idx = None;
        let mut oldest_access = None;
        let mut found = None;

        for (i, cookie) in self.cookies.iter().enumerate() {
            if cookie.domain == domain && cookie.path == path && cookie.name == name {
                found = Some(i);
                break;
            }
            // one expired slot is enough; stop tracking once found
            if expired_idx.is_none() {
                if cookie.is_expired(now) {
                    expired_idx = Some(i);
                } else if oldest_access.is_none() || Some(cookie.last_access) < oldest_access {
                    oldest_idx = Some(i);
                    oldest_access = Some(cookie.last_access);
                }
            }
        }

        let index = match found {
            Some(i) => i,
            None => {
                if let Some(i) = expired_idx {
                    self.cookies[i].clear();
                    i
                } else if self.max_cookies > 0 && self.cookies.len() >= self.max_cookies {
                    // at capacity: recycle the least recently used slot
                    let i = oldest_idx.unwrap_or(0);
                    self.cookies[i].clear();
                    i
                } else {
                    self.cookies.push(Cookie::default());
                    self.cookies.len() - 1
                }
            }
        };
        &mut self.cookies[index]
    }

    fn delete(&mut self, domain: &str, path: &str, name: &str) -> bool {
        for i in 0..self.cookies.len() {
            if self.cookies[i].domain == domain
                && self.cookies[i].path == path
                && self.cookies[i].name == name
            {
                self.cookies.swap_remove(i);
                return true;
            }
        }
        false
    }

    fn retrieve(
        &mut self,
        host: &str,
        path: &str,
        secure: bool,
        now: OffsetDateTime,
    ) -> Vec<&mut Cookie> {
        self.cookies
            .iter_mut()
            .filter(|c| !c.is_empty_slot() && c.should_send(host, path, secure, now))
            .collect()
    }

    fn remove_expired(&mut self, now: OffsetDateTime) -> usize {
        let before = self.cookies.len();
        self.cookies.retain(|c| !c.is_expired(now));
        before - self.cookies.len()
    }

    fn cleanup(&mut self, max_total: usize, max_per_domain: usize, now: OffsetDateTime) -> usize {
        let mut removed = self.remove_expired(now);

        if max_per_domain > 0 {
            let doomed = self.per_domain_doomed(max_per_domain);
            if !doomed.is_empty() {
                tracing::debug!(count = doomed.len(), "evicting per-domain excess cookies");
            }
            removed += self.remove_doomed(doomed);
        }

        if max_total > 0 && self.cookies.len() > max_total {
            let excess = self.cookies.len() - max_total;
            let mut lu = LeastUsed::new(excess);
            for (i, c) in self.cookies.iter().enumerate() {
                lu.insert(c.last_access, i);
            }
            tracing::debug!(count = excess, "evicting excess cookies over total cap");
            removed += self.remove_doomed(lu.into_data());
        }

        removed
    }

    fn is_empty(&self, now: OffsetDateTime) -> bool {
        self.cookies
            .iter()
            .all(|c| c.is_empty_slot() || c.is_expired(now))
    }

    fn all(&mut self, now: OffsetDateTime) -> Vec<Cookie> {
        self.remove_expired(now);
        self.cookies
            .iter()
            .filter(|c| !c.is_empty_slot())
            .cloned()
            .collect()
    }

    fn encode(&self, now: OffsetDateTime) -> Result<Vec<u8>, PersistError> {
        persist::encode_records(self.cookies.iter(), now)
    }

    fn decode(&mut self, data: &[u8], now: OffsetDateTime) -> Result<(), PersistError> {
        self.cookies = persist::decode_records(data, now)?;
        Ok(())
    }
}
