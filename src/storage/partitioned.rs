//! The partitioned backend: flat buckets keyed by registrable domain.
//!
//! Grouping cookies under their TLD+1 or eTLD+1 keeps both lookups and
//! per-domain cap enforcement inside one small bucket; only the global
//! cap needs a cross-bucket pass.

use std::collections::HashMap;

use time::OffsetDateTime;

use crate::cookie::Cookie;
use crate::leastused::LeastUsed;
use crate::persist::{self, PersistError};
use crate::psl;
use crate::storage::flat::FlatStorage;
use crate::storage::Storage;

/// Which registrable-domain notion keys the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainKey {
    /// The last two labels, no suffix rules consulted.
    TldPlusOne,
    /// The public-suffix engine's eTLD+1.
    EffectiveTldPlusOne,
}

/// A map of domain keys to flat buckets. Buckets appear on demand and are
/// dropped once cleanup finds them empty.
#[derive(Debug)]
pub struct PartitionedStorage {
    key_strategy: DomainKey,
    buckets: HashMap<String, FlatStorage>,
}

impl PartitionedStorage {
    pub fn new(key_strategy: DomainKey) -> Self {
        PartitionedStorage {
            key_strategy,
            buckets: HashMap::new(),
        }
    }

    /// The bucket key for a cookie domain or request host. Domains too
    /// short for their own key (TLDs, public suffixes, IP literals) key
    /// by themselves.
    fn key(&self, domain: &str) -> String {
        let key = match self.key_strategy {
            DomainKey::TldPlusOne => domain
                .rmatch_indices('.')
                .nth(1)
                .map(|(i, _)| domain[i + 1..].to_string()),
            DomainKey::EffectiveTldPlusOne => psl::effective_tld_plus_one(domain),
        };
        key.unwrap_or_else(|| domain.to_string())
    }

    fn total(&self) -> usize {
        self.buckets.values().map(FlatStorage::len).sum()
    }

    /// Evict the `excess` least recently accessed cookies across all
    /// buckets. Doomed entries are addressed as (bucket key, index)
    /// pairs collected up front, so no bucket borrow outlives the scan.
    fn evict_global_excess(&mut self, excess: usize) {
        let mut lu = LeastUsed::new(excess);
        for (key, bucket) in &self.buckets {
            for (i, cookie) in bucket.iter().enumerate() {
                lu.insert(cookie.last_access, (key.as_str(), i));
            }
        }

        let mut doomed: HashMap<String, Vec<usize>> = HashMap::new();
        for (key, i) in lu.into_data() {
            doomed.entry(key.to_string()).or_default().push(i);
        }

        for (key, mut indices) in doomed {
            if let Some(bucket) = self.buckets.get_mut(&key) {
                indices.sort_unstable_by(|a, b| b.cmp(a));
                for i in indices {
                    bucket.remove_at(i);
                }
            }
        }
        self.buckets.retain(|_, bucket| bucket.len() > 0);
    }
}

impl Storage for PartitionedStorage {
    fn find(&mut self, domain: &str, path: &str, name: &str, now: OffsetDateTime) -> &mut Cookie {
        let key = self.key(domain);
        self.buckets
            .entry(key)
            .or_insert_with(|| FlatStorage::new(0))
            .find(domain, path, name, now)
    }

    fn delete(&mut self, domain: &str, path: &str, name: &str) -> bool {
        let key = self.key(domain);
        match self.buckets.get_mut(&key) {
            Some(bucket) => bucket.delete(domain, path, name),
            None => false,
        }
    }

    fn retrieve(
        &mut self,
        host: &str,
        path: &str,
        secure: bool,
        now: OffsetDateTime,
    ) -> Vec<&mut Cookie> {
        let key = self.key(host);
        match self.buckets.get_mut(&key) {
            Some(bucket) => bucket.retrieve(host, path, secure, now),
            None => Vec::new(),
        }
    }

    fn remove_expired(&mut self, now: OffsetDateTime) -> usize {
        self.buckets
            .values_mut()
            .map(|bucket| bucket.remove_expired(now))
            .sum()
    }

    fn cleanup(&mut self, max_total: usize, max_per_domain: usize, now: OffsetDateTime) -> usize {
        // each bucket is one logical domain: its cap is the per-domain cap
        let mut removed = 0;
        for bucket in self.buckets.values_mut() {
            removed += bucket.cleanup(max_per_domain, 0, now);
        }
        self.buckets.retain(|_, bucket| bucket.len() > 0);

        let total = self.total();
        if max_total > 0 && total > max_total {
            let excess = total - max_total;
            tracing::debug!(count = excess, "evicting cross-bucket excess cookies");
            self.evict_global_excess(excess);
            removed += excess;
        }

        removed
    }

    fn is_empty(&self, now: OffsetDateTime) -> bool {
        self.buckets.values().all(|bucket| bucket.is_empty(now))
    }

    fn all(&mut self, now: OffsetDateTime) -> Vec<Cookie> {
        let mut cookies = Vec::new();
        for bucket in self.buckets.values_mut() {
            cookies.extend(bucket.all(now));
        }
        self.buckets.retain(|_, bucket| bucket.len() > 0);
        cookies
    }

    fn encode(&self, now: OffsetDateTime) -> Result<Vec<u8>, PersistError> {
        persist::encode_records(self.buckets.values().flat_map(|bucket| bucket.iter()), now)
    }

    fn decode(&mut self, data: &[u8], now: OffsetDateTime) -> Result<(), PersistError> {
        let cookies = persist::decode_records(data, now)?;
        self.buckets.clear();
        for cookie in cookies {
            let key = self.key(&cookie.domain);
            self.buckets
                .entry(key)
                .or_insert_with(|| FlatStorage::new(0))
                .push(cookie);
        }
        Ok(())
    }
}
