//! Low-level cookie stores.
//!
//! Cookies are identified by the `(domain, path, name)` triple. A storage
//! does its own housekeeping (slot reuse, expiry sweeps, cap eviction) but
//! the jar owns locking, acceptance decisions and timestamp bookkeeping.
//!
//! Two shapes exist: [`flat::FlatStorage`] scans one unsorted list, and
//! [`partitioned::PartitionedStorage`] buckets flat stores under a
//! registrable-domain key.

pub mod flat;
pub mod partitioned;

use time::OffsetDateTime;

use crate::cookie::Cookie;
use crate::persist::PersistError;

/// Operations shared by the two backend shapes.
pub trait Storage {
    /// Look up the cookie `(domain, path, name)`. When it is not present,
    /// the returned record is an empty slot already placed into storage:
    /// an expired record is reused first, then (at capacity) the least
    /// recently accessed one, then a fresh slot is appended. Reused slots
    /// come back with their name cleared, so an empty name tells the
    /// caller it is looking at a new cookie.
    fn find(&mut self, domain: &str, path: &str, name: &str, now: OffsetDateTime) -> &mut Cookie;

    /// Remove the cookie `(domain, path, name)`. Returns whether anything
    /// was removed.
    fn delete(&mut self, domain: &str, path: &str, name: &str) -> bool;

    /// The unsorted candidates for a request, with empty slots and
    /// expired records already filtered out. Mutable so the caller can
    /// refresh access times on the selection.
    fn retrieve(
        &mut self,
        host: &str,
        path: &str,
        secure: bool,
        now: OffsetDateTime,
    ) -> Vec<&mut Cookie>;

    /// Drop expired records; returns how many went.
    fn remove_expired(&mut self, now: OffsetDateTime) -> usize;

    /// Enforce the caps: sweep expired records, then evict least recently
    /// accessed cookies from any domain over `max_per_domain`, then from
    /// the whole store while it exceeds `max_total`. Zero caps mean
    /// unlimited. Returns how many records were removed.
    fn cleanup(&mut self, max_total: usize, max_per_domain: usize, now: OffsetDateTime) -> usize;

    /// Whether no valid (non-expired, non-slot) cookie is stored.
    fn is_empty(&self, now: OffsetDateTime) -> bool;

    /// Snapshot of all valid cookies. Sweeps expired records first so cap
    /// accounting stays honest.
    fn all(&mut self, now: OffsetDateTime) -> Vec<Cookie>;

    /// Serialise the persistent, non-expired records.
    fn encode(&self, now: OffsetDateTime) -> Result<Vec<u8>, PersistError>;

    /// Replace the contents with the payload's still-valid records.
    fn decode(&mut self, data: &[u8], now: OffsetDateTime) -> Result<(), PersistError>;
}
