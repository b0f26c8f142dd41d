//! Public-suffix decisions for cookie domain security.
//!
//! Answers two questions: "may domain cookies be set for this domain?"
//! (a public suffix like `co.uk` must never carry cookies shared across
//! independent registrations, the classic supercookie attack) and "what is
//! the registrable domain (eTLD+1)?", which the partitioned storage uses
//! as its index key.
//!
//! Rules come from a compiled snapshot of the publicsuffix.org list in
//! [`table`]. Lookups go through a small bounded cache; the cache is a
//! performance aid only and never changes an answer.

mod table;

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

/// How a rule counts labels. Matching itself is kind-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuleKind {
    Normal,
    Exception,
    Wildcard,
}

/// One public-suffix rule for a TLD, stored without the TLD, without the
/// leading `!` or `*.` markers.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct DomainRule {
    pub(crate) suffix: &'static str,
    pub(crate) kind: RuleKind,
}

impl DomainRule {
    /// Whether this rule matches `stripped`, the queried domain with its
    /// TLD removed. Label-wise suffix comparison from the right: the empty
    /// suffix matches everything, otherwise the suffix must either equal
    /// `stripped` or sit behind a `.` boundary.
    fn matches(&self, stripped: &str) -> bool {
        if !stripped.ends_with(self.suffix) {
            return false;
        }
        if stripped.len() == self.suffix.len() {
            return true;
        }
        self.suffix.is_empty()
            || stripped.as_bytes()[stripped.len() - self.suffix.len() - 1] == b'.'
    }
}

static RULES_BY_TLD: Lazy<HashMap<&'static str, &'static [DomainRule]>> =
    Lazy::new(|| table::TABLE.iter().copied().collect());

/// Recently resolved domains. Capacity in the order of the distinct hosts
/// a client talks to between cap sweeps.
const RULE_CACHE_CAPACITY: usize = 40;

static RULE_CACHE: Lazy<RwLock<RuleCache>> =
    Lazy::new(|| RwLock::new(RuleCache::with_capacity(RULE_CACHE_CAPACITY)));

/// Fixed-size ring of `(domain, resolved rule)` pairs, overwriting the
/// oldest entry once full.
struct RuleCache {
    entries: Vec<(String, Option<&'static DomainRule>)>,
    capacity: usize,
    next: usize,
}

impl RuleCache {
    fn with_capacity(capacity: usize) -> Self {
        RuleCache {
            entries: Vec::with_capacity(capacity),
            capacity,
            next: 0,
        }
    }

    fn lookup(&self, domain: &str) -> Option<Option<&'static DomainRule>> {
        self.entries
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, rule)| *rule)
    }

    fn store(&mut self, domain: &str, rule: Option<&'static DomainRule>) {
        if self.entries.len() < self.capacity {
            self.entries.push((domain.to_string(), rule));
        } else {
            self.entries[self.next] = (domain.to_string(), rule);
        }
        self.next = (self.next + 1) % self.capacity;
    }
}

/// Look up the prevailing rule for `domain`.
///
/// The last label is split off as the TLD; a TLD absent from the table has
/// no rule (and is not cached, matching the miss cost of the table probe).
/// Rule lists are pre-sorted, so the first match wins.
pub(crate) fn find_rule(domain: &str) -> Option<&'static DomainRule> {
    if let Ok(cache) = RULE_CACHE.read() {
        if let Some(hit) = cache.lookup(domain) {
            return hit;
        }
    }

    let (stripped, tld) = match domain.rfind('.') {
        Some(i) => (&domain[..i], &domain[i + 1..]),
        None => ("", domain),
    };
    let rules = RULES_BY_TLD.get(tld)?;

    let rule = rules.iter().find(|r| r.matches(stripped));

    if let Ok(mut cache) = RULE_CACHE.write() {
        cache.store(domain, rule);
    }

    rule
}

/// The registrable domain ("effective TLD plus one") of `domain`, or
/// `None` when `domain` is itself a public suffix or shorter.
///
/// Label count per publicsuffix.org: with no rule the default `*` rule
/// applies (two labels); a literal rule keeps one label more than its own
/// label count; exception rules count one fewer, wildcard rules one more.
pub fn effective_tld_plus_one(domain: &str) -> Option<String> {
    let rule = find_rule(domain);
    let label_count = domain.split('.').count();

    let n = match rule {
        None => 2,
        Some(rule) => {
            let mut n = if rule.suffix.is_empty() {
                2
            } else {
                2 + rule.suffix.matches('.').count() + 1
            };
            match rule.kind {
                RuleKind::Normal => {}
                RuleKind::Exception => n -= 1,
                RuleKind::Wildcard => n += 1,
            }
            n
        }
    };

    if n > label_count {
        return None;
    }
    if n == label_count {
        return Some(domain.to_string());
    }
    // keep the last n labels
    let (boundary, _) = domain.rmatch_indices('.').nth(n - 1)?;
    Some(domain[boundary + 1..].to_string())
}

/// Whether `domain` is specific enough to receive domain cookies.
pub fn allow_domain_cookie(domain: &str) -> bool {
    effective_tld_plus_one(domain).is_some()
}
