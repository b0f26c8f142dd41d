//! Compiled public-suffix rule table.
//!
//! A trimmed snapshot of the publicsuffix.org list, keyed by TLD with the
//! TLD itself stripped from every rule. Rule lists are ordered so that the
//! first matching rule prevails: exception rules first, then wildcard
//! rules, then literal suffixes from most to fewest labels, then the bare
//! TLD rule. Data only; the matching logic lives in the parent module.

use super::{DomainRule, RuleKind};

const fn normal(suffix: &'static str) -> DomainRule {
    DomainRule {
        suffix,
        kind: RuleKind::Normal,
    }
}

const fn exception(suffix: &'static str) -> DomainRule {
    DomainRule {
        suffix,
        kind: RuleKind::Exception,
    }
}

const fn wildcard(suffix: &'static str) -> DomainRule {
    DomainRule {
        suffix,
        kind: RuleKind::Wildcard,
    }
}

pub(super) static TABLE: &[(&str, &[DomainRule])] = &[
    (
        "ac",
        &[
            normal("com"),
            normal("edu"),
            normal("gov"),
            normal("mil"),
            normal("net"),
            normal("org"),
            normal(""),
        ],
    ),
    (
        "au",
        &[
            normal("com"),
            normal("edu"),
            normal("gov"),
            normal("net"),
            normal("org"),
            normal(""),
        ],
    ),
    ("biz", &[normal("")]),
    ("com", &[normal("eu"), normal("uk"), normal("")]),
    ("cy", &[wildcard("")]),
    ("de", &[normal("")]),
    ("io", &[normal("github"), normal("")]),
    (
        "jp",
        &[
            exception("city.kyoto"),
            exception("pref.kyoto"),
            wildcard("kyoto"),
            normal("ac"),
            normal("ad"),
            normal("co"),
            normal("ed"),
            normal("go"),
            normal("gr"),
            normal("lg"),
            normal("ne"),
            normal("or"),
            normal(""),
        ],
    ),
    ("net", &[normal("se"), normal("uk"), normal("")]),
    ("om", &[exception("songfest"), wildcard("")]),
    ("org", &[normal("ae"), normal("")]),
    (
        "uk",
        &[
            normal("ac"),
            normal("co"),
            normal("gov"),
            normal("ltd"),
            normal("me"),
            normal("net"),
            normal("org"),
            normal("plc"),
            normal(""),
        ],
    ),
    (
        "us",
        &[
            normal("k12.ak"),
            normal("k12.al"),
            normal("ak"),
            normal("al"),
            normal(""),
        ],
    ),
];
