//! End-to-end jar scenarios: acceptance, matching, ordering and deletion
//! through the public API, exercised against both storage shapes where
//! the shape cannot matter.

use cookienet::{Jar, JarConfig, SetCookie};
use time::{Duration, OffsetDateTime};
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn flat() -> Jar {
    Jar::default()
}

fn partitioned() -> Jar {
    Jar::new(JarConfig {
        partitioned: true,
        ..JarConfig::default()
    })
}

fn both(test: impl Fn(Jar)) {
    test(flat());
    test(partitioned());
}

/// Build a `SetCookie` from a compact `name=value; attr; attr=value`
/// line. Supported attributes: domain, path, secure, httponly, max-age
/// (seconds), expires-in (seconds from now, may be negative).
fn cookie(line: &str) -> SetCookie {
    let now = OffsetDateTime::now_utc();
    let mut parts = line.split("; ");
    let (name, value) = parts.next().unwrap().split_once('=').unwrap();
    let mut c = SetCookie {
        name: name.to_string(),
        value: value.to_string(),
        ..SetCookie::default()
    };
    for part in parts {
        match part.split_once('=') {
            Some(("domain", v)) => c.domain = v.to_string(),
            Some(("path", v)) => c.path = v.to_string(),
            Some(("max-age", v)) => c.max_age = v.parse().unwrap(),
            Some(("expires-in", v)) => {
                c.expires = Some(now + Duration::seconds(v.parse().unwrap()));
            }
            None if part == "secure" => c.secure = true,
            None if part == "httponly" => c.http_only = true,
            _ => panic!("unsupported cookie attribute: {part}"),
        }
    }
    c
}

fn set(jar: &Jar, at: &str, lines: &[&str]) {
    let cookies: Vec<SetCookie> = lines.iter().map(|s| cookie(s)).collect();
    jar.set_cookies(&url(at), &cookies);
}

fn get(jar: &Jar, at: &str) -> String {
    jar.cookies(&url(at))
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[track_caller]
fn expect(jar: &Jar, cases: &[(&str, &str)]) {
    for (to, want) in cases {
        assert_eq!(get(jar, to), *want, "GET {to}");
    }
}

#[test]
fn host_cookie() {
    both(|jar| {
        set(&jar, "http://www.host.test/", &["A=a"]);
        expect(
            &jar,
            &[
                ("http://www.host.test", "A=a"),
                ("http://www.host.test/", "A=a"),
                ("http://www.host.test/some/path", "A=a"),
                ("https://www.host.test", "A=a"),
                ("https://www.host.test/some/path", "A=a"),
                ("http://www.other.org", ""),
                ("http://sibling.host.test", ""),
                ("http://deep.www.host.test", ""),
            ],
        );
    });
}

#[test]
fn secure_cookie_needs_https() {
    both(|jar| {
        set(&jar, "http://www.host.test/", &["A=a; secure"]);
        expect(
            &jar,
            &[
                ("http://www.host.test", ""),
                ("https://www.host.test", "A=a"),
            ],
        );
    });
}

#[test]
fn httponly_cookies_still_travel_on_http() {
    both(|jar| {
        set(&jar, "http://www.host.test/", &["A=a; httponly"]);
        expect(
            &jar,
            &[
                ("http://www.host.test", "A=a"),
                ("https://www.host.test", "A=a"),
            ],
        );
    });
}

#[test]
fn explicit_path() {
    both(|jar| {
        set(&jar, "http://www.host.test/", &["A=a; path=/some/path"]);
        expect(
            &jar,
            &[
                ("http://www.host.test", ""),
                ("http://www.host.test/", ""),
                ("http://www.host.test/some", ""),
                ("http://www.host.test/some/", ""),
                ("http://www.host.test/some/path", "A=a"),
                ("http://www.host.test/some/paths", ""),
                ("http://www.host.test/some/path/foo", "A=a"),
                ("http://www.host.test/some/path/foo/", "A=a"),
            ],
        );
    });
}

#[test]
fn implicit_path_is_the_request_directory() {
    both(|jar| {
        // a directory request path
        set(&jar, "http://www.host.test/some/path/", &["A=a"]);
        expect(
            &jar,
            &[
                ("http://www.host.test/some", ""),
                ("http://www.host.test/some/", ""),
                ("http://www.host.test/some/path", "A=a"),
                ("http://www.host.test/some/paths", ""),
                ("http://www.host.test/some/path/foo", "A=a"),
            ],
        );
    });

    both(|jar| {
        // a file request path
        set(&jar, "http://www.host.test/some/path/index.html", &["A=a"]);
        expect(
            &jar,
            &[
                ("http://www.host.test/some/", ""),
                ("http://www.host.test/some/path", "A=a"),
                ("http://www.host.test/some/path/foo", "A=a"),
            ],
        );
    });

    both(|jar| {
        // no path in the request at all
        set(&jar, "http://www.host.test", &["A=a"]);
        expect(
            &jar,
            &[
                ("http://www.host.test", "A=a"),
                ("http://www.host.test/some/path", "A=a"),
            ],
        );
    });
}

#[test]
fn send_list_sorted_by_path_length_then_creation() {
    both(|jar| {
        set(
            &jar,
            "http://www.host.test/",
            &[
                "A=a; path=/foo/bar",
                "B=b; path=/foo/bar/baz/qux",
                "C=c; path=/foo/bar/baz",
                "D=d; path=/foo",
            ],
        );
        expect(
            &jar,
            &[("http://www.host.test/foo/bar/baz/qux", "B=b; C=c; A=a; D=d")],
        );
    });
}

#[test]
fn same_name_different_scope() {
    both(|jar| {
        set(
            &jar,
            "http://www.test.org/",
            &[
                "A=1; path=/",
                "A=2; path=/path",
                "A=3; path=/quux",
                "A=4; path=/path/foo",
                "A=5; domain=.test.org; path=/path",
                "A=6; domain=.test.org; path=/quux",
                "A=7; domain=.test.org; path=/path/foo",
            ],
        );
        expect(
            &jar,
            &[
                ("http://www.test.org/path", "A=2; A=5; A=1"),
                ("http://www.test.org/path/foo", "A=4; A=7; A=2; A=5; A=1"),
            ],
        );
    });
}

#[test]
fn subdomain_chains() {
    both(|jar| {
        set(
            &jar,
            "http://a.b.c.d.com",
            &[
                "a=1; domain=.a.b.c.d.com",
                "b=2; domain=.b.c.d.com",
                "c=3; domain=.c.d.com",
                "d=4; domain=.d.com",
            ],
        );
        expect(
            &jar,
            &[
                ("http://a.b.c.d.com", "a=1; b=2; c=3; d=4"),
                ("http://b.c.d.com", "b=2; c=3; d=4"),
                ("http://c.d.com", "c=3; d=4"),
                ("http://d.com", "d=4"),
            ],
        );
    });

    both(|jar| {
        set(
            &jar,
            "http://a.b.c.d.com",
            &[
                "a=1; domain=.a.b.c.d.com",
                "b=2; domain=.b.c.d.com",
                "c=3; domain=.c.d.com",
                "d=4; domain=.d.com",
                "X=bcd; domain=.b.c.d.com",
                "X=cd; domain=.c.d.com",
            ],
        );
        expect(
            &jar,
            &[
                ("http://b.c.d.com", "b=2; c=3; d=4; X=bcd; X=cd"),
                ("http://c.d.com", "c=3; d=4; X=cd"),
            ],
        );
    });
}

#[test]
fn hostile_domain_attributes_are_rejected() {
    both(|jar| {
        set(
            &jar,
            "http://foo.bar.com",
            &[
                "a=1; domain=.yo.foo.bar.com",
                "b=2; domain=.foo.com",
                "c=3; domain=.bar.foo.com",
                "d=4; domain=.foo.bar.com.net",
                "e=5; domain=ar.com",
                "f=6; domain=.",
                "g=7; domain=/",
                "h=8; domain=http://foo.bar.com",
                "i=9; domain=..foo.bar.com",
                "j=10; domain=..bar.com",
                "k=11; domain=.foo.bar.com?blah",
                "l=12; domain=.foo.bar.com/blah",
                "m=13; domain=.foo.bar.com:80",
                "n=14; domain=.foo.bar.com:",
                "o=15; domain=.foo.bar.com#sup",
            ],
        );
        expect(&jar, &[("http://foo.bar.com", "")]);
        assert!(jar.all(OffsetDateTime::now_utc()).is_empty());
    });
}

#[test]
fn overreaching_public_suffix_domain_is_rejected() {
    both(|jar| {
        set(&jar, "http://foo.com.com/", &["a=1; domain=.foo.com.com.com"]);
        expect(&jar, &[("http://foo.bar.com", ""), ("http://foo.com.com", "")]);
        assert!(jar.all(OffsetDateTime::now_utc()).is_empty());
    });
}

#[test]
fn domain_without_leading_dot() {
    both(|jar| {
        set(
            &jar,
            "http://manage.hosted.filefront.com",
            &["A=a; domain=filefront.com"],
        );
        expect(&jar, &[("http://www.filefront.com", "A=a")]);
    });

    both(|jar| {
        set(&jar, "http://www.google.com", &["a=1; domain=www.google.com"]);
        expect(
            &jar,
            &[
                ("http://www.google.com", "a=1"),
                ("http://sub.www.google.com", "a=1"),
                ("http://something-else.com", ""),
            ],
        );
    });
}

#[test]
fn domain_attributes_are_case_insensitive() {
    both(|jar| {
        set(
            &jar,
            "http://www.google.com",
            &["a=1; domain=.GOOGLE.COM", "b=2; domain=.www.gOOgLE.coM"],
        );
        expect(&jar, &[("http://www.google.com", "a=1; b=2")]);
    });
}

#[test]
fn trailing_dot_domains_are_rejected() {
    both(|jar| {
        set(
            &jar,
            "http://www.google.com/",
            &["a=1; domain=.www.google.com.", "b=2; domain=.www.google.com.."],
        );
        expect(&jar, &[("http://www.google.com", "")]);
    });
}

#[test]
fn host_with_trailing_dot_is_canonicalised() {
    both(|jar| {
        set(&jar, "http://com./index.html", &["a=1"]);
        expect(
            &jar,
            &[
                ("http://com./index.html", "a=1"),
                ("http://com/index.html", "a=1"),
                ("http://no-cookies.com./index.html", ""),
            ],
        );
    });
}

#[test]
fn ip_hosts_take_host_cookies_only() {
    both(|jar| {
        set(
            &jar,
            "http://1.2.3.4/weee",
            &["A=B; path=/", "b=2; domain=1.2.3.4", "c=3; domain=.1.2.3.4"],
        );
        expect(&jar, &[("http://1.2.3.4/weee", "A=B")]);
    });
}

#[test]
fn ip_domain_attribute_accepted_in_lax_mode() {
    for partitioned in [false, true] {
        let jar = Jar::new(JarConfig {
            partitioned,
            allow_ip_host_cookie: true,
            ..JarConfig::default()
        });
        set(
            &jar,
            "http://1.2.3.4/weee",
            &["b=2; domain=1.2.3.4", "c=3; domain=.1.2.3.4"],
        );
        expect(
            &jar,
            &[
                ("http://1.2.3.4/weee", "b=2"),
                ("http://1.2.3.5/weee", ""),
            ],
        );
    }
}

#[test]
fn non_dotted_hosts_and_tlds() {
    both(|jar| {
        // an unknown single-label host takes host cookies only
        set(&jar, "http://com/", &["a=1", "b=2; domain=.com", "c=3; domain=com"]);
        expect(
            &jar,
            &[("http://com/", "a=1"), ("http://no-cookies.com/", "")],
        );
    });

    both(|jar| {
        // cannot reach a parent single-label host from a subdomain
        set(&jar, "http://a.b", &["a=1; domain=.b", "b=2; domain=b"]);
        expect(&jar, &[("http://a.b", "")]);
    });

    both(|jar| {
        // the same for a known TLD
        set(&jar, "http://google.com", &["a=1; domain=.com", "b=2; domain=com"]);
        expect(&jar, &[("http://google.com", "")]);
    });

    both(|jar| {
        // dotted public suffixes are refused as well
        set(&jar, "http://google.co.uk", &["a=1; domain=.co.uk", "b=2; domain=.uk"]);
        expect(
            &jar,
            &[
                ("http://google.co.uk", ""),
                ("http://else.co.uk", ""),
                ("http://else.uk", ""),
            ],
        );
    });

    both(|jar| {
        // intranet hosts may take host cookies
        set(&jar, "http://b", &["a=1", "b=2; domain=.b", "c=3; domain=b"]);
        expect(&jar, &[("http://b", "a=1")]);
    });
}

#[test]
fn path_prefix_respects_segment_boundaries() {
    both(|jar| {
        set(&jar, "http://www.google.izzle", &["A=B; path=/wee"]);
        expect(
            &jar,
            &[
                ("http://www.google.izzle/wee", "A=B"),
                ("http://www.google.izzle/wee/", "A=B"),
                ("http://www.google.izzle/wee/war", "A=B"),
                ("http://www.google.izzle/wee/war/more/more", "A=B"),
                ("http://www.google.izzle/weehee", ""),
                ("http://www.google.izzle/", ""),
            ],
        );
    });
}

#[test]
fn updates_overwrite_values_and_flags() {
    both(|jar| {
        set(
            &jar,
            "http://www.example.com",
            &["a=1", "b=2; secure", "c=3; httponly", "d=4; secure; httponly"],
        );
        expect(
            &jar,
            &[
                ("http://www.example.com", "a=1; c=3"),
                ("https://www.example.com", "a=1; b=2; c=3; d=4"),
            ],
        );

        // same identities, new values
        set(
            &jar,
            "http://www.example.com",
            &["a=w", "b=x; secure", "c=y; httponly", "d=z; secure; httponly"],
        );
        expect(
            &jar,
            &[
                ("http://www.example.com", "a=w; c=y"),
                ("https://www.example.com", "a=w; b=x; c=y; d=z"),
            ],
        );

        // an http response may clear the Secure flag
        set(&jar, "http://www.example.com/", &["b=xx", "d=zz; httponly"]);
        expect(
            &jar,
            &[("http://www.example.com", "a=w; b=xx; c=y; d=zz")],
        );

        // and delete everything
        set(
            &jar,
            "http://www.example.com/",
            &[
                "a=1; max-age=-1",
                "b=2; expires-in=-1",
                "c=3; max-age=-1; expires-in=-2",
                "d=4; max-age=-3; expires-in=600",
            ],
        );
        expect(&jar, &[("http://www.example.com", "")]);
    });
}

#[test]
fn deletion_of_session_and_persistent_cookies() {
    both(|jar| {
        let u = "http://www.google.com";

        set(&jar, u, &["a=1"]);
        expect(&jar, &[(u, "a=1")]);
        set(&jar, u, &["a=1; max-age=-1"]);
        expect(&jar, &[(u, "")]);

        set(&jar, u, &["b=2"]);
        expect(&jar, &[(u, "b=2")]);
        set(&jar, u, &["b=2; expires-in=-1"]);
        expect(&jar, &[(u, "")]);

        set(&jar, u, &["c=3; max-age=600"]);
        expect(&jar, &[(u, "c=3")]);
        set(&jar, u, &["c=3; max-age=-1"]);
        expect(&jar, &[(u, "")]);

        set(&jar, u, &["d=4; expires-in=600"]);
        expect(&jar, &[(u, "d=4")]);
        set(&jar, u, &["d=4; expires-in=-1"]);
        expect(&jar, &[(u, "")]);
    });
}

#[test]
fn non_http_urls_are_ignored() {
    both(|jar| {
        set(&jar, "http://www.host.test/", &["A=a"]);

        // neither stored for nor returned to non-http(s) schemes
        set(&jar, "ftp://www.host.test/", &["B=b"]);
        expect(&jar, &[("ftp://www.host.test/", "")]);
        assert_eq!(get(&jar, "http://www.host.test/"), "A=a");
        assert_eq!(jar.all(OffsetDateTime::now_utc()).len(), 1);

        set(&jar, "file:///etc/cookies", &["C=c"]);
        assert_eq!(jar.all(OffsetDateTime::now_utc()).len(), 1);
    });
}
