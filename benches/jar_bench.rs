//! Ingest and retrieval throughput for both storage shapes.

use cookienet::{Jar, JarConfig, SetCookie};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;

fn jar(partitioned: bool) -> Jar {
    Jar::new(JarConfig {
        partitioned,
        ..JarConfig::default()
    })
}

fn populated(partitioned: bool) -> Jar {
    let jar = jar(partitioned);
    for host in 0..20 {
        let url = Url::parse(&format!("http://www.example{host}.com/foo")).unwrap();
        for i in 0..20 {
            jar.set_cookies(
                &url,
                &[SetCookie {
                    name: format!("cookie{i}"),
                    value: "value".to_string(),
                    path: "/foo".to_string(),
                    ..SetCookie::default()
                }],
            );
        }
    }
    jar
}

fn bench_set_cookies(c: &mut Criterion) {
    let received = [SetCookie {
        name: "session".to_string(),
        value: "opaque".to_string(),
        ..SetCookie::default()
    }];
    let url = Url::parse("https://www.example.com/foo/bar").unwrap();

    let flat = jar(false);
    c.bench_function("jar_set_cookies_flat", |b| {
        b.iter(|| flat.set_cookies(black_box(&url), black_box(&received)))
    });

    let partitioned = jar(true);
    c.bench_function("jar_set_cookies_partitioned", |b| {
        b.iter(|| partitioned.set_cookies(black_box(&url), black_box(&received)))
    });
}

fn bench_cookies(c: &mut Criterion) {
    let url = Url::parse("http://www.example7.com/foo/bar").unwrap();

    let flat = populated(false);
    c.bench_function("jar_cookies_flat", |b| {
        b.iter(|| black_box(flat.cookies(black_box(&url))))
    });

    let partitioned = populated(true);
    c.bench_function("jar_cookies_partitioned", |b| {
        b.iter(|| black_box(partitioned.cookies(black_box(&url))))
    });
}

criterion_group!(benches, bench_set_cookies, bench_cookies);
criterion_main!(benches);
