use std::error::Error;

use cookienet::{persist, Jar, SetCookie};
use time::{Duration, OffsetDateTime};
use url::Url;

fn main() -> Result<(), Box<dyn Error>> {
    let jar = Jar::default();
    let shop = Url::parse("https://shop.example.com/cart/items")?;

    println!("--- Step 1: ingest a response's cookies ---");
    jar.set_cookies(
        &shop,
        &[
            SetCookie {
                name: "sid".to_string(),
                value: "opaque-session-id".to_string(),
                ..SetCookie::default()
            },
            SetCookie {
                name: "prefs".to_string(),
                value: "dark-mode".to_string(),
                domain: ".example.com".to_string(),
                path: "/".to_string(),
                expires: Some(OffsetDateTime::now_utc() + Duration::days(30)),
                ..SetCookie::default()
            },
            SetCookie {
                name: "tracker".to_string(),
                value: "nope".to_string(),
                // rejected: a public suffix may not take domain cookies
                domain: ".com".to_string(),
                ..SetCookie::default()
            },
        ],
    );
    for cookie in jar.all(OffsetDateTime::now_utc()) {
        println!("  stored {}={} for {}{}", cookie.name, cookie.value, cookie.domain, cookie.path);
    }

    println!("\n--- Step 2: the send list for a follow-up request ---");
    for (name, value) in jar.cookies(&shop) {
        println!("  Cookie: {name}={value}");
    }

    println!("\n--- Step 3: persist and restore ---");
    let dir = std::env::temp_dir();
    let path = dir.join("cookienet-demo.json");
    persist::save(&jar, &path)?;

    let restored = Jar::default();
    persist::load(&restored, &path)?;
    // the session cookie stays behind; the persistent one survives
    for (name, value) in restored.cookies(&shop) {
        println!("  restored {name}={value}");
    }
    std::fs::remove_file(&path)?;

    Ok(())
}
