//! # cookienet
//!
//! An RFC 6265 conforming, in-memory cookie jar for HTTP clients.
//!
//! `cookienet` ingests the structured `Set-Cookie` attributes received in
//! response to requests, decides which cookies are acceptable, indexes
//! them for retrieval and produces the ordered cookie list a follow-up
//! request would carry.
//!
//! ## Features
//!
//! - **Acceptance pipeline**: canonical hosts and default paths, the
//!   host-cookie/domain-cookie distinction, `Max-Age`/`Expires`
//!   arbitration, silent rejection of malformed or hostile domains
//! - **Public Suffix List validation**: domain cookies for suffixes like
//!   `co.uk` are refused, preventing supercookie attacks
//! - **Capacity enforcement**: per-domain and global caps with
//!   least-recently-used eviction (RFC 6265 section 6.1 minimums by
//!   default: 50 per domain, 3000 total, 4096 bytes per cookie)
//! - **Two index shapes**: one flat scan list, or buckets partitioned by
//!   registrable domain
//! - **Persistence**: an opaque byte payload that round-trips every
//!   non-expired persistent cookie and sheds session cookies
//!
//! ## Quick start
//!
//! ```rust
//! use cookienet::{Jar, SetCookie};
//! use url::Url;
//!
//! let jar = Jar::default();
//! let url = Url::parse("https://www.example.com/").unwrap();
//!
//! jar.set_cookies(
//!     &url,
//!     &[SetCookie {
//!         name: "session".into(),
//!         value: "opaque".into(),
//!         ..SetCookie::default()
//!     }],
//! );
//!
//! assert_eq!(
//!     jar.cookies(&url),
//!     vec![("session".to_string(), "opaque".to_string())]
//! );
//! ```
//!
//! ## Modules
//!
//! - [`jar`] - the coordinator: acceptance, retrieval, caps, persistence
//! - [`cookie`] - the stored record and the received attribute set
//! - [`storage`] - the flat and partitioned backends
//! - [`psl`] - public-suffix decisions and the registrable-domain key
//! - [`persist`] - payload format and file helpers
//!
//! ## Scope
//!
//! The jar stores and returns cookies for `http`/`https` URLs only, and
//! it is a storage core: parsing `Set-Cookie` header lines, following
//! redirects and scheduling requests belong to the calling client. Each
//! jar serialises its own operations behind one coarse mutex; those
//! operations must not be re-entered from the same call stack.

pub mod cookie;
pub mod jar;
mod leastused;
pub mod persist;
pub mod psl;
pub mod storage;
mod urlutil;

pub use cookie::{Cookie, SetCookie};
pub use jar::{Jar, JarConfig, RejectReason};
pub use persist::PersistError;
