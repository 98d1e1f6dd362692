//! Redirect Engine - host/path redirect and static page matching for Rust
//!
//! This library decides, for an incoming `(host, uri)` pair, whether to
//! answer with a redirect, serve a static page, or let the request through:
//! - Exact rules on the path or on host + path
//! - Regex rules with `$1`..`$9` capture substitution in the target
//! - Prefix-bucketed regex lookup so only plausible patterns are evaluated
//! - Immutable snapshots published atomically, readable without locks
//! - Rule sources: manager HTTP API, JSON file, in-memory
//! - Periodic background refresh (feature `async`)
//!
//! # Example
//!
//! ```rust
//! use redirect_engine_r::{
//!     compile, InvalidRulePolicy, Redirect, RedirectStatus, RedirectType, RuleSet,
//! };
//!
//! let rules = RuleSet::new(
//!     vec![
//!         Redirect::new(RedirectType::Basic, "/about", "/about-us", RedirectStatus::MovedPermanent),
//!         Redirect::new(
//!             RedirectType::Regex,
//!             r"^/old/(\w+)/(\w+)$",
//!             "/new/$2/$1",
//!             RedirectStatus::Found,
//!         ),
//!     ],
//!     vec![],
//! );
//!
//! let snapshot = compile(&rules, 1, InvalidRulePolicy::Skip).unwrap();
//!
//! let matched = snapshot.match_redirect("example.com", "/old/foo/bar").unwrap();
//! assert_eq!(matched.target, "/new/bar/foo");
//! assert_eq!(matched.http_code(), 302);
//!
//! assert!(snapshot.match_redirect("example.com", "/unknown").is_none());
//! ```
//!
//! # Rule Types
//!
//! | Type | Key | Target |
//! |------|-----|--------|
//! | `BASIC_HOST` | `host + uri`, exact | literal |
//! | `BASIC` | `uri`, exact | literal |
//! | `REGEX_HOST` | regex over `host + uri` | `$n` substituted |
//! | `REGEX` | regex over `uri` | `$n` substituted |
//!
//! Tiers are tried in that order; the first hit wins. Within a regex tier the
//! rule with the longest source pattern is tried first.
//!
//! ## Status Codes
//!
//! - `MOVED_PERMANENT` - 301
//! - `FOUND` - 302
//! - `TEMPORARY_REDIRECT` - 307
//! - `PERMANENT_REDIRECT` - 308
//! - anything else - 302

pub mod agent;
pub mod client;
pub mod compile;
pub mod config;
pub mod error;
pub mod matcher;
pub mod middleware;
#[cfg(feature = "async")]
pub mod refresh;
pub mod snapshot;
pub mod source;
pub mod types;

// Re-export commonly used items
pub use agent::{validate_agent, Agent, AgentStatus, AgentType};
pub use client::{Client, RuleClient};
pub use compile::{compile, compile_strict, InvalidRulePolicy};
pub use config::{ClientConfig, ClientSettings, Config, HostConfig};
pub use error::{EngineError, FetchErrorKind, Result};
pub use matcher::{extract_regex_prefix, resolve_target, PageMatcher, RedirectMatcher};
pub use middleware::{Action, Interception, Middleware};
pub use snapshot::{RejectedRedirect, Snapshot, SnapshotSwitch};
pub use source::{FileRuleSource, HttpRuleSource, MemoryRuleSource, NilRuleSource, RuleSource};
pub use types::{
    Page, PageContentType, PageType, PaginatedResult, Redirect, RedirectMatch, RedirectStatus,
    RedirectType, RuleSet,
};

// Re-export refresh types
#[cfg(feature = "async")]
pub use refresh::{spawn_refresh, RefreshHandle, RefreshRegistry};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_full_workflow() {
        let rules: RuleSet = serde_json::from_str(
            r#"{
                "redirects": [
                    {"type": "BASIC_HOST", "source": "shop.com/sale", "target": "https://shop.com/deals", "status": "TEMPORARY_REDIRECT"},
                    {"type": "BASIC", "source": "/sale", "target": "/offers", "status": "MOVED_PERMANENT"},
                    {"type": "REGEX", "source": "^/blog/(\\d{4})/(.*)$", "target": "/posts/$2?year=$1", "status": "PERMANENT_REDIRECT"},
                    {"type": "REGEX", "source": "^/(broken", "target": "/x", "status": "FOUND"}
                ],
                "pages": [
                    {"type": "BASIC", "path": "/robots.txt", "content": "User-agent: *", "contentType": "TEXT_PLAIN"}
                ]
            }"#,
        )
        .unwrap();

        let source = Arc::new(MemoryRuleSource::new(rules));
        let config = ClientSettings {
            manager_url: "http://manager".to_string(),
            namespace_code: "ns".to_string(),
            project_code: "shop".to_string(),
            token_jwt: "jwt".to_string(),
            ..ClientSettings::default()
        }
        .transform("workflow")
        .unwrap();

        let client = Client::with_source(config, Box::new(source.clone()));
        client.init().unwrap();

        // Broken regex was skipped, not fatal
        assert_eq!(client.snapshot().rejected().len(), 1);
        assert_eq!(client.state_version(), 1);

        // Host-scoped exact rule
        let matched = client.redirect_match("shop.com", "/sale").unwrap();
        assert_eq!(matched.target, "https://shop.com/deals");
        assert_eq!(matched.http_code(), 307);

        // Path-only exact rule for other hosts
        let matched = client.redirect_match("blog.com", "/sale").unwrap();
        assert_eq!(matched.target, "/offers");
        assert_eq!(matched.http_code(), 301);

        // Regex with substitution
        let matched = client.redirect_match("blog.com", "/blog/2024/hello").unwrap();
        assert_eq!(matched.target, "/posts/hello?year=2024");
        assert_eq!(matched.http_code(), 308);

        // Page
        let page = client.page_match("blog.com", "/robots.txt").unwrap();
        assert_eq!(page.http_content_type(), "text/plain");

        // Report sent after the reload
        let reports = source.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, Some(AgentStatus::Success));
    }
}
