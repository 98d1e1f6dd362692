//! Immutable rule snapshots and their publication.
//!
//! A [`Snapshot`] is built off to the side from one complete rule set and then
//! handed to readers through [`SnapshotSwitch::publish`], a single atomic
//! pointer swap. Readers holding the previous snapshot keep using it until
//! they drop their `Arc`; nothing is mutated in place.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::matcher::{PageMatcher, RedirectMatcher};
use crate::types::{Page, Redirect, RedirectMatch};

/// A redirect left out of a snapshot because its regex did not compile
#[derive(Debug, Clone)]
pub struct RejectedRedirect {
    pub redirect: Redirect,
    pub reason: String,
}

/// One complete, read-only rule set
#[derive(Debug, Default)]
pub struct Snapshot {
    version: u64,
    redirects: RedirectMatcher,
    pages: PageMatcher,
    rejected: Vec<RejectedRedirect>,
}

impl Snapshot {
    pub fn new(
        version: u64,
        redirects: RedirectMatcher,
        pages: PageMatcher,
        rejected: Vec<RejectedRedirect>,
    ) -> Self {
        Self {
            version,
            redirects,
            pages,
            rejected,
        }
    }

    /// Snapshot with no rules, version 0
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn match_redirect(&self, host: &str, uri: &str) -> Option<RedirectMatch> {
        self.redirects.match_request(host, uri)
    }

    pub fn match_page(&self, host: &str, uri: &str) -> Option<Arc<Page>> {
        self.pages.match_request(host, uri)
    }

    pub fn redirect_count(&self) -> usize {
        self.redirects.len()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Redirects dropped while building this snapshot
    pub fn rejected(&self) -> &[RejectedRedirect] {
        &self.rejected
    }
}

/// Holder of the currently published snapshot
pub struct SnapshotSwitch {
    current: ArcSwap<Snapshot>,
}

impl SnapshotSwitch {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// The published snapshot
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replace the published snapshot, returning the previous one.
    pub fn publish(&self, next: Snapshot) -> Arc<Snapshot> {
        self.current.swap(Arc::new(next))
    }

    pub fn version(&self) -> u64 {
        self.current.load().version()
    }
}

impl Default for SnapshotSwitch {
    fn default() -> Self {
        Self::new(Snapshot::empty())
    }
}
