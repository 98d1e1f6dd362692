use std::sync::Arc;

use super::exact::ExactMatchIndex;
use super::redirect::join_host_uri;
use crate::types::{Page, PageType};

/// Static page matcher.
///
/// Pages only come in exact flavours: `BASIC_HOST` keyed on host + uri is
/// tried first, then `BASIC` keyed on uri.
#[derive(Debug, Clone, Default)]
pub struct PageMatcher {
    basic_host: ExactMatchIndex<Arc<Page>>,
    basic: ExactMatchIndex<Arc<Page>>,
}

impl PageMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a page. Pages of unknown type are ignored.
    pub fn insert(&mut self, page: impl Into<Arc<Page>>) {
        let page = page.into();

        let index = match page.page_type {
            PageType::BasicHost => &mut self.basic_host,
            PageType::Basic => &mut self.basic,
            PageType::Unknown => {
                tracing::debug!(path = %page.path, "ignoring page of unknown type");
                return;
            }
        };

        let key = page.path.clone();
        if index.insert(key, page).is_some() {
            tracing::debug!("replaced duplicate page");
        }
    }

    /// Find the page for a request, `None` when nothing matches.
    pub fn match_request(&self, host: &str, uri: &str) -> Option<Arc<Page>> {
        self.basic_host
            .get(&join_host_uri(host, uri))
            .or_else(|| self.basic.get(uri))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.basic_host.len() + self.basic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
