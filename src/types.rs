use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Redirect rule type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectType {
    /// Exact match on the request path
    Basic,
    /// Exact match on host + path
    BasicHost,
    /// Regex match on the request path
    Regex,
    /// Regex match on host + path
    RegexHost,
    /// Unrecognized or missing type; never matched
    #[default]
    #[serde(other)]
    Unknown,
}

impl RedirectType {
    /// Whether the matching key is host + path rather than path alone
    pub fn is_host_scoped(&self) -> bool {
        matches!(self, RedirectType::BasicHost | RedirectType::RegexHost)
    }

    /// Whether the source is a regular expression
    pub fn is_regex(&self) -> bool {
        matches!(self, RedirectType::Regex | RedirectType::RegexHost)
    }
}

/// Redirect HTTP status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectStatus {
    MovedPermanent,
    Found,
    TemporaryRedirect,
    PermanentRedirect,
    /// Unrecognized or missing status; answered as 302
    #[default]
    #[serde(other)]
    Unknown,
}

impl RedirectStatus {
    /// Numeric HTTP status code
    pub fn http_code(&self) -> u16 {
        match self {
            RedirectStatus::MovedPermanent => 301,
            RedirectStatus::Found => 302,
            RedirectStatus::TemporaryRedirect => 307,
            RedirectStatus::PermanentRedirect => 308,
            RedirectStatus::Unknown => 302,
        }
    }
}

/// A redirect rule as supplied by the rule source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    #[serde(rename = "type", default)]
    pub redirect_type: RedirectType,
    /// Literal key, or regex source for regex types
    #[serde(default)]
    pub source: String,
    /// Literal target, or a `$1`..`$9` template for regex types
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub status: RedirectStatus,
}

impl Redirect {
    pub fn new(
        redirect_type: RedirectType,
        source: impl Into<String>,
        target: impl Into<String>,
        status: RedirectStatus,
    ) -> Self {
        Self {
            redirect_type,
            source: source.into(),
            target: target.into(),
            status,
        }
    }

    pub fn http_code(&self) -> u16 {
        self.status.http_code()
    }
}

/// Static page type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageType {
    Basic,
    BasicHost,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Declared content type of a static page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageContentType {
    TextPlain,
    Xml,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PageContentType {
    /// MIME type served for this content type
    pub fn mime(&self) -> &'static str {
        match self {
            PageContentType::TextPlain => "text/plain",
            PageContentType::Xml => "application/xml",
            PageContentType::Unknown => "text/plain",
        }
    }
}

/// A static page override
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "type", default)]
    pub page_type: PageType,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "contentType", default)]
    pub content_type: PageContentType,
}

impl Page {
    pub fn new(
        page_type: PageType,
        path: impl Into<String>,
        content: impl Into<String>,
        content_type: PageContentType,
    ) -> Self {
        Self {
            page_type,
            path: path.into(),
            content: content.into(),
            content_type,
        }
    }

    pub fn http_content_type(&self) -> &'static str {
        self.content_type.mime()
    }
}

/// Complete rule data for one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub redirects: Vec<Redirect>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl RuleSet {
    pub fn new(redirects: Vec<Redirect>, pages: Vec<Page>) -> Self {
        Self { redirects, pages }
    }

    pub fn is_empty(&self) -> bool {
        self.redirects.is_empty() && self.pages.is_empty()
    }
}

/// Match result from the redirect matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectMatch {
    /// The winning rule
    pub redirect: Arc<Redirect>,
    /// Target with capture placeholders resolved
    pub target: String,
}

impl RedirectMatch {
    pub fn http_code(&self) -> u16 {
        self.redirect.http_code()
    }
}

/// One page of a paginated manager listing.
///
/// The manager writes capitalized field names; lowercase ones are accepted too.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaginatedResult<T> {
    #[serde(default = "Vec::new", alias = "items")]
    pub items: Vec<T>,
    #[serde(default, alias = "total")]
    pub total: usize,
    #[serde(default, alias = "limit")]
    pub limit: usize,
    #[serde(default, alias = "offset")]
    pub offset: usize,
}

impl<T> PaginatedResult<T> {
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RedirectStatus::MovedPermanent.http_code(), 301);
        assert_eq!(RedirectStatus::Found.http_code(), 302);
        assert_eq!(RedirectStatus::TemporaryRedirect.http_code(), 307);
        assert_eq!(RedirectStatus::PermanentRedirect.http_code(), 308);
        assert_eq!(RedirectStatus::Unknown.http_code(), 302);
    }

    #[test]
    fn test_unknown_status_deserializes_to_302() {
        let r: Redirect =
            serde_json::from_str(r#"{"type":"BASIC","source":"/a","target":"/b","status":"GONE"}"#)
                .unwrap();
        assert_eq!(r.status, RedirectStatus::Unknown);
        assert_eq!(r.http_code(), 302);

        let r: Redirect =
            serde_json::from_str(r#"{"type":"BASIC","source":"/a","target":"/b","status":""}"#)
                .unwrap();
        assert_eq!(r.http_code(), 302);

        let r: Redirect = serde_json::from_str(r#"{"type":"BASIC","source":"/a"}"#).unwrap();
        assert_eq!(r.http_code(), 302);
    }

    #[test]
    fn test_redirect_wire_names() {
        let r: Redirect = serde_json::from_str(
            r#"{"type":"REGEX_HOST","source":"^a","target":"b","status":"PERMANENT_REDIRECT"}"#,
        )
        .unwrap();
        assert_eq!(r.redirect_type, RedirectType::RegexHost);
        assert_eq!(r.status, RedirectStatus::PermanentRedirect);
        assert!(r.redirect_type.is_host_scoped());
        assert!(r.redirect_type.is_regex());

        let json = serde_json::to_string(&Redirect::new(
            RedirectType::BasicHost,
            "example.com/a",
            "/b",
            RedirectStatus::MovedPermanent,
        ))
        .unwrap();
        assert!(json.contains(r#""type":"BASIC_HOST""#), "got: {}", json);
        assert!(json.contains(r#""status":"MOVED_PERMANENT""#), "got: {}", json);
    }

    #[test]
    fn test_unknown_redirect_type() {
        let r: Redirect = serde_json::from_str(r#"{"type":"WILDCARD","source":"/a"}"#).unwrap();
        assert_eq!(r.redirect_type, RedirectType::Unknown);
        assert!(!r.redirect_type.is_regex());
    }

    #[test]
    fn test_page_content_type() {
        let xml = Page::new(PageType::Basic, "/sitemap.xml", "<urlset/>", PageContentType::Xml);
        assert_eq!(xml.http_content_type(), "application/xml");

        let text = Page::new(PageType::Basic, "/robots.txt", "", PageContentType::TextPlain);
        assert_eq!(text.http_content_type(), "text/plain");

        let unset: Page = serde_json::from_str(r#"{"type":"BASIC","path":"/x"}"#).unwrap();
        assert_eq!(unset.content_type, PageContentType::Unknown);
        assert_eq!(unset.http_content_type(), "text/plain");

        let wire: Page =
            serde_json::from_str(r#"{"type":"BASIC_HOST","path":"a.com/x","contentType":"XML"}"#)
                .unwrap();
        assert_eq!(wire.page_type, PageType::BasicHost);
        assert_eq!(wire.http_content_type(), "application/xml");
    }

    #[test]
    fn test_has_more() {
        let page = PaginatedResult {
            items: vec![1, 2],
            total: 5,
            limit: 2,
            offset: 2,
        };
        assert!(page.has_more());

        let last = PaginatedResult {
            items: vec![5],
            total: 5,
            limit: 2,
            offset: 4,
        };
        assert!(!last.has_more());
    }

    #[test]
    fn test_paginated_wire_names() {
        let page: PaginatedResult<Redirect> = serde_json::from_str(
            r#"{"Items":[{"type":"BASIC","source":"/a","target":"/b"}],"Total":3,"Limit":1,"Offset":0}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.has_more());

        let page: PaginatedResult<Redirect> =
            serde_json::from_str(r#"{"items":[],"total":0,"limit":20,"offset":0}"#).unwrap();
        assert!(!page.has_more());
    }
}
