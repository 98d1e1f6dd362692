//! Request matching.
//!
//! Exact rules live in hash maps keyed by the full matching key; regex rules
//! are grouped into buckets by the literal prefix of their pattern so a query
//! only evaluates the regexes that can possibly apply.

mod bucket;
mod exact;
mod page;
mod placeholder;
mod prefix;
mod redirect;

pub use bucket::{CompiledRedirect, RegexBucketIndex};
pub use exact::ExactMatchIndex;
pub use page::PageMatcher;
pub use placeholder::resolve_target;
pub use prefix::extract_regex_prefix;
pub use redirect::RedirectMatcher;
