//! Regex rules grouped by literal prefix.
//!
//! Each regex rule is stored in the bucket keyed by its literal prefix, or in
//! the root bucket when it has none. A query gathers every bucket whose key is
//! a prefix of the input plus the root bucket, orders the candidates by
//! descending source length and returns the first one whose regex matches.
//!
//! Bucket keys live in a `BTreeMap`, so the keys sharing the input's first
//! character form one contiguous range. That range is walked and every key is
//! re-checked with `starts_with`; keys that share only the first character are
//! visited and rejected.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use regex::Regex;

use super::placeholder::resolve_target;
use crate::types::{Redirect, RedirectMatch};

/// A regex redirect together with its compiled pattern
#[derive(Debug, Clone)]
pub struct CompiledRedirect {
    pub redirect: Arc<Redirect>,
    pub regex: Regex,
}

impl CompiledRedirect {
    pub fn new(redirect: Arc<Redirect>, regex: Regex) -> Self {
        Self { redirect, regex }
    }
}

/// Prefix-bucketed store of regex redirects
#[derive(Debug, Clone, Default)]
pub struct RegexBucketIndex {
    buckets: BTreeMap<String, Vec<CompiledRedirect>>,
    root: Vec<CompiledRedirect>,
}

impl RegexBucketIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entry` to the bucket for `prefix`; an empty prefix means the root bucket.
    pub fn insert(&mut self, prefix: &str, entry: CompiledRedirect) {
        if prefix.is_empty() {
            self.root.push(entry);
        } else if let Some(bucket) = self.buckets.get_mut(prefix) {
            bucket.push(entry);
        } else {
            self.buckets.insert(prefix.to_string(), vec![entry]);
        }
    }

    /// Every rule whose bucket key is a prefix of `input`, plus the root
    /// bucket, in evaluation order.
    pub fn candidates(&self, input: &str) -> Vec<&CompiledRedirect> {
        let mut candidates: Vec<&CompiledRedirect> = Vec::new();

        if let Some(first) = input.chars().next() {
            let mut buf = [0u8; 4];
            let head: &str = first.encode_utf8(&mut buf);

            let range = self
                .buckets
                .range::<str, _>((Bound::Included(head), Bound::Unbounded));
            for (prefix, bucket) in range {
                if !prefix.starts_with(head) {
                    break;
                }
                if input.starts_with(prefix.as_str()) {
                    candidates.extend(bucket.iter());
                }
            }
        }

        candidates.extend(self.root.iter());
        candidates.sort_unstable_by(|a, b| candidate_order(a, b));
        candidates
    }

    /// First candidate whose regex matches `input`, with its target resolved.
    pub fn find_match(&self, input: &str) -> Option<RedirectMatch> {
        for candidate in self.candidates(input) {
            if let Some(captures) = candidate.regex.captures(input) {
                let target = resolve_target(&candidate.redirect.target, &captures);
                return Some(RedirectMatch {
                    redirect: candidate.redirect.clone(),
                    target,
                });
            }
        }
        None
    }

    /// Number of non-root buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of rules with no literal prefix
    pub fn root_len(&self) -> usize {
        self.root.len()
    }

    /// Total number of stored rules
    pub fn len(&self) -> usize {
        self.root.len() + self.buckets.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.buckets.is_empty()
    }
}

/// Longer source first. Ties fall back to the source text, then target and
/// status, so the order never depends on insertion order.
fn candidate_order(a: &CompiledRedirect, b: &CompiledRedirect) -> Ordering {
    let (a, b) = (&a.redirect, &b.redirect);
    b.source
        .len()
        .cmp(&a.source.len())
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.target.cmp(&b.target))
        .then_with(|| a.status.cmp(&b.status))
}
