//! Literal prefix extraction for regex bucketing.
//!
//! A regex is parsed (not compiled) into its high-level IR and walked from the
//! left, collecting the literal text every match must start with. The result
//! keys the bucket the rule lands in; an empty prefix sends it to the root
//! bucket, which is scanned on every query.
//!
//! A single leading `^` is stripped before parsing. Patterns that are not
//! anchored at the start are still bucketed by their leading literal, so
//! `/foo` only becomes a candidate for inputs starting with `/foo` even though
//! the regex itself would also match `/x/foo`.
//!
//! Rules compile with the `regex` crate's defaults, where `\d`, `\w` and `\s`
//! are Unicode-aware: `^/item/(\d+)$` also matches `/item/٣`. A rule that must
//! accept ASCII only should spell the class out, as in `[0-9]`, or use `(?-u)`.

use regex_syntax::hir::{Hir, HirKind};
use regex_syntax::Parser;

/// Extract the longest literal prefix guaranteed at the start of every match.
///
/// Never fails: a pattern that does not parse yields an empty prefix.
pub fn extract_regex_prefix(pattern: &str) -> String {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);

    let hir = match Parser::new().parse(pattern) {
        Ok(hir) => hir,
        Err(_) => return String::new(),
    };

    let mut prefix = Vec::new();
    collect_literal_prefix(&hir, &mut prefix);

    String::from_utf8(prefix).unwrap_or_default()
}

/// Append the literal run at the start of `hir` to `out`.
///
/// Returns `true` only when the whole node was literal text, i.e. when a
/// caller walking a concatenation may keep accumulating after it.
fn collect_literal_prefix(hir: &Hir, out: &mut Vec<u8>) -> bool {
    match hir.kind() {
        HirKind::Literal(lit) => {
            out.extend_from_slice(&lit.0);
            true
        }
        HirKind::Concat(subs) => {
            for sub in subs {
                match sub.kind() {
                    HirKind::Literal(lit) => out.extend_from_slice(&lit.0),
                    // One capture group: descend and continue only if it was fully literal
                    HirKind::Capture(cap) => {
                        if !collect_literal_prefix(&cap.sub, out) {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
            true
        }
        HirKind::Capture(cap) => collect_literal_prefix(&cap.sub, out),
        _ => false,
    }
}
