use crate::error::Result;
use crate::matcher::{PageMatcher, RedirectMatcher};
use crate::snapshot::{RejectedRedirect, Snapshot};
use crate::types::RuleSet;

/// What to do with a redirect whose regex does not compile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRulePolicy {
    /// Fail the whole build with the first error
    Abort,
    /// Leave the rule out and record it in [`Snapshot::rejected`]
    #[default]
    Skip,
}

/// Build a snapshot from a complete rule set.
pub fn compile(rules: &RuleSet, version: u64, policy: InvalidRulePolicy) -> Result<Snapshot> {
    let mut redirects = RedirectMatcher::new();
    let mut rejected = Vec::new();

    for redirect in &rules.redirects {
        match redirects.insert(redirect.clone()) {
            Ok(()) => {}
            Err(err) if policy == InvalidRulePolicy::Skip => {
                tracing::warn!(
                    source = %redirect.source,
                    error = %err,
                    "skipping redirect with invalid regex"
                );
                rejected.push(RejectedRedirect {
                    redirect: redirect.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    let mut pages = PageMatcher::new();
    for page in &rules.pages {
        pages.insert(page.clone());
    }

    Ok(Snapshot::new(version, redirects, pages, rejected))
}

/// Build a snapshot, failing on the first invalid rule.
pub fn compile_strict(rules: &RuleSet, version: u64) -> Result<Snapshot> {
    compile(rules, version, InvalidRulePolicy::Abort)
}
