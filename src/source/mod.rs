//! Rule sources.
//!
//! A [`RuleSource`] hands the client one complete [`RuleSet`] per reload and
//! receives the agent report afterwards. Sources do no matching of their own.

mod file;
mod http;

pub use file::FileRuleSource;
pub use http::HttpRuleSource;

use std::sync::Arc;

use parking_lot::RwLock;

use crate::agent::Agent;
use crate::error::Result;
use crate::types::RuleSet;

/// Trait for fetching rule sets
pub trait RuleSource: Send + Sync {
    /// Fetch the complete current rule set
    fn fetch(&self) -> Result<RuleSet>;

    /// Report agent state after a reload attempt
    fn report(&self, agent: &Agent) -> Result<()> {
        let _ = agent;
        Ok(())
    }
}

impl<T: RuleSource + ?Sized> RuleSource for Arc<T> {
    fn fetch(&self) -> Result<RuleSet> {
        (**self).fetch()
    }

    fn report(&self, agent: &Agent) -> Result<()> {
        (**self).report(agent)
    }
}

/// Nil RuleSource - always returns an empty rule set
pub struct NilRuleSource;

impl RuleSource for NilRuleSource {
    fn fetch(&self) -> Result<RuleSet> {
        Ok(RuleSet::default())
    }
}

/// In-memory RuleSource for testing and embedding
pub struct MemoryRuleSource {
    rules: RwLock<RuleSet>,
    reports: RwLock<Vec<Agent>>,
}

impl MemoryRuleSource {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: RwLock::new(rules),
            reports: RwLock::new(Vec::new()),
        }
    }

    /// Replace the rule set returned by the next fetch
    pub fn set(&self, rules: RuleSet) {
        *self.rules.write() = rules;
    }

    /// Agent reports received so far
    pub fn reports(&self) -> Vec<Agent> {
        self.reports.read().clone()
    }
}

impl Default for MemoryRuleSource {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl RuleSource for MemoryRuleSource {
    fn fetch(&self) -> Result<RuleSet> {
        Ok(self.rules.read().clone())
    }

    fn report(&self, agent: &Agent) -> Result<()> {
        self.reports.write().push(agent.clone());
        Ok(())
    }
}
