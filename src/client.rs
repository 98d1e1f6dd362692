use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::agent::{validate_agent, Agent};
use crate::compile::{compile, InvalidRulePolicy};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::snapshot::{Snapshot, SnapshotSwitch};
use crate::source::{HttpRuleSource, RuleSource};
use crate::types::{Page, RedirectMatch};

/// Trait for rule clients used by the middleware
pub trait RuleClient: Send + Sync {
    /// Load the first snapshot
    fn init(&self) -> Result<()>;

    /// Fetch, build and publish a fresh snapshot
    fn reload(&self) -> Result<()>;

    /// Version of the published snapshot, 0 before the first load
    fn state_version(&self) -> u64;

    fn redirect_match(&self, host: &str, uri: &str) -> Option<RedirectMatch>;

    fn page_match(&self, host: &str, uri: &str) -> Option<Arc<Page>>;

    /// How often the client wants to be reloaded
    fn interval(&self) -> Duration;
}

/// Rule client keeping the published snapshot of one project
pub struct Client {
    config: ClientConfig,
    source: Box<dyn RuleSource>,
    snapshots: SnapshotSwitch,
    reload_lock: Mutex<()>,
}

impl Client {
    /// Create a client reading from the rule manager
    pub fn new(config: ClientConfig) -> Self {
        let source = HttpRuleSource::new(&config);
        Self::with_source(config, Box::new(source))
    }

    /// Create a client reading from a custom source
    pub fn with_source(config: ClientConfig, source: Box<dyn RuleSource>) -> Self {
        Self {
            config,
            source,
            snapshots: SnapshotSwitch::default(),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.load()
    }

    fn load_snapshot(&self, version: u64) -> Result<Snapshot> {
        let rules = self.source.fetch()?;
        compile(&rules, version, InvalidRulePolicy::Skip)
    }

    fn send_report(&self, agent: Agent) {
        if let Err(e) = validate_agent(&agent) {
            tracing::debug!(error = %e, "agent report not sent");
            return;
        }
        if let Err(e) = self.source.report(&agent) {
            tracing::warn!(
                project = %self.config.project_code,
                error = %e,
                "failed to report agent state"
            );
        }
    }
}

impl RuleClient for Client {
    fn init(&self) -> Result<()> {
        self.reload()
    }

    fn reload(&self) -> Result<()> {
        let _guard = self.reload_lock.lock();
        let started = Instant::now();
        let current = self.snapshots.version();

        match self.load_snapshot(current + 1) {
            Ok(snapshot) => {
                let version = snapshot.version();
                let redirects = snapshot.redirect_count();
                let pages = snapshot.page_count();
                let rejected = snapshot.rejected().len();
                self.snapshots.publish(snapshot);

                let elapsed = started.elapsed();
                tracing::info!(
                    project = %self.config.project_code,
                    version,
                    redirects,
                    pages,
                    rejected,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "published rule snapshot"
                );

                self.send_report(Agent::success(
                    self.config.agent_name.as_str(),
                    self.config.agent_type,
                    version,
                    elapsed,
                ));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    project = %self.config.project_code,
                    version = current,
                    error = %e,
                    "reload failed, keeping previous snapshot"
                );
                self.send_report(Agent::failure(
                    self.config.agent_name.as_str(),
                    self.config.agent_type,
                    current,
                    started.elapsed(),
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    fn state_version(&self) -> u64 {
        self.snapshots.version()
    }

    fn redirect_match(&self, host: &str, uri: &str) -> Option<RedirectMatch> {
        self.snapshots.load().match_redirect(host, uri)
    }

    fn page_match(&self, host: &str, uri: &str) -> Option<Arc<Page>> {
        self.snapshots.load().match_page(host, uri)
    }

    fn interval(&self) -> Duration {
        self.config.interval_check
    }
}
