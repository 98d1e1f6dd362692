//! Background reloading of rule clients.
//!
//! Every client gets one tokio task that calls [`RuleClient::reload`] on the
//! blocking pool once per interval. The first reload happens one interval
//! after the task starts; the initial load is the caller's job.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::client::RuleClient;

/// Shortest accepted refresh period
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running refresh task.
///
/// Dropping the handle stops the task.
pub struct RefreshHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Ask the task to stop after its current reload, if any
    pub fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.cancel();
        let _ = self.task.await;
    }
}

/// Start reloading `client` every `period`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_refresh(client: Arc<dyn RuleClient>, period: Duration) -> RefreshHandle {
    let period = period.max(MIN_REFRESH_INTERVAL);
    let (stop, mut stopped) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::debug!(period_ms = period.as_millis() as u64, "refresh task started");

        loop {
            tokio::select! {
                _ = &mut stopped => break,
                _ = ticker.tick() => {
                    let client = client.clone();
                    match tokio::task::spawn_blocking(move || client.reload()).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => tracing::warn!(error = %e, "scheduled reload failed"),
                        Err(e) => tracing::error!(error = %e, "reload task panicked"),
                    }
                }
            }
        }

        tracing::debug!("refresh task stopped");
    });

    RefreshHandle {
        stop: Some(stop),
        task,
    }
}

/// Owner of the refresh tasks of named middleware instances.
///
/// Registering under a name that already has tasks cancels the old ones, so a
/// rebuilt middleware replaces its predecessor. Dropping the registry cancels
/// every task it holds.
#[derive(Default)]
pub struct RefreshRegistry {
    tasks: Mutex<HashMap<String, Vec<RefreshHandle>>>,
}

impl RefreshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handles` under `name`, cancelling whatever was there before.
    pub fn register(&self, name: impl Into<String>, handles: Vec<RefreshHandle>) {
        let name = name.into();
        let previous = self.tasks.lock().insert(name.clone(), handles);
        if let Some(mut previous) = previous {
            tracing::debug!(name = %name, tasks = previous.len(), "cancelling superseded refresh tasks");
            previous.iter_mut().for_each(RefreshHandle::cancel);
        }
    }

    /// Cancel the tasks registered under `name`. Returns whether any existed.
    pub fn cancel(&self, name: &str) -> bool {
        match self.tasks.lock().remove(name) {
            Some(mut handles) => {
                handles.iter_mut().for_each(RefreshHandle::cancel);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        let drained: Vec<_> = self.tasks.lock().drain().collect();
        for (_, mut handles) in drained {
            handles.iter_mut().for_each(RefreshHandle::cancel);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.lock().contains_key(name)
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for RefreshRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
