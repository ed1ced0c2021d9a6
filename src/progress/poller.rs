use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::api::Backend;
use crate::error::Result;
use crate::progress::state::ProgressState;

pub struct ProgressPoller {
    backend: Arc<dyn Backend>,
    interval: Duration,
}

impl ProgressPoller {
    pub fn new(backend: Arc<dyn Backend>, interval: Duration) -> Self {
        Self { backend, interval }
    }

    /// Triggers the analysis and starts polling its progress. If the trigger
    /// fails nothing is spawned.
    pub async fn start(&self) -> Result<PollHandle> {
        self.backend.trigger_analysis().await?;
        Ok(self.watch())
    }

    /// Polls an analysis that is already running.
    pub fn watch(&self) -> PollHandle {
        let (tx, rx) = watch::channel(ProgressState::Running(0.0));
        let backend = self.backend.clone();
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First poll happens one period after start.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let next = ProgressState::observe(backend.analysis_progress().await);
                tracing::debug!("Analysis progress: {}", next);

                let terminal = next.is_terminal();
                if let ProgressState::Failed { ref message, .. } = next {
                    tracing::warn!("Progress polling stopped: {}", message);
                }
                if tx.send(next).is_err() || terminal {
                    break;
                }
            }
        });

        PollHandle { rx, task }
    }
}

/// A running poll. Dropping the handle stops the polling task.
pub struct PollHandle {
    rx: watch::Receiver<ProgressState>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn state(&self) -> ProgressState {
        self.rx.borrow().clone()
    }

    /// Waits for the next published state. `None` once polling has ended
    /// and every state has been seen.
    pub async fn next(&mut self) -> Option<ProgressState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until polling reaches a terminal state.
    pub async fn wait(&mut self) -> ProgressState {
        loop {
            let current = self.state();
            if current.is_terminal() {
                return current;
            }
            if self.rx.changed().await.is_err() {
                return self.state();
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
