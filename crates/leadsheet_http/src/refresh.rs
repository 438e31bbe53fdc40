//! Periodic background fetch of all leads.

use std::sync::Arc;
use std::time::Duration;

use leadsheet_core::lead::Lead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::access::LeadSheetClient;
use crate::client::HttpClient;

const REFRESH_CHANNEL_CAPACITY: usize = 4;
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
pub enum RefreshEvent {
    Leads(Vec<Lead>),
    /// The fetch failed. Never surfaced as an alert, the next tick retries.
    Failed(String),
}

/// Stops the refresh task when stopped or dropped.
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a task fetching all leads every `interval`, the first fetch happens
/// immediately.
///
/// Missed ticks are skipped. The task also stops once the receiver is
/// dropped. Must be called from within a tokio runtime.
pub fn spawn_silent_refresh<C>(
    client: Arc<LeadSheetClient<C>>,
    interval: Duration,
) -> (RefreshHandle, mpsc::Receiver<RefreshEvent>)
where
    C: HttpClient,
{
    let (tx, rx) = mpsc::channel(REFRESH_CHANNEL_CAPACITY);
    let interval = interval.max(MIN_REFRESH_INTERVAL);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => (),
                _ = tx.closed() => break,
            }

            let event = match client.fetch_all().await {
                Ok(leads) => {
                    debug!(count = leads.len(), "silent refresh");
                    RefreshEvent::Leads(leads)
                }
                Err(e) => {
                    warn!(error = %e, "silent refresh failed");
                    RefreshEvent::Failed(e.to_string())
                }
            };

            if tx.send(event).await.is_err() {
                break;
            }
        }
        debug!("silent refresh stopped");
    });

    (RefreshHandle { task }, rx)
}
