//! Background reply requests.
//!
//! The event loop never awaits the network directly. Each submission is
//! spawned as a tokio task, and a small watcher task joins it and sends the
//! outcome back over a channel. The event loop waits on that channel next
//! to terminal input and applies finished replies to the [`App`].

use std::collections::VecDeque;
use std::sync::Arc;

use companion_engine::{PendingReply, Reply, ReplyError, ReplyService};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::warn;

use crate::app::App;

/// Outcome of one reply request.
#[derive(Debug)]
struct Finished {
    id: u64,
    generation: u64,
    result: Result<Reply, ReplyError>,
}

/// In-flight reply requests, each tagged with its generation.
pub struct ReplyTasks {
    service: Arc<dyn ReplyService>,
    next_id: u64,
    running: Vec<(u64, AbortHandle)>,
    ready: VecDeque<Finished>,
    finished_tx: mpsc::UnboundedSender<Finished>,
    finished_rx: mpsc::UnboundedReceiver<Finished>,
}

impl ReplyTasks {
    pub fn new(service: Arc<dyn ReplyService>) -> Self {
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        Self {
            service,
            next_id: 0,
            running: Vec::new(),
            ready: VecDeque::new(),
            finished_tx,
            finished_rx,
        }
    }

    /// Start requesting the reply for `request`.
    pub fn spawn(&mut self, request: PendingReply) {
        let id = self.next_id;
        self.next_id += 1;
        let generation = request.generation;

        let service = Arc::clone(&self.service);
        let handle = tokio::spawn(async move {
            service.reply(&request.message, &request.history).await
        });
        self.running.push((id, handle.abort_handle()));

        let finished_tx = self.finished_tx.clone();
        tokio::spawn(async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    // A task that died still has to release the pending flag
                    warn!(error = %e, generation, "reply task did not finish");
                    Err(ReplyError::Network(e.to_string()))
                }
            };
            let _ = finished_tx.send(Finished {
                id,
                generation,
                result,
            });
        });
    }

    /// Number of requests still running.
    pub fn in_flight(&self) -> usize {
        self.running.len()
    }

    /// Wait until a request finishes. Never resolves while none are running.
    ///
    /// Cancel safe, so it can sit in a `select!` next to input.
    pub async fn wait_finished(&mut self) {
        if !self.ready.is_empty() {
            return;
        }
        // The sender half lives in `self`, so this only ends with a result
        if let Some(finished) = self.finished_rx.recv().await {
            self.ready.push_back(finished);
        }
    }

    /// Apply every finished request to `app` without waiting on running ones.
    ///
    /// Returns how many were applied.
    pub fn collect_finished(&mut self, app: &mut App) -> usize {
        while let Ok(finished) = self.finished_rx.try_recv() {
            self.ready.push_back(finished);
        }

        let mut count = 0;
        while let Some(finished) = self.ready.pop_front() {
            let Some(pos) = self.running.iter().position(|(id, _)| *id == finished.id) else {
                // Aborted through `abort_all`
                continue;
            };
            self.running.remove(pos);
            app.apply_reply(finished.generation, finished.result);
            count += 1;
        }
        count
    }

    /// Abort any remaining tasks.
    pub fn abort_all(&mut self) {
        for (_, handle) in self.running.drain(..) {
            handle.abort();
        }
        self.ready.clear();
    }
}
