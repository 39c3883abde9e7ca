use crate::sync::Clipboard;
use clipmesh_core::{Fingerprint, SyncMessage};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Detects local content changes and applies remote ones, gated entirely by
/// fingerprint equality: content whose fingerprint matches the last seen one
/// triggers neither a write nor a send.
///
/// Echo suppression relies on the update-then-write order in
/// [`apply_inbound`](Self::apply_inbound): the fingerprint is recorded before
/// the clipboard write, so the next poll tick reads the applied content,
/// computes the same fingerprint, finds it equal and stays quiet.
pub struct SyncEngine {
    clipboard: Arc<dyn Clipboard>,
    last_seen: Arc<Mutex<Option<Fingerprint>>>,
    broadcast_tx: mpsc::Sender<SyncMessage>,
    poll_interval: Duration,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl SyncEngine {
    pub fn new(
        clipboard: Arc<dyn Clipboard>,
        broadcast_tx: mpsc::Sender<SyncMessage>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            clipboard,
            last_seen: Arc::new(Mutex::new(None)),
            broadcast_tx,
            poll_interval,
            monitor: Mutex::new(None),
        }
    }

    /// Begin polling the content source. Idempotent: a second call while the
    /// monitor runs is a no-op.
    pub fn start(&self) {
        let mut monitor = self.monitor.lock().unwrap();
        if monitor.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!("Content monitor already running");
            return;
        }

        info!("Starting content monitor ({:?} interval)", self.poll_interval);
        let clipboard = self.clipboard.clone();
        let last_seen = self.last_seen.clone();
        let broadcast_tx = self.broadcast_tx.clone();
        let interval = self.poll_interval;

        *monitor = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // One tick at a time; a slow broadcast delays the next poll
            // instead of stacking.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poll_once(&clipboard, &last_seen, &broadcast_tx).await;
            }
        }));
    }

    /// Cancel the poll. Safe to call when not running.
    pub fn stop(&self) {
        if let Some(task) = self.monitor.lock().unwrap().take() {
            task.abort();
            info!("Content monitor stopped");
        }
    }

    /// Apply a content envelope received from a peer. The fingerprint is
    /// recorded *before* the clipboard write; reversing the order would make
    /// the next poll tick re-broadcast what we just applied.
    pub fn apply_inbound(&self, msg: &SyncMessage) {
        let SyncMessage::Content {
            payload,
            fingerprint,
        } = msg;

        {
            let mut last = self.last_seen.lock().unwrap();
            if last.as_ref() == Some(fingerprint) {
                return;
            }
            *last = Some(fingerprint.clone());
        }

        if let Err(e) = self.clipboard.write(payload) {
            warn!("Failed to write content sink: {:#}", e);
        }
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        if let Some(task) = self.monitor.lock().unwrap().take() {
            task.abort();
        }
    }
}

async fn poll_once(
    clipboard: &Arc<dyn Clipboard>,
    last_seen: &Arc<Mutex<Option<Fingerprint>>>,
    broadcast_tx: &mpsc::Sender<SyncMessage>,
) {
    let text = match clipboard.read() {
        Ok(Some(text)) if !text.is_empty() => text,
        Ok(_) => return,
        Err(e) => {
            warn!("Failed to read content source: {:#}", e);
            return;
        }
    };

    let fingerprint = Fingerprint::of(&text);
    {
        let mut last = last_seen.lock().unwrap();
        if last.as_ref() == Some(&fingerprint) {
            return;
        }
        *last = Some(fingerprint.clone());
    }

    debug!("Local content changed, broadcasting");
    let _ = broadcast_tx
        .send(SyncMessage::Content {
            payload: text,
            fingerprint,
        })
        .await;
}
