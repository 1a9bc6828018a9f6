use std::time::Duration;

use propsync_model::LifecycleStatus;
use propsync_plane::PlaneError;
use tokio::sync::{mpsc, watch};

// ---------------------------------------------------------------------------
// StatusEvent / StatusFeed
// ---------------------------------------------------------------------------

/// One observation published by a background poll.
///
/// `keep_polling == false` tells the consumer the feed is done: the tracked
/// object reached a terminal status, or the poll itself failed (in which case
/// `status` is `FAILED`). Consumers treat a non-active final event as an
/// abort, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub status: LifecycleStatus,
    pub keep_polling: bool,
}

/// Receiving half of one poll's status feed. Every in-flight operation owns
/// its own feed; feeds are never shared or reused.
///
/// Dropping the feed stops the background task at its next tick; [`stop`]
/// stops it immediately. Either way an abandoned poll cannot leak.
///
/// [`stop`]: StatusFeed::stop
pub struct StatusFeed {
    events: mpsc::Receiver<StatusEvent>,
    stop: watch::Sender<bool>,
}

impl StatusFeed {
    /// Next observation, or `None` once the poll task has exited.
    pub async fn recv(&mut self) -> Option<StatusEvent> {
        self.events.recv().await
    }

    /// Explicitly stop the background poll.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}

// ---------------------------------------------------------------------------
// spawn_status_poll
// ---------------------------------------------------------------------------

/// Spawn a background task that repeatedly calls `fetch` every `interval`
/// and publishes each observed status onto the returned feed.
///
/// The task exits on the first terminal status, on a fetch error (published
/// as a final `FAILED`/stop event), on an explicit [`StatusFeed::stop`], or
/// when the feed is dropped.
pub fn spawn_status_poll<F>(what: impl Into<String>, interval: Duration, fetch: F) -> StatusFeed
where
    F: Fn() -> Result<LifecycleStatus, PlaneError> + Send + 'static,
{
    let what = what.into();
    let (events_tx, events_rx) = mpsc::channel(16);
    let (stop_tx, mut stop_rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop_rx.changed() => {
                    tracing::debug!(what = %what, "status poll stopped");
                    return;
                }
            }

            match fetch() {
                Ok(status) => {
                    let keep_polling = !status.is_terminal();
                    tracing::debug!(what = %what, status = %status, "status observed");
                    if events_tx
                        .send(StatusEvent {
                            status,
                            keep_polling,
                        })
                        .await
                        .is_err()
                    {
                        return;
                    }
                    if !keep_polling {
                        return;
                    }
                }
                Err(err) => {
                    tracing::warn!(what = %what, error = %err, "status poll failed");
                    let _ = events_tx
                        .send(StatusEvent {
                            status: LifecycleStatus::Failed,
                            keep_polling: false,
                        })
                        .await;
                    return;
                }
            }
        }
    });

    StatusFeed {
        events: events_rx,
        stop: stop_tx,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
