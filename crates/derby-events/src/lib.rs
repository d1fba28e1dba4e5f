#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Client notification bus for the derby sync client.
//!
//! The bus provides a typed event enum, sequential identifiers, and replay of
//! recent events for subscribers that reconnect with the last id they saw.
//! Internally it uses `tokio::broadcast` with a bounded buffer; when the
//! channel overflows, the oldest events are dropped.

pub mod payloads;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::{debug, warn};

pub use payloads::{DEFAULT_REPLAY_CAPACITY, Event, EventEnvelope, EventId};

struct Replay {
    next_id: EventId,
    buffer: VecDeque<EventEnvelope>,
}

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    replay: Arc<Mutex<Replay>>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a new bus with the provided broadcast capacity.
    ///
    /// The broadcast channel uses the same capacity as the in-memory replay
    /// buffer, so dropped events affect both structures consistently.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "event bus capacity must be positive");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            replay: Arc::new(Mutex::new(Replay {
                next_id: 1,
                buffer: VecDeque::with_capacity(capacity),
            })),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default in-memory buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish a new event, assigning it the next sequential identifier.
    ///
    /// Publishing never blocks and succeeds with or without subscribers.
    pub fn publish(&self, event: Event) -> EventId {
        let kind = event.kind();
        let mut replay = self.lock_replay();
        let id = replay.next_id;
        replay.next_id = replay.next_id.saturating_add(1);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        if replay.buffer.len() == self.replay_capacity {
            replay.buffer.pop_front();
        }
        replay.buffer.push_back(envelope.clone());

        // Sending under the replay lock keeps broadcast order equal to id order.
        if self.sender.send(envelope).is_err() {
            debug!(event_id = id, event_kind = kind, "event published without subscribers");
        }
        id
    }

    /// Subscribe to the bus, replaying buffered events newer than `since_id`.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let replay = self.lock_replay();
        let receiver = self.sender.subscribe();
        let backlog = since_id.map_or_else(VecDeque::new, |since| {
            replay
                .buffer
                .iter()
                .filter(|envelope| envelope.id > since)
                .cloned()
                .collect()
        });
        EventStream { backlog, receiver }
    }

    /// Returns the last assigned identifier, if any events have been published.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.lock_replay().buffer.back().map(|envelope| envelope.id)
    }

    fn lock_replay(&self) -> MutexGuard<'_, Replay> {
        self.replay.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream wrapper that yields events either from the replay backlog or from the
/// live broadcast channel.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
}

impl EventStream {
    /// Receive the next event, respecting the replay backlog first.
    ///
    /// Returns `None` once every bus handle has been dropped.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(envelope) = self.backlog.pop_front() {
            return Some(envelope);
        }

        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscriber lagged; oldest events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
