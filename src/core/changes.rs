//! Topic-based change notifications.
//!
//! Each `(student, table)` pair is a topic backed by a Tokio broadcast
//! channel, created lazily on first subscription. Publishing never blocks;
//! a topic without receivers is dropped on the next publish.

use crate::models::change::{ChangeEvent, Table, topic};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

const CHANNEL_CAPACITY: usize = 64;

type Sender = broadcast::Sender<ChangeEvent>;

#[derive(Clone, Default)]
pub struct ChangeHub {
    topics: Arc<RwLock<HashMap<String, Sender>>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to changes of `table` rows owned by `student`.
    pub fn subscribe(&self, student: &str, table: Table) -> Subscription {
        let name = topic(student, table);
        let mut map = self.topics.write().unwrap_or_else(|p| p.into_inner());
        let rx = map
            .entry(name.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();
        Subscription { topic: name, rx }
    }

    /// Deliver `event` to every current subscriber of its topic.
    pub fn publish(&self, event: ChangeEvent) {
        let name = event.topic();
        let mut map = self.topics.write().unwrap_or_else(|p| p.into_inner());
        if let Some(sender) = map.get(&name) {
            let _ = sender.send(event);
            if sender.receiver_count() == 0 {
                map.remove(&name);
            }
        }
    }

    pub fn subscriber_count(&self, student: &str, table: Table) -> usize {
        let map = self.topics.read().unwrap_or_else(|p| p.into_inner());
        map.get(&topic(student, table))
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}

/// Receiving end of one topic.
pub struct Subscription {
    topic: String,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Next queued event, if any, without waiting.
    ///
    /// When the subscriber fell behind and events were dropped, a synthetic
    /// "something changed" is reported as `Lagged` so the caller still re-fetches.
    pub fn try_next(&mut self) -> Poll {
        match self.rx.try_recv() {
            Ok(ev) => Poll::Event(ev),
            Err(TryRecvError::Lagged(n)) => Poll::Lagged(n),
            Err(TryRecvError::Empty) => Poll::Empty,
            Err(TryRecvError::Closed) => Poll::Closed,
        }
    }

    /// Drain everything queued. Returns true when at least one change
    /// (or a lag) was seen.
    pub fn drain(&mut self) -> bool {
        let mut seen = false;
        loop {
            match self.try_next() {
                Poll::Event(_) | Poll::Lagged(_) => seen = true,
                Poll::Empty | Poll::Closed => return seen,
            }
        }
    }

    /// Block the current thread until the next event arrives.
    /// Returns `None` once the hub is gone.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.blocking_recv() {
                Ok(ev) => return Some(ev),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Poll {
    Event(ChangeEvent),
    Lagged(u64),
    Empty,
    Closed,
}
