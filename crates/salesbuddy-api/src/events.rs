//! Change notifications.
//!
//! [`ChangeFeed`] is an in-process publish/subscribe hub keyed by entity.
//! Each key gets its own `tokio::sync::broadcast` channel, created on first
//! subscription and removed when the last subscriber goes away. Handlers
//! publish after a write commits; subscribers are streamed the events as
//! server-sent events.
//!
//! | Method | Path | Key |
//! |--------|------|-----|
//! | `GET`  | `/company/events` | [`EntityKey::Profile`] of the caller |
//! | `GET`  | `/leads/:id/messages/events` | [`EntityKey::LeadThread`] |

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::{DateTime, Utc};
use futures::{Stream, stream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

/// Per-key channel capacity. Slow subscribers skip ahead rather than block
/// publishers.
const CHANNEL_CAPACITY: usize = 64;

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum EntityKey {
  /// A user's company profile row.
  Profile(Uuid),
  /// A lead's chat thread.
  LeadThread(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
  ProfileUpdated,
  MessageAdded { message_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
  pub key:    EntityKey,
  #[serde(flatten)]
  pub change: Change,
  pub at:     DateTime<Utc>,
}

impl ChangeEvent {
  pub fn new(key: EntityKey, change: Change) -> Self {
    Self { key, change, at: Utc::now() }
  }
}

// ─── Feed ────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ChangeFeed {
  channels: Arc<Mutex<HashMap<EntityKey, broadcast::Sender<ChangeEvent>>>>,
}

impl ChangeFeed {
  pub fn new() -> Self { Self::default() }

  fn channels(
    &self,
  ) -> MutexGuard<'_, HashMap<EntityKey, broadcast::Sender<ChangeEvent>>> {
    self.channels.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Start receiving events for `key`.
  pub fn subscribe(&self, key: EntityKey) -> Subscription {
    let rx = self
      .channels()
      .entry(key)
      .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
      .subscribe();
    Subscription { key, rx: Some(rx), feed: self.clone() }
  }

  /// Stop receiving events. Equivalent to dropping the subscription.
  pub fn unsubscribe(&self, subscription: Subscription) { drop(subscription); }

  /// Deliver `event` to every current subscriber of its key. Returns how
  /// many subscribers received it; publishing to a key nobody watches is a
  /// no-op.
  pub fn publish(&self, event: ChangeEvent) -> usize {
    let channels = self.channels();
    match channels.get(&event.key) {
      Some(tx) => tx.send(event).unwrap_or(0),
      None => 0,
    }
  }

  pub fn subscriber_count(&self, key: EntityKey) -> usize {
    self
      .channels()
      .get(&key)
      .map_or(0, broadcast::Sender::receiver_count)
  }

  fn release(&self, key: EntityKey) {
    let mut channels = self.channels();
    if channels.get(&key).is_some_and(|tx| tx.receiver_count() == 0) {
      channels.remove(&key);
    }
  }
}

/// A live subscription to one entity key.
pub struct Subscription {
  key:  EntityKey,
  rx:   Option<broadcast::Receiver<ChangeEvent>>,
  feed: ChangeFeed,
}

impl Subscription {
  pub fn key(&self) -> EntityKey { self.key }

  /// Wait for the next event. Returns `None` once the channel is gone.
  /// Events missed because the subscriber fell behind are skipped.
  pub async fn recv(&mut self) -> Option<ChangeEvent> {
    let rx = self.rx.as_mut()?;
    loop {
      match rx.recv().await {
        Ok(event) => return Some(event),
        Err(RecvError::Lagged(skipped)) => {
          tracing::warn!(key = ?self.key, skipped, "change subscriber lagged");
        }
        Err(RecvError::Closed) => return None,
      }
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    // Release the receiver first so the count no longer includes it.
    drop(self.rx.take());
    self.feed.release(self.key);
  }
}

/// Serve a subscription as a server-sent-event stream.
pub fn sse(
  subscription: Subscription,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
  let events = stream::unfold(subscription, |mut sub| async move {
    let event = sub.recv().await?;
    let frame = match Event::default().event("change").json_data(&event) {
      Ok(frame) => frame,
      Err(e) => {
        tracing::warn!(error = %e, "failed to encode change event");
        Event::default().event("change").data("{}")
      }
    };
    Some((Ok(frame), sub))
  });
  Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn subscriber_receives_only_its_key() {
    let feed = ChangeFeed::new();
    let lead = Uuid::new_v4();
    let mut thread = feed.subscribe(EntityKey::LeadThread(lead));
    let _profile = feed.subscribe(EntityKey::Profile(Uuid::new_v4()));

    let message_id = Uuid::new_v4();
    let delivered = feed.publish(ChangeEvent::new(
      EntityKey::LeadThread(lead),
      Change::MessageAdded { message_id },
    ));
    assert_eq!(delivered, 1);

    let event = thread.recv().await.unwrap();
    assert_eq!(event.key, EntityKey::LeadThread(lead));
    assert_eq!(event.change, Change::MessageAdded { message_id });
  }

  #[test]
  fn publish_without_subscribers_is_noop() {
    let feed = ChangeFeed::new();
    let key = EntityKey::Profile(Uuid::new_v4());
    assert_eq!(feed.publish(ChangeEvent::new(key, Change::ProfileUpdated)), 0);
    assert_eq!(feed.subscriber_count(key), 0);
  }

  #[test]
  fn last_unsubscribe_removes_channel() {
    let feed = ChangeFeed::new();
    let key = EntityKey::Profile(Uuid::new_v4());
    let a = feed.subscribe(key);
    let b = feed.subscribe(key);
    assert_eq!(feed.subscriber_count(key), 2);

    feed.unsubscribe(a);
    assert_eq!(feed.subscriber_count(key), 1);
    drop(b);
    assert_eq!(feed.subscriber_count(key), 0);
    assert!(feed.channels().is_empty());
  }

  #[test]
  fn event_json_shape() {
    let id = Uuid::nil();
    let event = ChangeEvent::new(EntityKey::Profile(id), Change::ProfileUpdated);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["key"]["entity"], "profile");
    assert_eq!(json["change"], "profile_updated");
  }
}
