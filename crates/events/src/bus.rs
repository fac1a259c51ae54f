//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DispatchEvent`]s. It is
//! shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use bantay_core::types::DbId;

// ---------------------------------------------------------------------------
// DispatchEvent
// ---------------------------------------------------------------------------

/// Event type emitted when a dispatch is created.
pub const DISPATCH_CREATED: &str = "dispatch.created";
/// Event type emitted when an officer accepts a dispatch.
pub const DISPATCH_ACCEPTED: &str = "dispatch.accepted";
/// Event type emitted when an officer declines a dispatch.
pub const DISPATCH_DECLINED: &str = "dispatch.declined";
/// Event type emitted when the responding officer departs.
pub const DISPATCH_EN_ROUTE: &str = "dispatch.en_route";
/// Event type emitted when the responding officer arrives on scene.
pub const DISPATCH_ARRIVED: &str = "dispatch.arrived";
/// Event type emitted when the dispatch is completed with a field verdict.
pub const DISPATCH_COMPLETED: &str = "dispatch.completed";
/// Event type emitted when a dispatch is cancelled.
pub const DISPATCH_CANCELLED: &str = "dispatch.cancelled";

/// A dispatch lifecycle event.
///
/// Constructed via [`DispatchEvent::new`] and enriched with the builder
/// methods [`with_actor`](DispatchEvent::with_actor) and
/// [`with_payload`](DispatchEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchEvent {
    /// Dot-separated event name, e.g. `"dispatch.accepted"`.
    pub event_type: String,

    /// The dispatch the event belongs to.
    pub dispatch_id: DbId,

    /// The report the dispatch was raised for.
    pub report_id: DbId,

    /// Optional id of the user that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DispatchEvent {
    /// Create a new event for a dispatch/report pair.
    pub fn new(event_type: impl Into<String>, dispatch_id: DbId, report_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            dispatch_id,
            report_id,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DispatchEvent`].
///
/// # Usage
///
/// ```rust
/// use bantay_events::bus::{DispatchEvent, EventBus, DISPATCH_CREATED};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DispatchEvent::new(DISPATCH_CREATED, 1, 1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DispatchEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DispatchEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = DispatchEvent::new(DISPATCH_ACCEPTED, 42, 9)
            .with_actor(7)
            .with_payload(serde_json::json!({"acceptance_time": 31}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, DISPATCH_ACCEPTED);
        assert_eq!(received.dispatch_id, 42);
        assert_eq!(received.report_id, 9);
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["acceptance_time"], 31);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DispatchEvent::new(DISPATCH_CREATED, 1, 1));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, DISPATCH_CREATED);
        assert_eq!(e2.event_type, DISPATCH_CREATED);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DispatchEvent::new(DISPATCH_CANCELLED, 1, 1));
    }

    #[test]
    fn default_event_has_empty_optional_fields() {
        let event = DispatchEvent::new(DISPATCH_EN_ROUTE, 3, 5);
        assert_eq!(event.event_type, DISPATCH_EN_ROUTE);
        assert_eq!(event.dispatch_id, 3);
        assert_eq!(event.report_id, 5);
        assert!(event.actor_user_id.is_none());
        assert!(event.payload.is_object());
    }
}
