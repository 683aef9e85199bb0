//! Change-event stream subscriptions for replication.
//!
//! The event publisher owns delivery. A [`Subscription`] is the consumer end
//! of a per-subscriber channel: events arrive in commit order, and closing
//! the handle stops delivery. The backend neither buffers nor filters.

use crate::core::error::{BoxError, PeeringError, PeeringResult};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Event topics replicated to peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ServiceHealth,
    ServiceHealthConnect,
    ServiceList,
    CaRoots,
    MeshConfig,
    PeeringTrustBundle,
}

/// Which keys of a topic a subscriber wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Every key in the topic.
    Wildcard,
    /// A single service.
    Service {
        name: String,
        partition: String,
        namespace: String,
        peer: String,
    },
}

impl Subject {
    /// Subject for a local service in the default partition and namespace.
    pub fn service(name: impl Into<String>) -> Self {
        Self::Service {
            name: name.into(),
            partition: String::new(),
            namespace: String::new(),
            peer: String::new(),
        }
    }

    /// Stream key for this subject, `None` for wildcard.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Wildcard => None,
            Self::Service { name, .. } => Some(name),
        }
    }
}

/// Subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub topic: Topic,
    pub subject: Subject,
    /// ACL token the publisher authorizes events with.
    pub token: String,
    /// Resume after this index; 0 starts with a snapshot.
    pub index: u64,
}

impl SubscribeRequest {
    /// Create a request starting from a fresh snapshot.
    pub fn new(topic: Topic, subject: Subject) -> Self {
        Self {
            topic,
            subject,
            token: String::new(),
            index: 0,
        }
    }

    /// Check whether an event belongs to this subscription.
    pub fn matches(&self, event: &Event) -> bool {
        event.topic == self.topic
            && self
                .subject
                .key()
                .map_or(true, |key| key == event.key)
    }
}

/// A committed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub topic: Topic,
    /// Key the change applies to (service name, trust bundle peer, ...).
    pub key: String,
    /// Commit index that produced the change.
    pub index: u64,
    /// Opaque encoded payload.
    pub payload: Bytes,
}

/// Publisher side of one subscription.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSink {
    /// Deliver an event; returns false once the subscriber is gone.
    pub fn send(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Check if the subscriber closed its end.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of one subscription.
#[derive(Debug)]
pub struct Subscription {
    request: SubscribeRequest,
    events: mpsc::UnboundedReceiver<Event>,
}

impl Subscription {
    /// Create a connected sink and subscription pair for a publisher.
    pub fn channel(request: SubscribeRequest) -> (EventSink, Self) {
        let (tx, events) = mpsc::unbounded_channel();
        (EventSink { tx }, Self { request, events })
    }

    /// The request this subscription was created for.
    pub fn request(&self) -> &SubscribeRequest {
        &self.request
    }

    /// Wait for the next event.
    ///
    /// Fails with `SubscriptionClosed` once unsubscribed or once the
    /// publisher drops its sink and all buffered events were read.
    pub async fn next(&mut self) -> PeeringResult<Event> {
        self.events
            .recv()
            .await
            .ok_or(PeeringError::SubscriptionClosed)
    }

    /// Take an already delivered event without waiting.
    pub fn try_next(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// Stop delivery. Events already buffered can still be drained.
    pub fn unsubscribe(&mut self) {
        self.events.close();
    }
}

/// The change-event publisher.
pub trait EventPublisher: Send + Sync {
    fn subscribe(&self, request: SubscribeRequest) -> Result<Subscription, BoxError>;
}

/// Pass-through from peering replication to the event publisher.
pub struct EventStreamSubscriber {
    publisher: Arc<dyn EventPublisher>,
}

impl EventStreamSubscriber {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    pub fn subscribe(&self, request: SubscribeRequest) -> PeeringResult<Subscription> {
        self.publisher
            .subscribe(request)
            .map_err(|source| PeeringError::Subscribe { source })
    }
}
