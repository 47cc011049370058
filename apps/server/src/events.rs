use serde_json::Value;
use tokio::sync::broadcast;
use yieldfolio_core::events::{Notification, NotificationLevel, NotificationSink};

/// Emitted after a wallet account or chain switch was applied.
pub const ACCOUNT_CHANGED: &str = "account:changed";

/// Event name plus optional JSON payload, as streamed to clients.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            payload: None,
        }
    }

    pub fn with_payload(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload: Some(payload),
        }
    }
}

/// Broadcast bus fanning events out to every connected stream.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // Nobody listening is fine
        let _ = self.sender.send(event);
    }
}

/// Turns core notifications into bus events and log lines.
#[derive(Clone)]
pub struct EventBusNotificationSink {
    bus: EventBus,
}

impl EventBusNotificationSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl NotificationSink for EventBusNotificationSink {
    fn notify(&self, notification: Notification) {
        match notification.level() {
            NotificationLevel::Warning | NotificationLevel::Error => {
                tracing::warn!(event = notification.name(), "{:?}", notification)
            }
            _ => tracing::info!(event = notification.name(), "{:?}", notification),
        }

        let name = notification.name();
        match serde_json::to_value(&notification) {
            Ok(payload) => self.bus.publish(ServerEvent::with_payload(name, payload)),
            Err(e) => {
                tracing::error!("Failed to serialize notification {}: {}", name, e);
                self.bus.publish(ServerEvent::new(name));
            }
        }
    }
}
