pub mod bridge;
pub mod poll;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Mutex;
use tokio::sync::broadcast;

use crate::errors::GatePassResult;
use crate::models::Stage;

pub use bridge::{RefreshBridge, RefreshFilter};
pub use poll::PollAdapter;

pub const EVENT_CONNECTED: &str = "connect";
pub const EVENT_NEW_REQUEST: &str = "new-request";
pub const EVENT_REQUEST_UPDATED: &str = "request-updated";
pub const EVENT_REQUEST_APPROVED: &str = "request-approved";
pub const EVENT_REQUEST_REJECTED: &str = "request-rejected";
pub const EVENT_REQUEST_COMPLETED: &str = "request-completed";
pub const EVENT_BULK_UPDATE: &str = "bulk-update";
pub const EVENT_NOTIFICATION: &str = "notification";

/// Event delivered over the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub name: String,
    pub reference_no: Option<String>,
    pub status_code: Option<String>,
    pub service_no: Option<String>,
    pub payload: Option<serde_json::Value>,
}

impl ChannelEvent {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reference_no: None,
            status_code: None,
            service_no: None,
            payload: None,
        }
    }

    pub fn with_status_code(mut self, code: impl Into<String>) -> Self {
        self.status_code = Some(code.into());
        self
    }

    pub fn with_service_no(mut self, service_no: impl Into<String>) -> Self {
        self.service_no = Some(service_no.into());
        self
    }
}

pub fn user_room(service_no: &str) -> String {
    format!("user:{service_no}")
}

pub fn role_room(stage: Stage) -> String {
    format!("role:{}", stage.as_str())
}

pub fn branch_room(branch: &str) -> String {
    format!("branch:{branch}")
}

/// ✅ **Subscription contract of the push-notification channel**
///
/// The wire protocol itself is an external collaborator; this crate only
/// joins rooms and consumes the event stream.
#[async_trait]
pub trait EventChannel: Send + Sync {
    async fn join(&self, room: &str) -> GatePassResult<()>;
    async fn leave(&self, room: &str) -> GatePassResult<()>;
    fn subscribe(&self) -> broadcast::Receiver<ChannelEvent>;
}

/// In-process channel backing the polling adapter and the test suite. A real
/// transport adapter feeds the same broadcast sender.
pub struct InProcessChannel {
    tx: broadcast::Sender<ChannelEvent>,
    rooms: Mutex<BTreeSet<String>>,
    join_calls: Mutex<usize>,
}

impl InProcessChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            rooms: Mutex::new(BTreeSet::new()),
            join_calls: Mutex::new(0),
        }
    }

    pub fn emit(&self, event: ChannelEvent) {
        // Nobody listening is fine; the bridge may not be running yet.
        let _ = self.tx.send(event);
    }

    pub fn rooms(&self) -> Vec<String> {
        self.rooms.lock().unwrap().iter().cloned().collect()
    }

    pub fn join_count(&self) -> usize {
        *self.join_calls.lock().unwrap()
    }
}

#[async_trait]
impl EventChannel for InProcessChannel {
    async fn join(&self, room: &str) -> GatePassResult<()> {
        self.rooms.lock().unwrap().insert(room.to_string());
        *self.join_calls.lock().unwrap() += 1;
        Ok(())
    }

    async fn leave(&self, room: &str) -> GatePassResult<()> {
        self.rooms.lock().unwrap().remove(room);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.tx.subscribe()
    }
}
