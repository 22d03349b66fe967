// src/realtime/bridge.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{sleep_until, Instant};

use crate::models::{Stage, UserProfile};
use crate::realtime::{
    branch_room, role_room, user_room, ChannelEvent, EventChannel, EVENT_CONNECTED,
};

/// Optional event filter: when configured, only matching events trigger the
/// bound refresh callback; everything else is ignored.
#[derive(Debug, Clone, Default)]
pub struct RefreshFilter {
    status_code: Option<String>,
    service_no: Option<String>,
}

impl RefreshFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn by_status_code(code: impl Into<String>) -> Self {
        Self {
            status_code: Some(code.into()),
            service_no: None,
        }
    }

    pub fn by_service_no(service_no: impl Into<String>) -> Self {
        Self {
            status_code: None,
            service_no: Some(service_no.into()),
        }
    }

    pub fn matches(&self, event: &ChannelEvent) -> bool {
        if let Some(code) = &self.status_code {
            if event.status_code.as_deref() != Some(code.as_str()) {
                return false;
            }
        }
        if let Some(service_no) = &self.service_no {
            if event.service_no.as_deref() != Some(service_no.as_str()) {
                return false;
            }
        }
        true
    }
}

/// ✅ **Debounced re-fetch trigger fed by the push channel**
///
/// At most one refresh runs per debounce window; events landing inside the
/// window coalesce into a single trailing refresh. The callback is awaited
/// before the next event is processed, so refreshes never overlap.
pub struct RefreshBridge {
    channel: Arc<dyn EventChannel>,
    filter: RefreshFilter,
    min_interval: Duration,
}

impl RefreshBridge {
    pub fn new(channel: Arc<dyn EventChannel>, filter: RefreshFilter, min_interval: Duration) -> Self {
        Self {
            channel,
            filter,
            min_interval,
        }
    }

    /// Join the per-user room, the per-role room and one room per branch the
    /// user belongs to. Called on connect and again on every reconnect.
    pub async fn announce(&self, profile: &UserProfile, stage: Stage) {
        let mut rooms = vec![user_room(&profile.service_no), role_room(stage)];
        rooms.extend(profile.branches.iter().map(|b| branch_room(b)));
        for room in rooms {
            if let Err(err) = self.channel.join(&room).await {
                tracing::warn!(room, error = %err, "Failed to join room");
            }
        }
    }

    /// Consume the event stream until the channel closes.
    pub async fn run<F, Fut>(self, profile: UserProfile, stage: Stage, mut refresh: F)
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = crate::errors::GatePassResult<()>> + Send,
    {
        let mut rx = self.channel.subscribe();
        self.announce(&profile, stage).await;

        let mut last_refresh: Option<Instant> = None;
        let mut deferred = false;

        loop {
            let received = if deferred {
                let deadline = last_refresh
                    .map(|t| t + self.min_interval)
                    .unwrap_or_else(Instant::now);
                tokio::select! {
                    _ = sleep_until(deadline) => None,
                    event = rx.recv() => Some(event),
                }
            } else {
                Some(rx.recv().await)
            };

            match received {
                // Debounce window expired with events pending: one trailing refresh.
                None => {
                    deferred = false;
                    last_refresh = Some(Instant::now());
                    if let Err(err) = refresh().await {
                        tracing::warn!(error = %err, "Deferred refresh failed");
                    }
                }
                Some(Err(RecvError::Closed)) => break,
                Some(Err(RecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "Event channel lagged, scheduling refresh");
                    deferred = true;
                }
                Some(Ok(event)) => {
                    if event.name == EVENT_CONNECTED {
                        self.announce(&profile, stage).await;
                        continue;
                    }
                    if !self.filter.matches(&event) {
                        continue;
                    }
                    match last_refresh {
                        Some(t) if t.elapsed() < self.min_interval => deferred = true,
                        _ => {
                            last_refresh = Some(Instant::now());
                            if let Err(err) = refresh().await {
                                tracing::warn!(event = %event.name, error = %err, "Refresh failed");
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::{InProcessChannel, EVENT_BULK_UPDATE, EVENT_REQUEST_APPROVED};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn profile_with_branches() -> UserProfile {
        UserProfile {
            service_no: "35021".to_string(),
            name: "K. Perera".to_string(),
            section: "Transport".to_string(),
            group: "Operations".to_string(),
            designation: "Technician".to_string(),
            contact: "0771234567".to_string(),
            email: None,
            branches: vec!["HQ".to_string(), "Kandy".to_string()],
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn filter_matches_configured_criteria() {
        let by_code = RefreshFilter::by_status_code("pending");
        assert!(by_code.matches(
            &ChannelEvent::named(EVENT_REQUEST_APPROVED).with_status_code("pending")
        ));
        assert!(!by_code.matches(
            &ChannelEvent::named(EVENT_REQUEST_APPROVED).with_status_code("approved")
        ));
        assert!(!by_code.matches(&ChannelEvent::named(EVENT_REQUEST_APPROVED)));

        let by_service = RefreshFilter::by_service_no("35021");
        assert!(by_service
            .matches(&ChannelEvent::named(EVENT_BULK_UPDATE).with_service_no("35021")));
        assert!(!by_service
            .matches(&ChannelEvent::named(EVENT_BULK_UPDATE).with_service_no("99999")));

        assert!(RefreshFilter::any().matches(&ChannelEvent::named(EVENT_BULK_UPDATE)));
    }

    #[tokio::test(start_paused = true)]
    async fn announce_joins_user_role_and_branch_rooms() {
        let channel = Arc::new(InProcessChannel::new(16));
        let bridge = RefreshBridge::new(channel.clone(), RefreshFilter::any(), Duration::from_millis(500));

        tokio::spawn(bridge.run(profile_with_branches(), Stage::Verify, || async { Ok(()) }));
        settle().await;

        let rooms = channel.rooms();
        assert_eq!(
            rooms,
            vec![
                "branch:HQ".to_string(),
                "branch:Kandy".to_string(),
                "role:verify".to_string(),
                "user:35021".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_re_announces_all_rooms() {
        let channel = Arc::new(InProcessChannel::new(16));
        let bridge = RefreshBridge::new(channel.clone(), RefreshFilter::any(), Duration::from_millis(500));

        tokio::spawn(bridge.run(profile_with_branches(), Stage::Verify, || async { Ok(()) }));
        settle().await;
        assert_eq!(channel.join_count(), 4);

        channel.emit(ChannelEvent::named(EVENT_CONNECTED));
        settle().await;
        assert_eq!(channel.join_count(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn events_inside_the_window_coalesce_into_one_trailing_refresh() {
        let channel = Arc::new(InProcessChannel::new(16));
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = refreshes.clone();
        let bridge = RefreshBridge::new(channel.clone(), RefreshFilter::any(), Duration::from_millis(500));

        tokio::spawn(bridge.run(profile_with_branches(), Stage::Dispatch, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }));
        settle().await;

        // Leading edge fires immediately.
        channel.emit(ChannelEvent::named(EVENT_BULK_UPDATE));
        settle().await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);

        // A burst inside the window is coalesced…
        channel.emit(ChannelEvent::named(EVENT_REQUEST_APPROVED));
        channel.emit(ChannelEvent::named(EVENT_REQUEST_APPROVED));
        channel.emit(ChannelEvent::named(EVENT_BULK_UPDATE));
        settle().await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);

        // …into exactly one trailing refresh once the window expires.
        tokio::time::advance(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn non_matching_events_are_ignored_entirely() {
        let channel = Arc::new(InProcessChannel::new(16));
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = refreshes.clone();
        let bridge = RefreshBridge::new(
            channel.clone(),
            RefreshFilter::by_service_no("35021"),
            Duration::from_millis(500),
        );

        tokio::spawn(bridge.run(profile_with_branches(), Stage::Executive, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }));
        settle().await;

        channel.emit(ChannelEvent::named(EVENT_BULK_UPDATE).with_service_no("99999"));
        channel.emit(ChannelEvent::named(EVENT_BULK_UPDATE));
        settle().await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 0);

        channel.emit(ChannelEvent::named(EVENT_BULK_UPDATE).with_service_no("35021"));
        settle().await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }
}
