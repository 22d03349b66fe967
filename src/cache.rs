// src/cache.rs
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::gateway::GatePassGateway;
use crate::models::UserProfile;

/// ✅ **Service-number → profile cache with single-flight lookups**
///
/// Concurrent requests for the same key share one in-flight directory call.
/// Entries are bounded by TTL and capacity so a long-lived session cannot
/// grow the cache without limit. Failed lookups degrade to a placeholder
/// profile and are NOT cached, so a later page may still resolve them.
pub struct ProfileCache {
    inner: Cache<String, UserProfile>,
    gateway: Arc<dyn GatePassGateway>,
}

const PROFILE_TTL: Duration = Duration::from_secs(30 * 60);
const PROFILE_CAPACITY: u64 = 10_000;

impl ProfileCache {
    pub fn new(gateway: Arc<dyn GatePassGateway>) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(PROFILE_TTL)
                .max_capacity(PROFILE_CAPACITY)
                .build(),
            gateway,
        }
    }

    /// Resolve a profile, never failing the caller.
    pub async fn profile(&self, service_no: &str) -> UserProfile {
        let gateway = self.gateway.clone();
        let key = service_no.to_string();
        let lookup = self
            .inner
            .try_get_with(key.clone(), async move { gateway.find_employee(&key).await })
            .await;

        match lookup {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(service_no, error = %err, "Profile lookup failed, rendering placeholder");
                UserProfile::placeholder(service_no)
            }
        }
    }

    pub async fn invalidate(&self, service_no: &str) {
        self.inner.invalidate(service_no).await;
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{GatePassError, GatePassResult};
    use crate::gateway::{ApprovalAction, BucketKind, Page, ReturnReceipt};
    use crate::models::{
        Category, Location, MovementRequest, NewMovementRequest, Stage, StatusListing,
        StatusRecord,
    };
    use crate::notify::MailMessage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory stub that counts lookups and optionally fails.
    struct CountingDirectory {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingDirectory {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl GatePassGateway for CountingDirectory {
        async fn list_statuses(
            &self,
            _: Stage,
            _: BucketKind,
            _: usize,
            _: usize,
        ) -> GatePassResult<Page<StatusListing>> {
            unimplemented!("not used by cache tests")
        }

        async fn fetch_request(&self, _: &str) -> GatePassResult<MovementRequest> {
            unimplemented!("not used by cache tests")
        }

        async fn fetch_status(&self, _: &str) -> GatePassResult<StatusListing> {
            unimplemented!("not used by cache tests")
        }

        async fn approve(
            &self,
            _: &str,
            _: Stage,
            _: ApprovalAction,
        ) -> GatePassResult<StatusRecord> {
            unimplemented!("not used by cache tests")
        }

        async fn reject(&self, _: &str, _: Stage, _: &str) -> GatePassResult<StatusRecord> {
            unimplemented!("not used by cache tests")
        }

        async fn mark_returned(&self, _: &str, _: &[String]) -> GatePassResult<ReturnReceipt> {
            unimplemented!("not used by cache tests")
        }

        async fn find_employee(&self, service_no: &str) -> GatePassResult<UserProfile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Let concurrent callers pile up on the in-flight lookup.
            tokio::task::yield_now().await;
            if self.fail {
                return Err(GatePassError::backend(500, "directory down"));
            }
            Ok(UserProfile {
                service_no: service_no.to_string(),
                name: "K. Perera".to_string(),
                section: "Transport".to_string(),
                group: "Operations".to_string(),
                designation: "Technician".to_string(),
                contact: "0771234567".to_string(),
                email: Some("kperera@example.org".to_string()),
                branches: vec!["HQ".to_string()],
            })
        }

        async fn erp_employee(&self, _: &str) -> GatePassResult<UserProfile> {
            unimplemented!("not used by cache tests")
        }

        async fn erp_locations(&self) -> GatePassResult<Vec<Location>> {
            unimplemented!("not used by cache tests")
        }

        async fn categories(&self) -> GatePassResult<Vec<Category>> {
            unimplemented!("not used by cache tests")
        }

        async fn create_request(&self, _: &NewMovementRequest) -> GatePassResult<MovementRequest> {
            unimplemented!("not used by cache tests")
        }

        async fn reassign_officer(&self, _: &str, _: &str) -> GatePassResult<()> {
            unimplemented!("not used by cache tests")
        }

        async fn send_mail(&self, _: &MailMessage) -> GatePassResult<()> {
            unimplemented!("not used by cache tests")
        }
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_directory_call() {
        let directory = Arc::new(CountingDirectory::new(false));
        let cache = Arc::new(ProfileCache::new(directory.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.profile("35021").await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().name, "K. Perera");
        }

        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_lookup_degrades_to_placeholder_and_is_not_cached() {
        let directory = Arc::new(CountingDirectory::new(true));
        let cache = ProfileCache::new(directory.clone());

        let profile = cache.profile("35021").await;
        assert!(profile.is_placeholder());
        assert_eq!(profile.service_no, "35021");

        // A second lookup hits the directory again instead of a cached miss.
        let _ = cache.profile("35021").await;
        assert_eq!(directory.calls.load(Ordering::SeqCst), 2);
    }
}
