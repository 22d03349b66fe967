// src/workflow/bucket.rs
use futures::future::join_all;

use crate::cache::ProfileCache;
use crate::errors::GatePassResult;
use crate::gateway::{BucketKind, GatePassGateway};
use crate::models::{ReceiverParty, Stage, StatusListing, UserProfile};

/// Listing record enriched with the profiles the screens render alongside it.
/// Non-member receivers have no directory profile.
#[derive(Debug, Clone)]
pub struct EnrichedEntry {
    pub listing: StatusListing,
    pub sender: UserProfile,
    pub receiver: Option<UserProfile>,
}

/// ✅ **One bucket of a desk's listing (pending, approved or rejected)**
///
/// `skip` is re-derived from the entry count after every page, so short pages
/// advance the cursor by what actually arrived rather than the page size.
#[derive(Debug)]
pub struct StatusBucket {
    pub kind: BucketKind,
    pub entries: Vec<EnrichedEntry>,
    pub skip: usize,
    pub total: u64,
    pub has_more: bool,
    page_size: usize,
}

impl StatusBucket {
    pub fn new(kind: BucketKind, page_size: usize) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            skip: 0,
            total: 0,
            has_more: false,
            page_size,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, reference_no: &str) -> Option<&EnrichedEntry> {
        self.entries
            .iter()
            .find(|e| e.listing.status.reference_no == reference_no)
    }

    /// Drop loaded pages and fetch the first page again.
    pub async fn reload(
        &mut self,
        stage: Stage,
        gateway: &dyn GatePassGateway,
        profiles: &ProfileCache,
    ) -> GatePassResult<usize> {
        self.entries.clear();
        self.skip = 0;
        self.total = 0;
        self.has_more = false;
        self.load_more(stage, gateway, profiles).await
    }

    /// Fetch the next page at the current cursor and append it.
    pub async fn load_more(
        &mut self,
        stage: Stage,
        gateway: &dyn GatePassGateway,
        profiles: &ProfileCache,
    ) -> GatePassResult<usize> {
        let page = gateway
            .list_statuses(stage, self.kind, self.page_size, self.skip)
            .await?;
        let fetched = page.records.len();

        self.entries
            .extend(enrich_page(page.records, profiles).await);
        self.skip = self.entries.len();
        self.total = page.total;
        self.has_more = (self.skip as u64) < self.total;
        Ok(fetched)
    }

    /// Remove an entry after the backend confirmed an action on it.
    pub fn take(&mut self, reference_no: &str) -> Option<EnrichedEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.listing.status.reference_no == reference_no)?;
        let entry = self.entries.remove(idx);
        self.skip = self.entries.len();
        self.total = self.total.saturating_sub(1);
        self.has_more = (self.skip as u64) < self.total;
        Some(entry)
    }

    /// Accept an entry moved over from another bucket.
    pub fn accept(&mut self, entry: EnrichedEntry) {
        self.entries.insert(0, entry);
        self.skip = self.entries.len();
        self.total += 1;
        self.has_more = (self.skip as u64) < self.total;
    }
}

/// Enrich a page of listings; all profile lookups for the page run
/// concurrently and are awaited jointly. Lookup failures have already been
/// degraded to placeholders by the cache, so enrichment never fails a page.
async fn enrich_page(records: Vec<StatusListing>, profiles: &ProfileCache) -> Vec<EnrichedEntry> {
    join_all(records.into_iter().map(|listing| async move {
        let sender_fut = profiles.profile(&listing.request.sender_service_no);
        let receiver_fut = async {
            match &listing.request.receiver {
                ReceiverParty::Member { service_no } => Some(profiles.profile(service_no).await),
                ReceiverParty::NonMember { .. } => None,
            }
        };
        let (sender, receiver) = tokio::join!(sender_fut, receiver_fut);
        EnrichedEntry {
            listing,
            sender,
            receiver,
        }
    }))
    .await
}
