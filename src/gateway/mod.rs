pub mod envelope;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::GatePassResult;
use crate::models::{
    Category, LoadingDetails, Location, MovementRequest, NewMovementRequest, Stage, StatusListing,
    StatusRecord, UserProfile,
};
use crate::notify::MailMessage;

pub use http::HttpGateway;

/// The three listing buckets every approval desk tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Pending,
    Approved,
    Rejected,
}

impl BucketKind {
    pub const ALL: [BucketKind; 3] = [BucketKind::Pending, BucketKind::Approved, BucketKind::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            BucketKind::Pending => "pending",
            BucketKind::Approved => "approved",
            BucketKind::Rejected => "rejected",
        }
    }
}

/// One page of a paginated listing, with the backend's overall count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: u64,
}

/// Payload attached to an approval action. The comment is optional on
/// approve; loading details are only meaningful at the Verify stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApprovalAction {
    pub comment: Option<String>,
    pub loading_details: Option<LoadingDetails>,
}

/// Receipt of a bulk mark-returned call.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnReceipt {
    #[serde(rename = "updatedCount")]
    pub updated_count: u32,
}

/// ✅ **Request/response contract of the external gate-pass backend**
///
/// The backend is the sole arbiter of consistency; the client never retries.
/// Every failure is terminal for that user action.
#[async_trait]
pub trait GatePassGateway: Send + Sync {
    /// Status listing for one stage and bucket, with `limit`/`skip` paging.
    async fn list_statuses(
        &self,
        stage: Stage,
        bucket: BucketKind,
        limit: usize,
        skip: usize,
    ) -> GatePassResult<Page<StatusListing>>;

    async fn fetch_request(&self, reference_no: &str) -> GatePassResult<MovementRequest>;

    /// Approval record plus request for one reference number.
    async fn fetch_status(&self, reference_no: &str) -> GatePassResult<StatusListing>;

    async fn approve(
        &self,
        reference_no: &str,
        stage: Stage,
        action: ApprovalAction,
    ) -> GatePassResult<StatusRecord>;

    async fn reject(
        &self,
        reference_no: &str,
        stage: Stage,
        comment: &str,
    ) -> GatePassResult<StatusRecord>;

    /// Bulk return-marking for the given serial numbers.
    async fn mark_returned(
        &self,
        reference_no: &str,
        serial_numbers: &[String],
    ) -> GatePassResult<ReturnReceipt>;

    /// Employee / receiver directory search by service number.
    async fn find_employee(&self, service_no: &str) -> GatePassResult<UserProfile>;

    async fn erp_employee(&self, service_no: &str) -> GatePassResult<UserProfile>;

    async fn erp_locations(&self) -> GatePassResult<Vec<Location>>;

    async fn categories(&self) -> GatePassResult<Vec<Category>>;

    /// Multipart request creation (items + photos).
    async fn create_request(
        &self,
        request: &NewMovementRequest,
    ) -> GatePassResult<MovementRequest>;

    /// Executive officer reassignment, the one post-creation mutation a
    /// request allows besides item return-marking.
    async fn reassign_officer(&self, reference_no: &str, service_no: &str) -> GatePassResult<()>;

    /// Backend mail endpoint; callers treat failures as best-effort.
    async fn send_mail(&self, mail: &MailMessage) -> GatePassResult<()>;
}
