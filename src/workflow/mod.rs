pub mod bucket;
pub mod desk;
pub mod progression;
pub mod returns;
pub mod submit;

pub use bucket::{EnrichedEntry, StatusBucket};
pub use desk::ApprovalDesk;
pub use returns::{ReturnDesk, ReturnRole};
pub use submit::{DestinationSection, ReceiverSection, SubmissionForm};

/// Outcome of a successful workflow action. Warnings carry side-channel
/// failures (notification mail) that never roll the action back.
#[derive(Debug, Clone)]
pub struct ActionReport {
    pub reference_no: String,
    pub message: String,
    pub warnings: Vec<String>,
}
