// src/workflow/desk.rs
use std::sync::Arc;

use crate::cache::ProfileCache;
use crate::errors::{GatePassError, GatePassResult};
use crate::gateway::{ApprovalAction, BucketKind, GatePassGateway};
use crate::models::{LoadingDetails, Stage, UserProfile};
use crate::notify::Mailer;
use crate::workflow::bucket::StatusBucket;
use crate::workflow::{progression, ActionReport};

/// ✅ **Per-role approval screen model**
///
/// Owns the three listing buckets for one stage and performs the
/// approve/reject actions against the backend. Primary-action failures leave
/// all local state untouched; notification mail is best-effort.
pub struct ApprovalDesk {
    stage: Stage,
    actor: UserProfile,
    pub pending: StatusBucket,
    pub approved: StatusBucket,
    pub rejected: StatusBucket,
    gateway: Arc<dyn GatePassGateway>,
    profiles: Arc<ProfileCache>,
    mailer: Mailer,
}

impl ApprovalDesk {
    pub fn new(
        stage: Stage,
        actor: UserProfile,
        gateway: Arc<dyn GatePassGateway>,
        profiles: Arc<ProfileCache>,
        page_size: usize,
    ) -> Self {
        Self {
            stage,
            actor,
            pending: StatusBucket::new(BucketKind::Pending, page_size),
            approved: StatusBucket::new(BucketKind::Approved, page_size),
            rejected: StatusBucket::new(BucketKind::Rejected, page_size),
            mailer: Mailer::new(gateway.clone()),
            gateway,
            profiles,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn bucket(&self, kind: BucketKind) -> &StatusBucket {
        match kind {
            BucketKind::Pending => &self.pending,
            BucketKind::Approved => &self.approved,
            BucketKind::Rejected => &self.rejected,
        }
    }

    /// Reload the first page of all three buckets.
    pub async fn refresh(&mut self) -> GatePassResult<()> {
        self.pending
            .reload(self.stage, self.gateway.as_ref(), &self.profiles)
            .await?;
        self.approved
            .reload(self.stage, self.gateway.as_ref(), &self.profiles)
            .await?;
        self.rejected
            .reload(self.stage, self.gateway.as_ref(), &self.profiles)
            .await?;
        Ok(())
    }

    pub async fn load_more(&mut self, kind: BucketKind) -> GatePassResult<usize> {
        let bucket = match kind {
            BucketKind::Pending => &mut self.pending,
            BucketKind::Approved => &mut self.approved,
            BucketKind::Rejected => &mut self.rejected,
        };
        bucket
            .load_more(self.stage, self.gateway.as_ref(), &self.profiles)
            .await
    }

    /// Approve a pending request. Loading details are only accepted at the
    /// Verify stage.
    pub async fn approve(
        &mut self,
        reference_no: &str,
        comment: Option<String>,
        loading_details: Option<LoadingDetails>,
    ) -> GatePassResult<ActionReport> {
        if loading_details.is_some() && self.stage != Stage::Verify {
            return Err(GatePassError::validation(
                "Loading details are only accepted at the Verify stage",
            ));
        }
        let entry = self.pending.find(reference_no).ok_or_else(|| {
            GatePassError::validation(format!("{reference_no} is not in the pending queue"))
        })?;
        progression::can_act(&entry.listing.status, self.stage)?;

        let updated = self
            .gateway
            .approve(
                reference_no,
                self.stage,
                ApprovalAction {
                    comment: comment.clone(),
                    loading_details,
                },
            )
            .await?;

        let mut entry = self.pending.take(reference_no).ok_or_else(|| {
            GatePassError::validation(format!("{reference_no} is not in the pending queue"))
        })?;
        entry.listing.status = updated;

        // Counter-party for the notice: the receiver once dispatch clears the
        // pass, the requester everywhere else. Non-member receivers have no
        // directory profile and simply get no mail.
        let recipient = match self.stage {
            Stage::Dispatch => entry.receiver.clone(),
            _ => Some(entry.sender.clone()),
        };
        self.approved.accept(entry);

        let mut warnings = Vec::new();
        if let Some(recipient) = recipient {
            if let Some(warning) = self
                .mailer
                .send_approval_notice(&recipient, reference_no, self.stage, comment.as_deref())
                .await
            {
                warnings.push(warning);
            }
        } else {
            tracing::debug!(reference_no, "Receiver has no directory profile, skipping notice");
        }

        tracing::info!(reference_no, stage = self.stage.as_str(), actor = %self.actor.service_no, "Request approved");
        Ok(ActionReport {
            reference_no: reference_no.to_string(),
            message: format!("Request {reference_no} approved"),
            warnings,
        })
    }

    /// Reject a pending request. The comment is validated before any network
    /// call is issued.
    pub async fn reject(&mut self, reference_no: &str, comment: &str) -> GatePassResult<ActionReport> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(GatePassError::validation(
                "A comment is required to reject a request",
            ));
        }
        let entry = self.pending.find(reference_no).ok_or_else(|| {
            GatePassError::validation(format!("{reference_no} is not in the pending queue"))
        })?;
        progression::can_act(&entry.listing.status, self.stage)?;

        let updated = self.gateway.reject(reference_no, self.stage, comment).await?;

        let mut entry = self.pending.take(reference_no).ok_or_else(|| {
            GatePassError::validation(format!("{reference_no} is not in the pending queue"))
        })?;
        entry.listing.status = updated;
        let requester = entry.sender.clone();
        self.rejected.accept(entry);

        let mut warnings = Vec::new();
        if let Some(warning) = self
            .mailer
            .send_rejection_notice(&requester, reference_no, self.stage, comment)
            .await
        {
            warnings.push(warning);
        }

        tracing::info!(reference_no, stage = self.stage.as_str(), actor = %self.actor.service_no, "Request rejected");
        Ok(ActionReport {
            reference_no: reference_no.to_string(),
            message: format!("Request {reference_no} rejected"),
            warnings,
        })
    }
}
