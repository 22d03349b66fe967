// src/workflow/returns.rs
use chrono::Utc;
use std::sync::Arc;

use crate::cache::ProfileCache;
use crate::errors::{GatePassError, GatePassResult};
use crate::gateway::GatePassGateway;
use crate::models::{Item, ItemStatus, StatusListing};
use crate::notify::Mailer;
use crate::workflow::ActionReport;

/// Roles that hold a return obligation for items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnRole {
    PetrolLeader,
    ExecutiveOfficer,
}

impl ReturnRole {
    /// Status tag marking an item as awaiting return to this role.
    pub fn pending_status(self) -> ItemStatus {
        match self {
            ReturnRole::PetrolLeader => ItemStatus::ReturnToPetrolLeader,
            ReturnRole::ExecutiveOfficer => ItemStatus::ReturnToExecutiveOfficer,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReturnRole::PetrolLeader => "Petrol Leader",
            ReturnRole::ExecutiveOfficer => "Executive Officer",
        }
    }
}

/// ✅ **Role-specific item return screen model**
///
/// Filters a request's items down to the ones tagged for its own role and
/// performs the bulk mark-returned action. The backend call is
/// all-or-nothing: on failure no local item status changes.
pub struct ReturnDesk {
    role: ReturnRole,
    gateway: Arc<dyn GatePassGateway>,
    profiles: Arc<ProfileCache>,
    mailer: Mailer,
}

impl ReturnDesk {
    pub fn new(
        role: ReturnRole,
        gateway: Arc<dyn GatePassGateway>,
        profiles: Arc<ProfileCache>,
    ) -> Self {
        Self {
            role,
            mailer: Mailer::new(gateway.clone()),
            gateway,
            profiles,
        }
    }

    pub fn role(&self) -> ReturnRole {
        self.role
    }

    /// Items on this request currently awaiting return to this desk's role.
    pub fn eligible_items<'a>(&self, listing: &'a StatusListing) -> Vec<&'a Item> {
        listing
            .request
            .items
            .iter()
            .filter(|item| item.status == self.role.pending_status())
            .collect()
    }

    /// Mark the selected serial numbers as returned. `confirmed` is the
    /// caller's explicit confirmation; without it no network call is made.
    pub async fn mark_returned(
        &self,
        listing: &mut StatusListing,
        serial_numbers: &[String],
        confirmed: bool,
    ) -> GatePassResult<ActionReport> {
        if serial_numbers.is_empty() {
            return Err(GatePassError::validation(
                "Select at least one item to return",
            ));
        }
        if !confirmed {
            return Err(GatePassError::validation(
                "Confirmation is required before marking items returned",
            ));
        }
        for serial in serial_numbers {
            let item = listing.request.item(serial).ok_or_else(|| {
                GatePassError::validation(format!("Unknown serial number {serial}"))
            })?;
            if item.status != self.role.pending_status() {
                return Err(GatePassError::validation(format!(
                    "Item {serial} is not awaiting return to the {}",
                    self.role.label()
                )));
            }
        }

        let reference_no = listing.request.reference_no.clone();
        let receipt = self
            .gateway
            .mark_returned(&reference_no, serial_numbers)
            .await?;

        let today = Utc::now().date_naive();
        for item in listing
            .request
            .items
            .iter_mut()
            .filter(|item| serial_numbers.contains(&item.serial_no))
        {
            item.status = ItemStatus::Returned;
            item.return_date = Some(today);
        }

        let returned: Vec<&Item> = listing
            .request
            .items
            .iter()
            .filter(|item| serial_numbers.contains(&item.serial_no))
            .collect();

        let mut warnings = Vec::new();

        // Two best-effort notices: the original requester, and the next role
        // in the chain with the returned-item list embedded.
        let requester = self
            .profiles
            .profile(&listing.request.sender_service_no)
            .await;
        if let Some(warning) = self
            .mailer
            .send_return_notice(&requester, &reference_no, &returned)
            .await
        {
            warnings.push(warning);
        }

        match listing.status.verify.actor_service_no.as_deref() {
            Some(officer_no) => {
                let officer = self.profiles.profile(officer_no).await;
                if let Some(warning) = self
                    .mailer
                    .send_return_notice(&officer, &reference_no, &returned)
                    .await
                {
                    warnings.push(warning);
                }
            }
            None => {
                tracing::debug!(reference_no, "No verify officer recorded, skipping notice");
            }
        }

        tracing::info!(
            reference_no,
            count = receipt.updated_count,
            role = self.role.label(),
            "Items marked as returned"
        );
        Ok(ActionReport {
            reference_no,
            message: format!("{} item(s) marked as returned", receipt.updated_count),
            warnings,
        })
    }
}
