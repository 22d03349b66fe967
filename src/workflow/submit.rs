// src/workflow/submit.rs
use serde::Deserialize;
use std::collections::HashSet;

use crate::errors::{GatePassError, GatePassResult};
use crate::gateway::GatePassGateway;
use crate::models::item::MAX_PHOTOS_PER_ITEM;
use crate::models::{
    Destination, MovementRequest, NewItem, NewMovementRequest, ReceiverParty, Transport,
};
use crate::utils::ident::is_non_member_id;

/// Receiver section of the submission form, resolved mutually exclusively:
/// either an internal service-number lookup or an external name/NIC/contact
/// triple, decided by the identifier classifier plus the explicit
/// non-member-place flag.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiverSection {
    pub identifier: String,
    pub nic: Option<String>,
    pub contact: Option<String>,
    #[serde(default)]
    pub non_member_place: bool,
}

impl ReceiverSection {
    pub fn resolve(&self) -> GatePassResult<ReceiverParty> {
        let identifier = self.identifier.trim();
        if identifier.is_empty() {
            return Err(GatePassError::validation("A receiver is required"));
        }
        if self.non_member_place || is_non_member_id(identifier) {
            let nic = required(&self.nic, "NIC is required for a non-member receiver")?;
            let contact = required(
                &self.contact,
                "A contact number is required for a non-member receiver",
            )?;
            Ok(ReceiverParty::NonMember {
                name: identifier.to_string(),
                nic,
                contact,
            })
        } else {
            Ok(ReceiverParty::Member {
                service_no: identifier.to_string(),
            })
        }
    }
}

/// Destination section: an organizational branch, or an external company for
/// non-member places.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationSection {
    pub branch: Option<String>,
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    #[serde(default)]
    pub non_member_place: bool,
}

impl DestinationSection {
    pub fn resolve(&self) -> GatePassResult<Destination> {
        if self.non_member_place {
            let company_name = required(&self.company_name, "A company name is required")?;
            let address = required(&self.company_address, "A company address is required")?;
            Ok(Destination::External {
                company_name,
                address,
            })
        } else {
            let location = required(&self.branch, "A destination branch is required")?;
            Ok(Destination::Branch { location })
        }
    }
}

fn required(value: &Option<String>, message: &str) -> GatePassResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(GatePassError::validation(message)),
    }
}

/// ✅ **Multi-section submission form**
///
/// Assembles a new movement request and submits it as a single payload. All
/// validation happens before any network call.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionForm {
    pub sender_service_no: String,
    pub receiver: ReceiverSection,
    pub source_location: String,
    pub destination: DestinationSection,
    pub transport: Transport,
    pub items: Vec<NewItem>,
    pub executive_officer: String,
}

impl SubmissionForm {
    /// Validate every section and assemble the submission payload.
    pub fn build(&self) -> GatePassResult<NewMovementRequest> {
        if self.sender_service_no.trim().is_empty() {
            return Err(GatePassError::validation("A sender is required"));
        }
        if self.source_location.trim().is_empty() {
            return Err(GatePassError::validation("A source location is required"));
        }
        if self.executive_officer.trim().is_empty() {
            return Err(GatePassError::validation(
                "An executive officer must be assigned",
            ));
        }
        if self.items.is_empty() {
            return Err(GatePassError::validation(
                "A request must carry at least one item",
            ));
        }

        let mut serials = HashSet::new();
        for item in &self.items {
            if item.name.trim().is_empty() || item.serial_no.trim().is_empty() {
                return Err(GatePassError::validation(
                    "Every item needs a name and a serial number",
                ));
            }
            if item.quantity == 0 {
                return Err(GatePassError::validation(format!(
                    "Item {} must have a quantity of at least 1",
                    item.serial_no
                )));
            }
            if item.photos.len() > MAX_PHOTOS_PER_ITEM {
                return Err(GatePassError::validation(format!(
                    "Item {} carries more than {MAX_PHOTOS_PER_ITEM} photos",
                    item.serial_no
                )));
            }
            if !serials.insert(item.serial_no.trim()) {
                return Err(GatePassError::validation(format!(
                    "Duplicate serial number {}",
                    item.serial_no
                )));
            }
        }

        Ok(NewMovementRequest {
            sender_service_no: self.sender_service_no.trim().to_string(),
            receiver: self.receiver.resolve()?,
            source_location: self.source_location.trim().to_string(),
            destination: self.destination.resolve()?,
            transport: self.transport.clone(),
            items: self.items.clone(),
            executive_officer: self.executive_officer.trim().to_string(),
        })
    }

    /// Validate, then submit as one multipart payload.
    pub async fn submit(
        &self,
        gateway: &dyn GatePassGateway,
    ) -> GatePassResult<MovementRequest> {
        let request = self.build()?;
        gateway.create_request(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PhotoUpload, TransportMode};
    use bytes::Bytes;

    fn item(serial: &str) -> NewItem {
        NewItem {
            name: "Fluke 87V".to_string(),
            serial_no: serial.to_string(),
            category: "Test equipment".to_string(),
            quantity: 1,
            model: "87V".to_string(),
            returnable: true,
            photos: Vec::new(),
        }
    }

    fn form() -> SubmissionForm {
        SubmissionForm {
            sender_service_no: "35021".to_string(),
            receiver: ReceiverSection {
                identifier: "40117".to_string(),
                nic: None,
                contact: None,
                non_member_place: false,
            },
            source_location: "HQ Stores".to_string(),
            destination: DestinationSection {
                branch: Some("Kandy".to_string()),
                company_name: None,
                company_address: None,
                non_member_place: false,
            },
            transport: Transport {
                mode: TransportMode::CompanyVehicle,
                vehicle_no: Some("LM-4821".to_string()),
                carrier_name: None,
            },
            items: vec![item("SN-100"), item("SN-101"), item("SN-102")],
            executive_officer: "10001".to_string(),
        }
    }

    #[test]
    fn member_receiver_resolves_by_service_number() {
        let built = form().build().unwrap();
        assert_eq!(
            built.receiver,
            ReceiverParty::Member {
                service_no: "40117".to_string()
            }
        );
        assert_eq!(built.items.len(), 3);
    }

    #[test]
    fn classifier_routes_external_identifiers_to_the_non_member_path() {
        let mut f = form();
        f.receiver.identifier = "NSL42".to_string();

        // classifier fires, so NIC/contact become mandatory
        assert!(f.build().unwrap_err().is_validation());

        f.receiver.nic = Some("901231456V".to_string());
        f.receiver.contact = Some("0712345678".to_string());
        let built = f.build().unwrap();
        assert!(matches!(built.receiver, ReceiverParty::NonMember { .. }));
    }

    #[test]
    fn non_member_place_flag_overrides_the_classifier() {
        let mut f = form();
        f.receiver.identifier = "J. Silva".to_string();
        f.receiver.non_member_place = true;
        f.receiver.nic = Some("901231456V".to_string());
        f.receiver.contact = Some("0712345678".to_string());

        match f.build().unwrap().receiver {
            ReceiverParty::NonMember { name, .. } => assert_eq!(name, "J. Silva"),
            other => panic!("expected non-member receiver, got {other:?}"),
        }
    }

    #[test]
    fn external_destination_requires_company_details() {
        let mut f = form();
        f.destination = DestinationSection {
            branch: None,
            company_name: Some("Lanka Hardware Ltd".to_string()),
            company_address: None,
            non_member_place: true,
        };
        assert!(f.build().unwrap_err().is_validation());

        f.destination.company_address = Some("12 Galle Rd, Colombo".to_string());
        assert!(matches!(
            f.build().unwrap().destination,
            Destination::External { .. }
        ));
    }

    #[test]
    fn photo_limit_and_duplicate_serials_are_rejected() {
        let mut f = form();
        f.items[0].photos = (0..6)
            .map(|i| PhotoUpload {
                file_name: format!("photo-{i}.jpg"),
                content: Bytes::from_static(b"jpeg"),
            })
            .collect();
        assert!(f.build().unwrap_err().is_validation());

        let mut f = form();
        f.items[1].serial_no = "SN-100".to_string();
        assert!(f.build().unwrap_err().is_validation());
    }

    #[test]
    fn empty_item_list_is_rejected_before_any_call() {
        let mut f = form();
        f.items.clear();
        assert!(f.build().unwrap_err().is_validation());
    }
}
