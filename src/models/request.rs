// src/models/request.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::item::{Item, NewItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    ByHand,
    CompanyVehicle,
    PrivateVehicle,
    Courier,
}

/// Transport descriptor attached to a request at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    pub mode: TransportMode,
    pub vehicle_no: Option<String>,
    pub carrier_name: Option<String>,
}

/// ✅ **Receiving party, resolved mutually exclusively**
///
/// Either an internal service-number lookup or an external (non-member)
/// name/NIC/contact triple; never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReceiverParty {
    Member { service_no: String },
    NonMember { name: String, nic: String, contact: String },
}

impl ReceiverParty {
    pub fn service_no(&self) -> Option<&str> {
        match self {
            ReceiverParty::Member { service_no } => Some(service_no),
            ReceiverParty::NonMember { .. } => None,
        }
    }
}

/// Destination of the movement: an organizational branch or an external
/// company identified by name and address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    Branch { location: String },
    External { company_name: String, address: String },
}

/// ✅ **Movement request**
///
/// Created once by the submitter; immutable afterwards except for item
/// return-state updates and executive officer reassignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub reference_no: String,
    pub sender_service_no: String,
    pub receiver: ReceiverParty,
    pub source_location: String,
    pub destination: Destination,
    pub transport: Transport,
    pub items: Vec<Item>,
    pub executive_officer: String,
    pub created_at: NaiveDateTime,
}

impl MovementRequest {
    pub fn item(&self, serial_no: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.serial_no == serial_no)
    }
}

/// ✅ **Submission payload assembled by the request form**
#[derive(Debug, Clone, Serialize)]
pub struct NewMovementRequest {
    pub sender_service_no: String,
    pub receiver: ReceiverParty,
    pub source_location: String,
    pub destination: Destination,
    pub transport: Transport,
    pub items: Vec<NewItem>,
    pub executive_officer: String,
}
