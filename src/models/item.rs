// src/models/item.rs
use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of photos accepted per item at submission time.
pub const MAX_PHOTOS_PER_ITEM: usize = 5;

/// ✅ **Item lifecycle status**
///
/// The transition is one-directional: `Returnable` → `return to <role>` →
/// `Returned`. Non-returnable items never leave their initial state. The wire
/// strings match what the backend stores verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    #[serde(rename = "non-returnable")]
    NonReturnable,
    #[serde(rename = "returnable")]
    Returnable,
    #[serde(rename = "return to Petrol Leader")]
    ReturnToPetrolLeader,
    #[serde(rename = "return to Executive Officer")]
    ReturnToExecutiveOfficer,
    #[serde(rename = "returned")]
    Returned,
}

impl ItemStatus {
    fn rank(self) -> u8 {
        match self {
            ItemStatus::NonReturnable => 0,
            ItemStatus::Returnable => 0,
            ItemStatus::ReturnToPetrolLeader | ItemStatus::ReturnToExecutiveOfficer => 1,
            ItemStatus::Returned => 2,
        }
    }

    /// No backward transition is exposed anywhere in the workflow.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        if self == ItemStatus::NonReturnable || next == ItemStatus::NonReturnable {
            return false;
        }
        next.rank() == self.rank() + 1
    }

    pub fn is_return_pending(self) -> bool {
        matches!(
            self,
            ItemStatus::ReturnToPetrolLeader | ItemStatus::ReturnToExecutiveOfficer
        )
    }
}

/// ✅ **Item belonging to exactly one movement request**
///
/// Items are mutated in bulk by return-marking actions and never deleted once
/// a request is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub serial_no: String,
    pub category: String,
    pub quantity: u32,
    pub model: String,
    pub returnable: bool,
    #[serde(default)]
    pub photos: Vec<String>,
    pub status: ItemStatus,
    pub return_date: Option<NaiveDate>,
}

/// Photo attachment staged for multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content: Bytes,
}

/// ✅ **Item section of the submission form**
///
/// Photos never travel inside the JSON payload; they are attached as
/// multipart parts by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub serial_no: String,
    pub category: String,
    pub quantity: u32,
    pub model: String,
    pub returnable: bool,
    #[serde(skip)]
    pub photos: Vec<PhotoUpload>,
}

impl NewItem {
    pub fn initial_status(&self) -> ItemStatus {
        if self.returnable {
            ItemStatus::Returnable
        } else {
            ItemStatus::NonReturnable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_is_one_directional() {
        assert!(ItemStatus::Returnable.can_transition_to(ItemStatus::ReturnToPetrolLeader));
        assert!(ItemStatus::Returnable.can_transition_to(ItemStatus::ReturnToExecutiveOfficer));
        assert!(ItemStatus::ReturnToPetrolLeader.can_transition_to(ItemStatus::Returned));

        // no skipping straight to returned, no backward moves
        assert!(!ItemStatus::Returnable.can_transition_to(ItemStatus::Returned));
        assert!(!ItemStatus::Returned.can_transition_to(ItemStatus::Returnable));
        assert!(!ItemStatus::ReturnToPetrolLeader.can_transition_to(ItemStatus::Returnable));
    }

    #[test]
    fn non_returnable_items_never_move() {
        assert!(!ItemStatus::NonReturnable.can_transition_to(ItemStatus::Returnable));
        assert!(!ItemStatus::NonReturnable.can_transition_to(ItemStatus::Returned));
    }

    #[test]
    fn wire_strings_match_backend_vocabulary() {
        let json = serde_json::to_string(&ItemStatus::ReturnToPetrolLeader).unwrap();
        assert_eq!(json, "\"return to Petrol Leader\"");
        let parsed: ItemStatus = serde_json::from_str("\"returned\"").unwrap();
        assert_eq!(parsed, ItemStatus::Returned);
    }
}
