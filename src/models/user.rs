// src/models/user.rs
use serde::{Deserialize, Serialize};

/// ✅ **Employee profile as returned by the directory / ERP search**
///
/// Read-only from the client's perspective; fetched on demand and cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub service_no: String,
    pub name: String,
    pub section: String,
    pub group: String,
    pub designation: String,
    pub contact: String,
    pub email: Option<String>,
    #[serde(default)]
    pub branches: Vec<String>,
}

impl UserProfile {
    /// Degraded stand-in used when a directory lookup fails: the service
    /// number is retained, every other field renders as "N/A".
    pub fn placeholder(service_no: &str) -> Self {
        Self {
            service_no: service_no.to_string(),
            name: "N/A".to_string(),
            section: "N/A".to_string(),
            group: "N/A".to_string(),
            designation: "N/A".to_string(),
            contact: "N/A".to_string(),
            email: None,
            branches: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == "N/A" && self.designation == "N/A"
    }
}
