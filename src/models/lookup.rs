// src/models/lookup.rs
use serde::{Deserialize, Serialize};

/// Branch / location entry from the ERP lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub code: String,
    pub name: String,
}

/// Item category from the category listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
}
