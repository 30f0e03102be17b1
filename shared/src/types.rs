//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Reference to an uploaded approving document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentReference {
    pub name: String,
    pub file_url: String,
}
