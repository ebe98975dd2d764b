use serde::Serialize;

use crate::domain::deal::Deal;
use crate::domain::lead::Lead;

/// Payload of `POST /leads/{id}/convert`.
#[derive(Debug, Serialize)]
pub struct ConvertedLead {
    pub lead: Lead,
    pub deal: Deal,
}

/// Payload of `POST /customers/upload`.
#[derive(Debug, Serialize, PartialEq)]
pub struct UploadSummary {
    pub created: usize,
}
