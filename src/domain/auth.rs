//! Claims carried by bearer tokens.

use serde::{Deserialize, Serialize};

use crate::domain::types::ProfileType;

/// Decoded JWT claims of the caller.
///
/// Tokens minted by the identity provider carry only the identity part;
/// tokens re-issued by this service additionally embed the organization
/// context and the effective permissions in colon notation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_type: Option<ProfileType>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize,
}
