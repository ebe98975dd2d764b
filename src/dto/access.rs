//! Responses describing the caller and their access.

use serde::Serialize;

use crate::domain::access::ImplicitGrant;
use crate::domain::organization::Organization;
use crate::domain::role::Role;
use crate::domain::types::{PermissionCode, ProfileId, ProfileType, UserId};
use crate::domain::user::{User, UserProfile};

/// Payload of `GET /me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub organization: Option<Organization>,
    pub profile: Option<UserProfile>,
    pub profiles: Vec<UserProfile>,
    pub roles: Vec<Role>,
    pub implicit_grant: Option<ImplicitGrant>,
    pub permissions: Vec<PermissionCode>,
}

/// Payload of `POST /auth/token`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Unix timestamp the token stops being accepted at.
    pub expires_at: usize,
    pub permissions: Vec<PermissionCode>,
}

/// A member of an organization as listed by `GET /employees`.
#[derive(Debug, Serialize, PartialEq)]
pub struct EmployeeView {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub profile_id: ProfileId,
    pub profile_type: ProfileType,
    pub is_owner: bool,
    pub roles: Vec<String>,
}
