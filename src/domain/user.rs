//! Users and the profiles that attach them to organizations.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    OrganizationId, ProfileId, ProfileType, TypeConstraintError, UserEmail, UserId, UserName,
};

/// Identity known to the CRM, keyed by email.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: UserEmail,
    pub name: UserName,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
    /// Profile the user last switched to; drives the default organization.
    pub active_profile_id: Option<ProfileId>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub email: UserEmail,
    pub name: UserName,
    pub is_superuser: bool,
    pub is_staff: bool,
}

impl NewUser {
    #[must_use]
    pub fn new(email: UserEmail, name: UserName) -> Self {
        Self {
            email,
            name,
            is_superuser: false,
            is_staff: false,
        }
    }

    /// Marks the user with the elevated flags asserted by the identity provider.
    #[must_use]
    pub fn with_flags(mut self, is_superuser: bool, is_staff: bool) -> Self {
        self.is_superuser = is_superuser;
        self.is_staff = is_staff;
        self
    }

    pub fn try_new(email: &str, name: &str) -> Result<Self, TypeConstraintError> {
        Ok(Self::new(UserEmail::new(email)?, UserName::new(name)?))
    }
}

/// Ties a user to a vendor/employee/customer context, optionally inside an organization.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub organization_id: Option<OrganizationId>,
    pub profile_type: ProfileType,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl UserProfile {
    /// Whether this profile grants membership in `organization_id`.
    pub fn is_member_of(&self, organization_id: OrganizationId) -> bool {
        self.is_active && self.organization_id == Some(organization_id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewUserProfile {
    pub user_id: UserId,
    pub organization_id: Option<OrganizationId>,
    pub profile_type: ProfileType,
}

impl NewUserProfile {
    #[must_use]
    pub fn new(
        user_id: UserId,
        organization_id: Option<OrganizationId>,
        profile_type: ProfileType,
    ) -> Self {
        Self {
            user_id,
            organization_id,
            profile_type,
        }
    }
}
