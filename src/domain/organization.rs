//! Tenant boundary shared by every business record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{OrganizationId, OrganizationName, UserId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: OrganizationName,
    pub owner_id: Option<UserId>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Organization {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == Some(user_id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewOrganization {
    pub name: OrganizationName,
    pub owner_id: UserId,
}

impl NewOrganization {
    #[must_use]
    pub fn new(name: OrganizationName, owner_id: UserId) -> Self {
        Self { name, owner_id }
    }
}
