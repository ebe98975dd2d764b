//! Roles, the permission catalog and role assignments.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Action, OrganizationId, PermissionCode, PermissionId, Resource, RoleId, RoleName,
    TypeConstraintError, UserId,
};

/// Catalog entry for a `(resource, action)` pair.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Permission {
    pub id: PermissionId,
    pub code: PermissionCode,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub id: RoleId,
    pub organization_id: OrganizationId,
    pub name: RoleName,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// A role together with the permissions it carries.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<PermissionCode>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewRole {
    pub organization_id: OrganizationId,
    pub name: RoleName,
    pub description: Option<String>,
    pub permissions: Vec<PermissionCode>,
}

impl NewRole {
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        name: RoleName,
        description: Option<String>,
        mut permissions: Vec<PermissionCode>,
    ) -> Self {
        permissions.sort_unstable();
        permissions.dedup();
        Self {
            organization_id,
            name,
            description: description
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            permissions,
        }
    }
}

/// Assignment of a role to a user inside an organization.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUserRole {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub organization_id: OrganizationId,
}

/// Role definition not yet bound to an organization.
#[derive(Clone, Debug, PartialEq)]
pub struct RoleTemplate {
    pub name: RoleName,
    pub description: Option<String>,
    pub permissions: Vec<PermissionCode>,
}

impl RoleTemplate {
    pub fn into_new_role(self, organization_id: OrganizationId) -> NewRole {
        NewRole::new(organization_id, self.name, self.description, self.permissions)
    }
}

/// Roles every new organization starts with.
///
/// `Manager` may do anything with CRM records and read the audit trail;
/// `Sales` may view, create and update customers, leads and deals.
pub fn default_role_templates() -> Result<Vec<RoleTemplate>, TypeConstraintError> {
    let records = [Resource::Customer, Resource::Lead, Resource::Deal];

    let manager = records
        .into_iter()
        .flat_map(|resource| Action::ALL.map(|action| PermissionCode::new(resource, action)))
        .chain(std::iter::once(PermissionCode::new(Resource::Audit, Action::View)))
        .collect();

    let sales = records
        .into_iter()
        .flat_map(|resource| {
            [Action::View, Action::Create, Action::Update]
                .map(|action| PermissionCode::new(resource, action))
        })
        .collect();

    Ok(vec![
        RoleTemplate {
            name: RoleName::new("Manager")?,
            description: Some("Full access to customers, leads and deals".to_string()),
            permissions: manager,
        },
        RoleTemplate {
            name: RoleName::new("Sales")?,
            description: Some("Works customers, leads and deals".to_string()),
            permissions: sales,
        },
    ])
}
