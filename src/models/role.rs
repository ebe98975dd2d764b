//! Diesel models for the permission catalog, roles and assignments.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::role::{Permission as DomainPermission, Role as DomainRole};
use crate::domain::types::{
    Action, OrganizationId, PermissionCode, PermissionId, Resource, RoleId, RoleName,
    TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::permissions)]
/// Diesel model for [`crate::domain::role::Permission`].
pub struct Permission {
    pub id: i32,
    pub resource: String,
    pub action: String,
    pub description: String,
}

impl Permission {
    pub fn code(&self) -> Result<PermissionCode, TypeConstraintError> {
        Ok(PermissionCode::new(
            self.resource.parse::<Resource>()?,
            self.action.parse::<Action>()?,
        ))
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::roles)]
/// Diesel model for [`crate::domain::role::Role`].
pub struct Role {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::roles)]
pub struct NewRole<'a> {
    pub organization_id: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Insertable, Associations, Identifiable)]
#[diesel(primary_key(role_id, permission_id))]
#[diesel(belongs_to(Role, foreign_key = role_id))]
#[diesel(belongs_to(Permission, foreign_key = permission_id))]
#[diesel(table_name = crate::schema::role_permissions)]
/// Association table linking roles to catalog permissions.
pub struct RolePermission {
    pub role_id: i32,
    pub permission_id: i32,
}

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(primary_key(user_id, role_id))]
#[diesel(table_name = crate::schema::user_roles)]
/// Association table linking users to roles.
pub struct UserRole {
    pub user_id: i32,
    pub role_id: i32,
    pub organization_id: i32,
    pub is_active: bool,
}

impl TryFrom<Permission> for DomainPermission {
    type Error = TypeConstraintError;

    fn try_from(permission: Permission) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PermissionId::try_from(permission.id)?,
            code: permission.code()?,
            description: permission.description,
        })
    }
}

impl TryFrom<Role> for DomainRole {
    type Error = TypeConstraintError;

    fn try_from(role: Role) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RoleId::try_from(role.id)?,
            organization_id: OrganizationId::try_from(role.organization_id)?,
            name: RoleName::new(role.name)?,
            description: role.description,
            is_active: role.is_active,
            created_at: role.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_row_into_code() {
        let row = Permission {
            id: 3,
            resource: "deal".into(),
            action: "update".into(),
            description: "Update deals".into(),
        };
        let domain = DomainPermission::try_from(row).expect("valid permission");
        assert_eq!(domain.code.to_string(), "deal:update");
    }

    #[test]
    fn unknown_catalog_rows_are_rejected() {
        let row = Permission {
            id: 3,
            resource: "invoice".into(),
            action: "view".into(),
            description: String::new(),
        };
        assert!(DomainPermission::try_from(row).is_err());
    }
}
