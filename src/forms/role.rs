use serde::Deserialize;
use validator::Validate;

use crate::domain::role::NewRole;
use crate::domain::types::{OrganizationId, PermissionCode, RoleName, UserId};
use crate::forms::FormError;

fn parse_permissions(codes: &[String]) -> Result<Vec<PermissionCode>, FormError> {
    codes
        .iter()
        .map(|code| code.parse::<PermissionCode>().map_err(FormError::from))
        .collect()
}

#[derive(Debug, Deserialize, Validate)]
/// Body of `POST /roles`.
pub struct CreateRoleForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Codes in `resource:action` (or `resource.action`) notation.
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRolePayload {
    pub name: RoleName,
    pub description: Option<String>,
    pub permissions: Vec<PermissionCode>,
}

impl TryFrom<CreateRoleForm> for CreateRolePayload {
    type Error = FormError;

    fn try_from(form: CreateRoleForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: RoleName::new(form.name)?,
            description: form.description,
            permissions: parse_permissions(&form.permissions)?,
        })
    }
}

impl CreateRolePayload {
    pub fn into_domain(self, organization_id: OrganizationId) -> NewRole {
        NewRole::new(
            organization_id,
            self.name,
            self.description,
            self.permissions,
        )
    }
}

#[derive(Debug, Deserialize)]
/// Body of `PUT /roles/{id}/permissions`.
pub struct RolePermissionsForm {
    pub permissions: Vec<String>,
}

impl TryFrom<RolePermissionsForm> for Vec<PermissionCode> {
    type Error = FormError;

    fn try_from(form: RolePermissionsForm) -> Result<Self, Self::Error> {
        let mut codes = parse_permissions(&form.permissions)?;
        codes.sort_unstable();
        codes.dedup();
        Ok(codes)
    }
}

#[derive(Debug, Deserialize)]
/// Body of `POST /roles/{id}/members`.
pub struct AssignRoleForm {
    pub user_id: i32,
}

impl TryFrom<AssignRoleForm> for UserId {
    type Error = FormError;

    fn try_from(form: AssignRoleForm) -> Result<Self, Self::Error> {
        Ok(UserId::new(form.user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Action, Resource};

    #[test]
    fn both_notations_are_accepted() {
        let payload = CreateRolePayload::try_from(CreateRoleForm {
            name: "Support".into(),
            description: None,
            permissions: vec!["customer:view".into(), "lead.update".into()],
        })
        .expect("valid role");

        assert_eq!(
            payload.permissions,
            vec![
                PermissionCode::new(Resource::Customer, Action::View),
                PermissionCode::new(Resource::Lead, Action::Update),
            ]
        );
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let result = Vec::<PermissionCode>::try_from(RolePermissionsForm {
            permissions: vec!["invoice:view".into()],
        });
        assert!(matches!(result, Err(FormError::Constraint(_))));
    }

    #[test]
    fn empty_names_fail_validation() {
        let result = CreateRolePayload::try_from(CreateRoleForm {
            name: String::new(),
            description: None,
            permissions: Vec::new(),
        });
        assert!(matches!(result, Err(FormError::Validation(_))));
    }
}
