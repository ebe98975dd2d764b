//! Permission resolution.
//!
//! ```text
//! has_permission(user, org, resource, action) =
//!     implicit grant (superuser, staff, owner, vendor)
//!     OR (resource, action) in the permissions of the user's active roles in org
//! ```

use std::collections::BTreeSet;

use crate::domain::access::{AccessContext, implicit_grant};
use crate::domain::organization::Organization;
use crate::domain::types::{OrganizationId, PermissionCode};
use crate::domain::user::{User, UserProfile};
use crate::repository::RoleReader;
use crate::services::{ServiceError, ServiceResult};

/// Answers permission questions for a user inside an organization.
pub struct PermissionChecker<'a, R: ?Sized> {
    repo: &'a R,
}

impl<'a, R> PermissionChecker<'a, R>
where
    R: RoleReader + ?Sized,
{
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    pub fn has_permission(
        &self,
        user: &User,
        organization: &Organization,
        profile: Option<&UserProfile>,
        permission: PermissionCode,
    ) -> ServiceResult<bool> {
        if !user.is_active {
            return Ok(false);
        }
        if implicit_grant(user, organization, profile).is_some() {
            return Ok(true);
        }
        let granted = self.repo.list_user_permissions(user.id, organization.id)?;
        Ok(granted.contains(&permission))
    }

    /// Every permission the user holds in the organization.
    pub fn effective_permissions(
        &self,
        user: &User,
        organization: &Organization,
        profile: Option<&UserProfile>,
    ) -> ServiceResult<BTreeSet<PermissionCode>> {
        if !user.is_active {
            return Ok(BTreeSet::new());
        }
        if implicit_grant(user, organization, profile).is_some() {
            return Ok(PermissionCode::catalog().collect());
        }
        Ok(self
            .repo
            .list_user_permissions(user.id, organization.id)?
            .into_iter()
            .collect())
    }

    /// Permissions of the request context; empty without an organization.
    pub fn context_permissions(
        &self,
        ctx: &AccessContext,
    ) -> ServiceResult<BTreeSet<PermissionCode>> {
        match &ctx.organization {
            Some(organization) => {
                self.effective_permissions(&ctx.user, organization, ctx.profile.as_ref())
            }
            None => Ok(BTreeSet::new()),
        }
    }
}

/// Guard run before every tenant-scoped operation.
///
/// Returns the organization the operation must be confined to.
pub fn ensure_permission<R>(
    repo: &R,
    ctx: &AccessContext,
    permission: PermissionCode,
) -> ServiceResult<OrganizationId>
where
    R: RoleReader + ?Sized,
{
    let Some(organization) = &ctx.organization else {
        return Err(ServiceError::Forbidden(
            "no organization selected".to_string(),
        ));
    };

    let allowed = PermissionChecker::new(repo).has_permission(
        &ctx.user,
        organization,
        ctx.profile.as_ref(),
        permission,
    )?;

    if !allowed {
        log::warn!(
            "User {} denied `{permission}` in organization {}",
            ctx.user.id,
            organization.id
        );
        return Err(ServiceError::Forbidden(format!(
            "missing permission `{permission}`"
        )));
    }

    Ok(organization.id)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::role::{Permission, Role, RoleWithPermissions};
    use crate::domain::types::{
        Action, OrganizationName, ProfileId, ProfileType, Resource, RoleId, UserEmail, UserId,
        UserName,
    };
    use crate::repository::errors::RepositoryResult;

    /// Role store returning a fixed permission set.
    #[derive(Default)]
    struct FakeRoles {
        granted: Vec<PermissionCode>,
    }

    impl RoleReader for FakeRoles {
        fn list_permissions(&self) -> RepositoryResult<Vec<Permission>> {
            Ok(Vec::new())
        }

        fn list_roles(&self, _: OrganizationId) -> RepositoryResult<Vec<RoleWithPermissions>> {
            Ok(Vec::new())
        }

        fn get_role(
            &self,
            _: RoleId,
            _: OrganizationId,
        ) -> RepositoryResult<Option<RoleWithPermissions>> {
            Ok(None)
        }

        fn list_user_permissions(
            &self,
            _: UserId,
            _: OrganizationId,
        ) -> RepositoryResult<Vec<PermissionCode>> {
            Ok(self.granted.clone())
        }

        fn list_user_roles(&self, _: UserId, _: OrganizationId) -> RepositoryResult<Vec<Role>> {
            Ok(Vec::new())
        }
    }

    fn user(id: i32) -> User {
        User {
            id: UserId::new(id).expect("valid user id"),
            email: UserEmail::new(format!("u{id}@example.com")).expect("valid email"),
            name: UserName::new("User").expect("valid name"),
            is_superuser: false,
            is_staff: false,
            is_active: true,
            active_profile_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn organization(owner: i32) -> Organization {
        Organization {
            id: OrganizationId::new(10).expect("valid org id"),
            name: OrganizationName::new("Acme").expect("valid name"),
            owner_id: Some(UserId::new(owner).expect("valid owner id")),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn employee_profile(user_id: i32) -> UserProfile {
        UserProfile {
            id: ProfileId::new(5).expect("valid profile id"),
            user_id: UserId::new(user_id).expect("valid user id"),
            organization_id: Some(OrganizationId::new(10).expect("valid org id")),
            profile_type: ProfileType::Employee,
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn code(resource: Resource, action: Action) -> PermissionCode {
        PermissionCode::new(resource, action)
    }

    #[test]
    fn employee_permissions_come_from_roles() {
        let repo = FakeRoles {
            granted: vec![code(Resource::Lead, Action::View)],
        };
        let checker = PermissionChecker::new(&repo);
        let profile = employee_profile(2);

        let org = organization(1);
        let member = user(2);

        let can_view = checker
            .has_permission(&member, &org, Some(&profile), code(Resource::Lead, Action::View))
            .expect("check succeeds");
        let can_delete = checker
            .has_permission(&member, &org, Some(&profile), code(Resource::Lead, Action::Delete))
            .expect("check succeeds");

        assert!(can_view);
        assert!(!can_delete);
    }

    #[test]
    fn owner_holds_the_full_catalog() {
        let repo = FakeRoles::default();
        let checker = PermissionChecker::new(&repo);

        let permissions = checker
            .effective_permissions(&user(1), &organization(1), None)
            .expect("permissions resolve");

        assert_eq!(permissions.len(), PermissionCode::catalog().count());
    }

    #[test]
    fn inactive_users_hold_nothing() {
        let repo = FakeRoles {
            granted: vec![code(Resource::Customer, Action::View)],
        };
        let mut inactive = user(2);
        inactive.is_active = false;

        let view = code(Resource::Customer, Action::View);

        let allowed = PermissionChecker::new(&repo)
            .has_permission(&inactive, &organization(1), None, view)
            .expect("check succeeds");

        assert!(!allowed);
    }

    #[test]
    fn ensure_permission_requires_an_organization() {
        let repo = FakeRoles::default();
        let ctx = AccessContext::new(user(1));

        let result = ensure_permission(&repo, &ctx, code(Resource::Customer, Action::View));

        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[test]
    fn ensure_permission_returns_the_scoped_organization() {
        let repo = FakeRoles {
            granted: vec![code(Resource::Deal, Action::Create)],
        };
        let ctx = AccessContext::new(user(2))
            .with_organization(organization(1), Some(employee_profile(2)));

        let org_id = ensure_permission(&repo, &ctx, code(Resource::Deal, Action::Create))
            .expect("permission granted");
        assert_eq!(org_id.get(), 10);

        let denied = ensure_permission(&repo, &ctx, code(Resource::Role, Action::Update));
        assert!(matches!(denied, Err(ServiceError::Forbidden(_))));
    }
}
