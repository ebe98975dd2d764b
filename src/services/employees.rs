use serde_json::json;

use crate::domain::access::AccessContext;
use crate::domain::types::{Action, OrganizationId, PermissionCode, ProfileType, Resource, UserId};
use crate::domain::user::{NewUserProfile, User, UserProfile};
use crate::dto::access::EmployeeView;
use crate::forms::employee::{AddEmployeeForm, AddEmployeePayload};
use crate::repository::{AuditWriter, ProfileReader, ProfileWriter, RoleReader, UserWriter};
use crate::services::rbac::ensure_permission;
use crate::services::{ServiceError, ServiceResult, audit};

fn employee_view<R>(
    repo: &R,
    ctx: &AccessContext,
    organization_id: OrganizationId,
    profile: UserProfile,
    user: User,
) -> ServiceResult<EmployeeView>
where
    R: RoleReader + ?Sized,
{
    let roles = repo
        .list_user_roles(user.id, organization_id)?
        .into_iter()
        .map(|role| role.name.into_inner())
        .collect();
    let is_owner = ctx
        .organization
        .as_ref()
        .is_some_and(|org| org.is_owned_by(user.id));

    Ok(EmployeeView {
        user_id: user.id,
        email: user.email.into_inner(),
        name: user.name.into_inner(),
        profile_id: profile.id,
        profile_type: profile.profile_type,
        is_owner,
        roles,
    })
}

/// Vendors and employees of the current organization with their roles.
pub fn list_employees<R>(repo: &R, ctx: &AccessContext) -> ServiceResult<Vec<EmployeeView>>
where
    R: ProfileReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Employee, Action::View))?;

    // One row per user, showing their highest-ranked profile.
    let mut members: Vec<(UserProfile, User)> = Vec::new();
    for (profile, user) in repo.list_organization_members(organization_id, None)? {
        if profile.profile_type == ProfileType::Customer {
            continue;
        }
        match members.iter_mut().find(|(_, seen)| seen.id == user.id) {
            Some(entry) => {
                if profile.profile_type.precedence() < entry.0.profile_type.precedence() {
                    entry.0 = profile;
                }
            }
            None => members.push((profile, user)),
        }
    }

    members
        .into_iter()
        .map(|(profile, user)| employee_view(repo, ctx, organization_id, profile, user))
        .collect()
}

/// Adds a user to the organization as an employee, provisioning the user
/// when the email is unknown and reactivating a previously removed profile.
pub fn add_employee<R>(
    repo: &R,
    ctx: &AccessContext,
    form: AddEmployeeForm,
) -> ServiceResult<EmployeeView>
where
    R: UserWriter + ProfileWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Employee, Action::Create))?;
    let payload = AddEmployeePayload::try_from(form)?;

    let user = repo.get_or_create_user(&payload.new_user()).map_err(|err| {
        log::error!("Failed to provision employee {}: {err}", payload.email);
        err
    })?;
    if !user.is_active {
        return Err(ServiceError::Conflict(format!(
            "user {} is deactivated",
            user.email
        )));
    }

    let profile = repo
        .create_or_activate_profile(&NewUserProfile::new(
            user.id,
            Some(organization_id),
            ProfileType::Employee,
        ))
        .map_err(|err| {
            log::error!("Failed to create employee profile for {}: {err}", user.email);
            err
        })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Employee,
        Action::Create,
        user.id.get(),
        json!({"email": user.email.as_str(), "profile_id": profile.id}),
    );

    employee_view(repo, ctx, organization_id, profile, user)
}

/// Removes a member from the organization. Their user record is kept.
pub fn remove_employee<R>(repo: &R, ctx: &AccessContext, user_id: i32) -> ServiceResult<()>
where
    R: ProfileWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Employee, Action::Delete))?;
    let user_id = UserId::new(user_id)?;

    if ctx
        .organization
        .as_ref()
        .is_some_and(|org| org.is_owned_by(user_id))
    {
        return Err(ServiceError::Conflict(
            "the organization owner cannot be removed".to_string(),
        ));
    }

    let removed = repo.remove_member(user_id, organization_id).map_err(|err| {
        log::error!("Failed to remove member {user_id} from {organization_id}: {err}");
        err
    })?;
    if removed == 0 {
        return Err(ServiceError::NotFound);
    }

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Employee,
        Action::Delete,
        user_id.get(),
        json!({"profiles_deactivated": removed}),
    );

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::organization::Organization;
    use crate::domain::role::Role;
    use crate::domain::types::{
        OrganizationName, ProfileId, RoleId, RoleName, UserEmail, UserName,
    };
    use crate::repository::mock::MockRepository;

    fn user(id: i32, email: &str) -> User {
        User {
            id: UserId::new(id).expect("valid user id"),
            email: UserEmail::new(email).expect("valid email"),
            name: UserName::new("Someone").expect("valid name"),
            is_superuser: false,
            is_staff: false,
            is_active: true,
            active_profile_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn owner_context() -> AccessContext {
        let organization = Organization {
            id: OrganizationId::new(2).expect("valid org id"),
            name: OrganizationName::new("Acme").expect("valid name"),
            owner_id: Some(UserId::new(1).expect("valid user id")),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        };
        AccessContext::new(user(1, "owner@example.com")).with_organization(organization, None)
    }

    fn profile(user_id: i32, profile_type: ProfileType) -> UserProfile {
        UserProfile {
            id: ProfileId::new(user_id + 100).expect("valid profile id"),
            user_id: UserId::new(user_id).expect("valid user id"),
            organization_id: Some(OrganizationId::new(2).expect("valid org id")),
            profile_type,
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn list_marks_owner_and_skips_customers() {
        let mut repo = MockRepository::new();
        repo.expect_list_organization_members().returning(|_, _| {
            Ok(vec![
                (profile(1, ProfileType::Vendor), user(1, "owner@example.com")),
                (profile(3, ProfileType::Employee), user(3, "emp@example.com")),
                (profile(4, ProfileType::Customer), user(4, "client@example.com")),
            ])
        });
        repo.expect_list_user_roles().returning(|user_id, org| {
            if user_id.get() == 3 {
                Ok(vec![Role {
                    id: RoleId::new(1).expect("valid role id"),
                    organization_id: org,
                    name: RoleName::new("Sales").expect("valid name"),
                    description: None,
                    is_active: true,
                    created_at: Utc::now().naive_utc(),
                }])
            } else {
                Ok(Vec::new())
            }
        });

        let employees = list_employees(&repo, &owner_context()).expect("employees listed");

        assert_eq!(employees.len(), 2);
        assert!(employees[0].is_owner);
        assert_eq!(employees[1].roles, vec!["Sales".to_string()]);
    }

    #[test]
    fn user_with_several_profiles_is_listed_once() {
        let mut repo = MockRepository::new();
        repo.expect_list_organization_members().returning(|_, _| {
            Ok(vec![
                (profile(5, ProfileType::Employee), user(5, "partner@example.com")),
                (profile(3, ProfileType::Employee), user(3, "emp@example.com")),
                (profile(5, ProfileType::Vendor), user(5, "partner@example.com")),
            ])
        });
        repo.expect_list_user_roles().returning(|_, _| Ok(Vec::new()));

        let employees = list_employees(&repo, &owner_context()).expect("employees listed");

        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].user_id.get(), 5);
        assert_eq!(employees[0].profile_type, ProfileType::Vendor);
        assert_eq!(employees[1].user_id.get(), 3);
    }

    #[test]
    fn owner_cannot_be_removed() {
        let repo = MockRepository::new();
        let result = remove_employee(&repo, &owner_context(), 1);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn removing_a_stranger_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_remove_member().returning(|_, _| Ok(0));

        let result = remove_employee(&repo, &owner_context(), 42);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn adding_creates_employee_profile() {
        let mut repo = MockRepository::new();
        repo.expect_get_or_create_user()
            .returning(|new_user| Ok(user(7, new_user.email.as_str())));
        repo.expect_create_or_activate_profile()
            .withf(|p| p.profile_type == ProfileType::Employee && p.organization_id.is_some())
            .times(1)
            .returning(|p| Ok(profile(p.user_id.get(), p.profile_type)));
        repo.expect_create_audit_event()
            .times(1)
            .returning(|_| Err(crate::repository::errors::RepositoryError::NotFound));
        repo.expect_list_user_roles().returning(|_, _| Ok(Vec::new()));

        let view = add_employee(
            &repo,
            &owner_context(),
            AddEmployeeForm {
                email: "New@Example.com".into(),
                name: "New Hire".into(),
            },
        )
        .expect("employee added");

        assert_eq!(view.email, "new@example.com");
        assert_eq!(view.profile_type, ProfileType::Employee);
        assert!(!view.is_owner);
    }
}
