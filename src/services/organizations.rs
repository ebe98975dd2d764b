use serde_json::json;

use crate::domain::access::AccessContext;
use crate::domain::organization::{NewOrganization, Organization};
use crate::domain::role::default_role_templates;
use crate::domain::types::{Action, OrganizationName, PermissionCode, Resource};
use crate::forms::organization::OrganizationForm;
use crate::repository::{AuditWriter, OrganizationReader, OrganizationWriter, RoleReader};
use crate::services::rbac::ensure_permission;
use crate::services::{ServiceResult, audit};

/// Creates an organization owned by the caller.
///
/// The caller receives a vendor profile that becomes their active profile,
/// and the `Manager` and `Sales` roles are seeded.
pub fn create_organization<R>(
    repo: &R,
    ctx: &AccessContext,
    form: OrganizationForm,
) -> ServiceResult<Organization>
where
    R: OrganizationWriter + AuditWriter + ?Sized,
{
    let name = OrganizationName::try_from(form)?;
    let templates = default_role_templates()?;

    let (organization, profile) = repo
        .create_organization(&NewOrganization::new(name, ctx.user.id), &templates)
        .map_err(|err| {
            log::error!("Failed to create organization: {err}");
            err
        })?;

    audit::record(
        repo,
        ctx,
        organization.id,
        Resource::Organization,
        Action::Create,
        organization.id.get(),
        json!({"name": organization.name.as_str(), "vendor_profile_id": profile.id}),
    );

    Ok(organization)
}

/// Organizations the caller may switch to; superusers see every organization.
pub fn list_organizations<R>(repo: &R, ctx: &AccessContext) -> ServiceResult<Vec<Organization>>
where
    R: OrganizationReader + ?Sized,
{
    let organizations = if ctx.user.is_superuser {
        repo.list_all_organizations()?
    } else {
        repo.list_user_organizations(ctx.user.id)?
    };
    Ok(organizations)
}

/// Renames the current organization.
pub fn update_organization<R>(
    repo: &R,
    ctx: &AccessContext,
    form: OrganizationForm,
) -> ServiceResult<Organization>
where
    R: OrganizationWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id = ensure_permission(
        repo,
        ctx,
        PermissionCode::new(Resource::Organization, Action::Update),
    )?;
    let name = OrganizationName::try_from(form)?;

    let organization = repo
        .update_organization_name(organization_id, &name)
        .map_err(|err| {
            log::error!("Failed to update organization {organization_id}: {err}");
            err
        })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Organization,
        Action::Update,
        organization_id.get(),
        json!({"name": organization.name.as_str()}),
    );

    Ok(organization)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::{OrganizationId, ProfileId, ProfileType, UserEmail, UserId, UserName};
    use crate::domain::user::{User, UserProfile};
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;

    fn user() -> User {
        User {
            id: UserId::new(1).expect("valid user id"),
            email: UserEmail::new("owner@example.com").expect("valid email"),
            name: UserName::new("Owner").expect("valid name"),
            is_superuser: false,
            is_staff: false,
            is_active: true,
            active_profile_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn organization(name: &str) -> Organization {
        Organization {
            id: OrganizationId::new(10).expect("valid org id"),
            name: OrganizationName::new(name).expect("valid name"),
            owner_id: Some(UserId::new(1).expect("valid user id")),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn creating_seeds_default_roles_and_audits() {
        let mut repo = MockRepository::new();
        repo.expect_create_organization()
            .withf(|new_org, templates| {
                new_org.name.as_str() == "Acme"
                    && new_org.owner_id.get() == 1
                    && templates.iter().map(|t| t.name.as_str()).eq(["Manager", "Sales"])
            })
            .times(1)
            .returning(|new_org, _| {
                let org = organization(new_org.name.as_str());
                let profile = UserProfile {
                    id: ProfileId::new(5).expect("valid profile id"),
                    user_id: new_org.owner_id,
                    organization_id: Some(org.id),
                    profile_type: ProfileType::Vendor,
                    is_active: true,
                    created_at: Utc::now().naive_utc(),
                };
                Ok((org, profile))
            });
        repo.expect_create_audit_event()
            .withf(|event| event.resource == Resource::Organization && event.action == Action::Create)
            .times(1)
            .returning(|_| Err(crate::repository::errors::RepositoryError::NotFound));

        let org = create_organization(
            &repo,
            &AccessContext::new(user()),
            OrganizationForm { name: " Acme ".into() },
        )
        .expect("organization created");

        assert_eq!(org.name.as_str(), "Acme");
    }

    #[test]
    fn update_requires_an_organization() {
        let repo = MockRepository::new();
        let result = update_organization(
            &repo,
            &AccessContext::new(user()),
            OrganizationForm { name: "New".into() },
        );
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[test]
    fn superuser_lists_everything() {
        let mut repo = MockRepository::new();
        repo.expect_list_all_organizations()
            .times(1)
            .returning(|| Ok(vec![organization("A"), organization("B")]));

        let mut admin = user();
        admin.is_superuser = true;
        let organizations =
            list_organizations(&repo, &AccessContext::new(admin)).expect("organizations listed");
        assert_eq!(organizations.len(), 2);
    }
}
