//! Operations on the caller's own identity: `/me`, profile switching and
//! token issuing.

use crate::domain::access::AccessContext;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::ProfileId;
use crate::dto::access::{MeResponse, TokenResponse};
use crate::forms::profile::SetActiveProfileForm;
use crate::jwt;
use crate::models::config::AuthConfig;
use crate::repository::{ProfileReader, RoleReader, UserWriter};
use crate::services::rbac::PermissionChecker;
use crate::services::{ServiceError, ServiceResult};

/// Describes the caller inside the resolved organization.
pub fn me<R>(repo: &R, ctx: &AccessContext) -> ServiceResult<MeResponse>
where
    R: ProfileReader + RoleReader + ?Sized,
{
    let profiles = repo.list_user_profiles(ctx.user.id)?;
    let permissions = PermissionChecker::new(repo).context_permissions(ctx)?;
    let roles = match ctx.organization_id() {
        Some(organization_id) => repo.list_user_roles(ctx.user.id, organization_id)?,
        None => Vec::new(),
    };

    Ok(MeResponse {
        user: ctx.user.clone(),
        organization: ctx.organization.clone(),
        profile: ctx.profile.clone(),
        profiles,
        roles,
        implicit_grant: ctx.implicit_grant(),
        permissions: permissions.into_iter().collect(),
    })
}

/// Switches the profile used to pick the default organization.
pub fn set_active_profile<R>(
    repo: &R,
    ctx: &AccessContext,
    form: SetActiveProfileForm,
) -> ServiceResult<()>
where
    R: ProfileReader + UserWriter + ?Sized,
{
    let profile_id = ProfileId::try_from(form)?;

    let profile = repo
        .get_profile_by_id(profile_id)?
        .filter(|profile| profile.user_id == ctx.user.id)
        .ok_or(ServiceError::NotFound)?;

    if !profile.is_active {
        return Err(ServiceError::Form("profile is not active".to_string()));
    }

    repo.set_active_profile(ctx.user.id, Some(profile.id))
        .map_err(|err| {
            log::error!("Failed to set active profile for user {}: {err}", ctx.user.id);
            err
        })?;

    Ok(())
}

/// Mints a token for the current context with the effective permissions embedded.
pub fn issue_token<R>(
    repo: &R,
    ctx: &AccessContext,
    config: &AuthConfig,
) -> ServiceResult<TokenResponse>
where
    R: RoleReader + ?Sized,
{
    let permissions: Vec<_> = PermissionChecker::new(repo)
        .context_permissions(ctx)?
        .into_iter()
        .collect();

    let expires_at = jwt::expiration(config.token_ttl_seconds);
    let claims = AuthenticatedUser {
        sub: ctx.user.id.to_string(),
        email: ctx.user.email.to_string(),
        name: ctx.user.name.to_string(),
        is_superuser: ctx.user.is_superuser,
        is_staff: ctx.user.is_staff,
        organization_id: ctx.organization_id().map(|id| id.get()),
        profile_type: ctx.profile.as_ref().map(|profile| profile.profile_type),
        permissions: permissions.iter().map(ToString::to_string).collect(),
        exp: expires_at,
    };

    let access_token = jwt::encode_token(&claims, &config.secret).map_err(|err| {
        log::error!("Failed to encode token for user {}: {err}", ctx.user.id);
        ServiceError::Internal("failed to issue token".to_string())
    })?;

    Ok(TokenResponse {
        access_token,
        token_type: "Bearer",
        expires_at,
        permissions,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::organization::Organization;
    use crate::domain::types::{
        Action, OrganizationId, OrganizationName, PermissionCode, ProfileType, Resource,
        UserEmail, UserId, UserName,
    };
    use crate::domain::user::{User, UserProfile};
    use crate::repository::mock::MockRepository;

    fn user() -> User {
        User {
            id: UserId::new(3).expect("valid user id"),
            email: UserEmail::new("emp@example.com").expect("valid email"),
            name: UserName::new("Emp").expect("valid name"),
            is_superuser: false,
            is_staff: false,
            is_active: true,
            active_profile_id: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn employee_context() -> AccessContext {
        let now = Utc::now().naive_utc();
        let organization = Organization {
            id: OrganizationId::new(2).expect("valid org id"),
            name: OrganizationName::new("Acme").expect("valid name"),
            owner_id: None,
            is_active: true,
            created_at: now,
        };
        let profile = UserProfile {
            id: ProfileId::new(4).expect("valid profile id"),
            user_id: UserId::new(3).expect("valid user id"),
            organization_id: Some(organization.id),
            profile_type: ProfileType::Employee,
            is_active: true,
            created_at: now,
        };
        AccessContext::new(user()).with_organization(organization, Some(profile))
    }

    #[test]
    fn token_embeds_role_permissions() {
        let mut repo = MockRepository::new();
        repo.expect_list_user_permissions().returning(|_, _| {
            Ok(vec![
                PermissionCode::new(Resource::Lead, Action::View),
                PermissionCode::new(Resource::Customer, Action::View),
            ])
        });

        let config = AuthConfig {
            secret: "secret".to_string(),
            token_ttl_seconds: 60,
        };
        let response = issue_token(&repo, &employee_context(), &config).expect("token issued");

        let claims = jwt::decode_token(&response.access_token, "secret").expect("valid token");
        assert_eq!(claims.organization_id, Some(2));
        assert_eq!(claims.profile_type, Some(ProfileType::Employee));
        assert_eq!(claims.permissions, vec!["customer:view", "lead:view"]);
        assert_eq!(response.token_type, "Bearer");
    }

    #[test]
    fn foreign_profile_cannot_be_activated() {
        let mut repo = MockRepository::new();
        repo.expect_get_profile_by_id().returning(|id| {
            Ok(Some(UserProfile {
                id,
                user_id: UserId::new(99).expect("valid user id"),
                organization_id: None,
                profile_type: ProfileType::Customer,
                is_active: true,
                created_at: Utc::now().naive_utc(),
            }))
        });

        let result = set_active_profile(
            &repo,
            &AccessContext::new(user()),
            SetActiveProfileForm { profile_id: 10 },
        );
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn me_without_organization_has_no_permissions() {
        let mut repo = MockRepository::new();
        repo.expect_list_user_profiles().returning(|_| Ok(Vec::new()));

        let me = me(&repo, &AccessContext::new(user())).expect("me resolved");
        assert!(me.permissions.is_empty());
        assert!(me.roles.is_empty());
        assert_eq!(me.implicit_grant, None);
    }
}
