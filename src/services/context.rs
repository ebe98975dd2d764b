//! Resolution of the organization a request operates in.

use crate::domain::access::{AccessContext, can_access_organization};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::organization::Organization;
use crate::domain::types::{OrganizationId, UserEmail, UserName};
use crate::domain::user::{NewUser, User, UserProfile};
use crate::repository::{OrganizationReader, ProfileReader, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

/// Header selecting the organization explicitly.
pub const ORGANIZATION_HEADER: &str = "X-Organization-Id";

/// Loads the caller, provisioning first-seen users from the token claims.
pub fn load_user<R>(repo: &R, claims: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let email = UserEmail::new(claims.email.as_str()).map_err(|err| {
        log::warn!("Rejecting token with invalid email `{}`: {err}", claims.email);
        ServiceError::Unauthorized
    })?;

    let user = match repo.get_user_by_email(&email)? {
        Some(user) => user,
        None => {
            let name = UserName::new(claims.name.as_str())
                .or_else(|_| UserName::new(email.as_str()))?;
            let new_user = NewUser::new(email, name).with_flags(claims.is_superuser, claims.is_staff);
            let user = repo.get_or_create_user(&new_user).map_err(|err| {
                log::error!("Failed to provision user {}: {err}", claims.email);
                err
            })?;
            log::info!("Provisioned user {} from token claims", user.email);
            user
        }
    };

    if !user.is_active {
        return Err(ServiceError::Unauthorized);
    }

    Ok(user)
}

/// Picks the profile that best describes the user inside one organization.
fn preferred_profile(profiles: Vec<UserProfile>) -> Option<UserProfile> {
    profiles
        .into_iter()
        .filter(|profile| profile.is_active)
        .min_by_key(|profile| (profile.profile_type.precedence(), profile.id.get()))
}

/// Pairs the organization with the user's profile in it, or `None` when the
/// user may not enter it.
fn enter_organization<R>(
    repo: &R,
    user: &User,
    organization: Organization,
) -> ServiceResult<Option<(Organization, Option<UserProfile>)>>
where
    R: ProfileReader + ?Sized,
{
    let profile = preferred_profile(repo.list_profiles_in_organization(user.id, organization.id)?);

    if !can_access_organization(user, &organization, profile.as_ref()) {
        return Ok(None);
    }

    Ok(Some((organization, profile)))
}

fn active_organization<R>(
    repo: &R,
    organization_id: OrganizationId,
) -> ServiceResult<Option<Organization>>
where
    R: OrganizationReader + ?Sized,
{
    Ok(repo
        .get_organization_by_id(organization_id)?
        .filter(|org| org.is_active))
}

/// Organization derived from the user's profiles when none was requested.
///
/// The profile only selects the organization; the context profile inside it
/// is ranked the same way as for an explicit request.
fn default_organization<R>(
    repo: &R,
    user: &User,
) -> ServiceResult<Option<(Organization, Option<UserProfile>)>>
where
    R: OrganizationReader + ProfileReader + ?Sized,
{
    let profiles = repo.list_user_profiles(user.id)?;

    let active = user
        .active_profile_id
        .and_then(|id| profiles.iter().find(|profile| profile.id == id));

    let candidates = active
        .into_iter()
        .chain(profiles.iter())
        .filter(|profile| profile.is_active && profile.user_id == user.id);

    for profile in candidates {
        let Some(organization_id) = profile.organization_id else {
            continue;
        };
        if let Some(organization) = active_organization(repo, organization_id)?
            && let Some(entered) = enter_organization(repo, user, organization)?
        {
            return Ok(Some(entered));
        }
    }

    Ok(None)
}

/// Builds the [`AccessContext`] of a request.
///
/// The organization comes from the `X-Organization-Id` header when present,
/// then from the token's `organization_id` claim, then from the user's
/// profiles. An explicit header that cannot be honoured is an error; a stale
/// claim silently falls back to the profile default.
pub fn resolve_access_context<R>(
    repo: &R,
    claims: &AuthenticatedUser,
    requested: Option<&str>,
) -> ServiceResult<AccessContext>
where
    R: UserReader + UserWriter + OrganizationReader + ProfileReader + ?Sized,
{
    let user = load_user(repo, claims)?;

    if let Some(raw) = requested {
        let organization_id = raw
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(|id| OrganizationId::new(id).ok())
            .ok_or_else(|| {
                ServiceError::Form(format!("invalid {ORGANIZATION_HEADER} header: `{raw}`"))
            })?;

        let organization =
            active_organization(repo, organization_id)?.ok_or(ServiceError::NotFound)?;

        return match enter_organization(repo, &user, organization)? {
            Some((organization, profile)) => {
                Ok(AccessContext::new(user).with_organization(organization, profile))
            }
            None => {
                log::warn!(
                    "User {} requested organization {organization_id} without membership",
                    user.id
                );
                Err(ServiceError::Forbidden(
                    "not a member of this organization".to_string(),
                ))
            }
        };
    }

    if let Some(organization_id) = claims
        .organization_id
        .and_then(|id| OrganizationId::new(id).ok())
        && let Some(organization) = active_organization(repo, organization_id)?
        && let Some((organization, profile)) = enter_organization(repo, &user, organization)?
    {
        return Ok(AccessContext::new(user).with_organization(organization, profile));
    }

    let ctx = match default_organization(repo, &user)? {
        Some((organization, profile)) => {
            AccessContext::new(user).with_organization(organization, profile)
        }
        None => AccessContext::new(user),
    };

    Ok(ctx)
}
