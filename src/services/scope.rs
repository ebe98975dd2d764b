//! Checks that records referenced by a payload live in the same organization.

use crate::domain::types::{CustomerId, OrganizationId, UserId};
use crate::repository::{CustomerReader, OrganizationReader, ProfileReader};
use crate::services::{ServiceError, ServiceResult};

pub fn ensure_customer<R>(
    repo: &R,
    organization_id: OrganizationId,
    customer_id: Option<CustomerId>,
) -> ServiceResult<()>
where
    R: CustomerReader + ?Sized,
{
    let Some(customer_id) = customer_id else {
        return Ok(());
    };
    if repo
        .get_customer_by_id(customer_id, organization_id)?
        .is_none()
    {
        return Err(ServiceError::Form(format!(
            "customer {customer_id} does not belong to this organization"
        )));
    }
    Ok(())
}

/// The user must own the organization or hold an active profile in it.
pub fn ensure_member<R>(
    repo: &R,
    organization_id: OrganizationId,
    user_id: Option<UserId>,
) -> ServiceResult<()>
where
    R: OrganizationReader + ProfileReader + ?Sized,
{
    let Some(user_id) = user_id else {
        return Ok(());
    };
    let is_owner = repo
        .get_organization_by_id(organization_id)?
        .is_some_and(|org| org.is_owned_by(user_id));
    if is_owner
        || !repo
            .list_profiles_in_organization(user_id, organization_id)?
            .is_empty()
    {
        return Ok(());
    }
    Err(ServiceError::Form(format!(
        "user {user_id} is not a member of this organization"
    )))
}
