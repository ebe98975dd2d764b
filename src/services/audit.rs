//! Audit trail recording and listing.

use serde_json::Value;

use crate::domain::access::AccessContext;
use crate::domain::audit_event::{AuditEvent, NewAuditEvent};
use crate::domain::types::{Action, OrganizationId, PermissionCode, Resource};
use crate::dto::query::AuditListParams;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{AuditListQuery, AuditReader, AuditWriter, RoleReader};
use crate::services::ServiceResult;
use crate::services::rbac::ensure_permission;

/// Records a mutation. Failures are logged and never reach the caller.
pub fn record<R>(
    repo: &R,
    ctx: &AccessContext,
    organization_id: OrganizationId,
    resource: Resource,
    action: Action,
    record_id: i32,
    payload: Value,
) where
    R: AuditWriter + ?Sized,
{
    let event = NewAuditEvent::new(organization_id, ctx.user.id, resource, action, record_id)
        .with_payload(payload);

    if let Err(err) = repo.create_audit_event(&event) {
        log::warn!(
            "Failed to record audit event {resource}:{action} #{record_id} in organization {organization_id}: {err}"
        );
    }
}

pub fn list_audit_events<R>(
    repo: &R,
    ctx: &AccessContext,
    params: AuditListParams,
) -> ServiceResult<Paginated<AuditEvent>>
where
    R: AuditReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Audit, Action::View))?;

    let page = params.page.unwrap_or(1).max(1);
    let mut query = AuditListQuery::new(organization_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(resource) = params.resource.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        query = query.resource(resource.parse::<Resource>()?);
    }

    let (total, events) = repo.list_audit_events(query)?;

    Ok(Paginated::new(events, page, total, DEFAULT_ITEMS_PER_PAGE))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::domain::organization::Organization;
    use crate::domain::types::{OrganizationName, UserEmail, UserId, UserName};
    use crate::domain::user::User;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;

    fn owner_context() -> AccessContext {
        let now = Utc::now().naive_utc();
        let user = User {
            id: UserId::new(1).expect("valid user id"),
            email: UserEmail::new("owner@example.com").expect("valid email"),
            name: UserName::new("Owner").expect("valid name"),
            is_superuser: false,
            is_staff: false,
            is_active: true,
            active_profile_id: None,
            created_at: now,
        };
        let organization = Organization {
            id: OrganizationId::new(2).expect("valid org id"),
            name: OrganizationName::new("Acme").expect("valid name"),
            owner_id: Some(user.id),
            is_active: true,
            created_at: now,
        };
        AccessContext::new(user).with_organization(organization, None)
    }

    #[test]
    fn record_swallows_repository_failures() {
        let mut repo = MockRepository::new();
        repo.expect_create_audit_event()
            .times(1)
            .returning(|_| Err(RepositoryError::DatabaseError("disk full".into())));

        let ctx = owner_context();
        record(
            &repo,
            &ctx,
            OrganizationId::new(2).expect("valid org id"),
            Resource::Customer,
            Action::Create,
            5,
            json!({"name": "Jane"}),
        );
    }

    #[test]
    fn list_rejects_unknown_resource_filter() {
        let repo = MockRepository::new();
        let ctx = owner_context();

        let result = list_audit_events(
            &repo,
            &ctx,
            AuditListParams {
                resource: Some("invoice".into()),
                page: None,
            },
        );

        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }
}
