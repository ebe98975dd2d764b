use serde_json::json;

use crate::domain::access::AccessContext;
use crate::domain::deal::{Deal, DealStage, DealStats};
use crate::domain::types::{Action, DealId, PermissionCode, Resource};
use crate::dto::query::DealListParams;
use crate::forms::deal::{DealForm, DealPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AuditWriter, CustomerReader, DealListQuery, DealReader, DealWriter, OrganizationReader,
    ProfileReader, RoleReader,
};
use crate::services::rbac::ensure_permission;
use crate::services::scope::{ensure_customer, ensure_member};
use crate::services::{ServiceError, ServiceResult, audit};

fn deal_payload(deal: &Deal) -> serde_json::Value {
    json!({
        "title": deal.title.as_str(),
        "stage": deal.stage,
        "amount": deal.amount,
        "customer_id": deal.customer_id,
        "owner_id": deal.owner_id,
        "closed_at": deal.closed_at,
    })
}

pub fn list_deals<R>(
    repo: &R,
    ctx: &AccessContext,
    params: DealListParams,
) -> ServiceResult<Paginated<Deal>>
where
    R: DealReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Deal, Action::View))?;

    let stages = params
        .stage
        .iter()
        .map(|stage| stage.parse::<DealStage>())
        .collect::<Result<Vec<_>, _>>()?;

    let page = params.page.unwrap_or(1).max(1);
    let query = DealListQuery::new(organization_id)
        .stages(stages)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    let (total, deals) = repo.list_deals(query)?;
    Ok(Paginated::new(deals, page, total, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_deal<R>(repo: &R, ctx: &AccessContext, deal_id: i32) -> ServiceResult<Deal>
where
    R: DealReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Deal, Action::View))?;
    let deal_id = DealId::new(deal_id)?;

    repo.get_deal_by_id(deal_id, organization_id)?
        .ok_or(ServiceError::NotFound)
}

/// Pipeline summary: counts per stage, open pipeline value and won value.
pub fn deal_stats<R>(repo: &R, ctx: &AccessContext) -> ServiceResult<DealStats>
where
    R: DealReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Deal, Action::View))?;
    Ok(repo.deal_stats(organization_id)?)
}

pub fn create_deal<R>(repo: &R, ctx: &AccessContext, form: DealForm) -> ServiceResult<Deal>
where
    R: DealWriter
        + CustomerReader
        + OrganizationReader
        + ProfileReader
        + RoleReader
        + AuditWriter
        + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Deal, Action::Create))?;
    let new_deal = DealPayload::try_from(form)?.into_new(organization_id, ctx.user.id);

    ensure_customer(repo, organization_id, new_deal.customer_id)?;
    if new_deal.owner_id != Some(ctx.user.id) {
        ensure_member(repo, organization_id, new_deal.owner_id)?;
    }

    let deal = repo.create_deal(&new_deal).map_err(|err| {
        log::error!("Failed to create deal: {err}");
        err
    })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Deal,
        Action::Create,
        deal.id.get(),
        deal_payload(&deal),
    );

    Ok(deal)
}

/// Updates a deal; moving it to `won` or `lost` stamps `closed_at`.
pub fn update_deal<R>(
    repo: &R,
    ctx: &AccessContext,
    deal_id: i32,
    form: DealForm,
) -> ServiceResult<Deal>
where
    R: DealWriter
        + CustomerReader
        + OrganizationReader
        + ProfileReader
        + RoleReader
        + AuditWriter
        + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Deal, Action::Update))?;
    let deal_id = DealId::new(deal_id)?;
    let updates = DealPayload::try_from(form)?.into_update();

    ensure_customer(repo, organization_id, updates.customer_id)?;
    ensure_member(repo, organization_id, updates.owner_id)?;

    let deal = repo
        .update_deal(deal_id, organization_id, &updates)
        .map_err(|err| {
            log::error!("Failed to update deal {deal_id}: {err}");
            err
        })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Deal,
        Action::Update,
        deal.id.get(),
        deal_payload(&deal),
    );

    Ok(deal)
}

pub fn delete_deal<R>(repo: &R, ctx: &AccessContext, deal_id: i32) -> ServiceResult<()>
where
    R: DealWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Deal, Action::Delete))?;
    let deal_id = DealId::new(deal_id)?;

    repo.delete_deal(deal_id, organization_id)?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Deal,
        Action::Delete,
        deal_id.get(),
        json!({}),
    );

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::organization::Organization;
    use crate::domain::types::{OrganizationId, OrganizationName, UserEmail, UserId, UserName};
    use crate::domain::user::User;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn context(permissions_only: bool) -> AccessContext {
        let now = Utc::now().naive_utc();
        let user = User {
            id: UserId::new(1).expect("valid user id"),
            email: UserEmail::new("sales@example.com").expect("valid email"),
            name: UserName::new("Sales").expect("valid name"),
            is_superuser: false,
            is_staff: false,
            is_active: true,
            active_profile_id: None,
            created_at: now,
        };
        let organization = Organization {
            id: OrganizationId::new(2).expect("valid org id"),
            name: OrganizationName::new("Acme").expect("valid name"),
            owner_id: (!permissions_only).then_some(user.id),
            is_active: true,
            created_at: now,
        };
        AccessContext::new(user).with_organization(organization, None)
    }

    #[test]
    fn stage_filters_are_parsed() {
        let mut repo = MockRepository::new();
        repo.expect_list_deals()
            .withf(|query| query.stages == vec![DealStage::Won, DealStage::Lost])
            .returning(|_| Ok((0, Vec::new())));

        let page = list_deals(
            &repo,
            &context(false),
            DealListParams {
                stage: vec!["won".into(), "LOST".into()],
                page: None,
            },
        )
        .expect("deals listed");
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn view_permission_is_enough_for_stats() {
        let mut repo = MockRepository::new();
        repo.expect_list_user_permissions().returning(|_, _| {
            Ok(vec![PermissionCode::new(Resource::Deal, Action::View)])
        });
        repo.expect_deal_stats()
            .returning(|_| Ok(DealStats::default()));

        let stats = deal_stats(&repo, &context(true)).expect("stats computed");
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn owner_outside_organization_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_organization_by_id().returning(|_| Ok(None));
        repo.expect_list_profiles_in_organization()
            .returning(|_, _| Ok(Vec::new()));

        let result = create_deal(
            &repo,
            &context(false),
            DealForm {
                title: "Renewal".into(),
                owner_id: Some(50),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn deleting_missing_deal_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_delete_deal()
            .returning(|_, _| Err(RepositoryError::NotFound));

        let result = delete_deal(&repo, &context(false), 9);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
