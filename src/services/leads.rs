use serde_json::json;

use crate::domain::access::AccessContext;
use crate::domain::lead::{Lead, LeadStats, LeadStatus};
use crate::domain::types::{Action, LeadId, PermissionCode, Resource};
use crate::dto::query::LeadListParams;
use crate::dto::records::ConvertedLead;
use crate::forms::lead::{ConvertLeadForm, ConvertLeadPayload, LeadForm, LeadPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AuditWriter, CustomerReader, DealWriter, LeadListQuery, LeadReader, LeadWriter,
    OrganizationReader, ProfileReader, RoleReader,
};
use crate::services::rbac::ensure_permission;
use crate::services::scope::{ensure_customer, ensure_member};
use crate::services::{ServiceError, ServiceResult, audit};

fn lead_payload(lead: &Lead) -> serde_json::Value {
    json!({
        "title": lead.title.as_str(),
        "status": lead.status,
        "estimated_value": lead.estimated_value,
        "customer_id": lead.customer_id,
        "assigned_to": lead.assigned_to,
    })
}

pub fn list_leads<R>(
    repo: &R,
    ctx: &AccessContext,
    params: LeadListParams,
) -> ServiceResult<Paginated<Lead>>
where
    R: LeadReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Lead, Action::View))?;

    let statuses = params
        .status
        .iter()
        .map(|status| status.parse::<LeadStatus>())
        .collect::<Result<Vec<_>, _>>()?;

    let page = params.page.unwrap_or(1).max(1);
    let mut query = LeadListQuery::new(organization_id)
        .statuses(statuses)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = params.search {
        query = query.search(term);
    }

    let (total, leads) = repo.list_leads(query)?;
    Ok(Paginated::new(leads, page, total, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_lead<R>(repo: &R, ctx: &AccessContext, lead_id: i32) -> ServiceResult<Lead>
where
    R: LeadReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Lead, Action::View))?;
    let lead_id = LeadId::new(lead_id)?;

    repo.get_lead_by_id(lead_id, organization_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn lead_stats<R>(repo: &R, ctx: &AccessContext) -> ServiceResult<LeadStats>
where
    R: LeadReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Lead, Action::View))?;
    Ok(repo.lead_stats(organization_id)?)
}

pub fn create_lead<R>(repo: &R, ctx: &AccessContext, form: LeadForm) -> ServiceResult<Lead>
where
    R: LeadWriter
        + CustomerReader
        + OrganizationReader
        + ProfileReader
        + RoleReader
        + AuditWriter
        + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Lead, Action::Create))?;
    let new_lead = LeadPayload::try_from(form)?.into_new(organization_id);

    ensure_customer(repo, organization_id, new_lead.customer_id)?;
    ensure_member(repo, organization_id, new_lead.assigned_to)?;

    let lead = repo.create_lead(&new_lead).map_err(|err| {
        log::error!("Failed to create lead: {err}");
        err
    })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Lead,
        Action::Create,
        lead.id.get(),
        lead_payload(&lead),
    );

    Ok(lead)
}

/// Updates a lead. A converted lead keeps its status; submitting any status
/// for it is a conflict.
pub fn update_lead<R>(
    repo: &R,
    ctx: &AccessContext,
    lead_id: i32,
    form: LeadForm,
) -> ServiceResult<Lead>
where
    R: LeadReader
        + LeadWriter
        + CustomerReader
        + OrganizationReader
        + ProfileReader
        + RoleReader
        + AuditWriter
        + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Lead, Action::Update))?;
    let lead_id = LeadId::new(lead_id)?;
    let payload = LeadPayload::try_from(form)?;

    let current = repo
        .get_lead_by_id(lead_id, organization_id)?
        .ok_or(ServiceError::NotFound)?;
    if current.is_converted() && payload.status.is_some() {
        return Err(ServiceError::Conflict(format!(
            "lead {lead_id} is converted; its status cannot change"
        )));
    }
    let updates = payload.into_update(&current);

    ensure_customer(repo, organization_id, updates.customer_id)?;
    ensure_member(repo, organization_id, updates.assigned_to)?;

    let lead = repo
        .update_lead(lead_id, organization_id, &updates)
        .map_err(|err| {
            log::error!("Failed to update lead {lead_id}: {err}");
            err
        })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Lead,
        Action::Update,
        lead.id.get(),
        lead_payload(&lead),
    );

    Ok(lead)
}

pub fn delete_lead<R>(repo: &R, ctx: &AccessContext, lead_id: i32) -> ServiceResult<()>
where
    R: LeadWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Lead, Action::Delete))?;
    let lead_id = LeadId::new(lead_id)?;

    repo.delete_lead(lead_id, organization_id)?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Lead,
        Action::Delete,
        lead_id.get(),
        json!({}),
    );

    Ok(())
}

/// Turns a lead into a deal and marks the lead converted atomically.
///
/// Requires both `deal:create` and `lead:update`.
pub fn convert_lead<R>(
    repo: &R,
    ctx: &AccessContext,
    lead_id: i32,
    form: ConvertLeadForm,
) -> ServiceResult<ConvertedLead>
where
    R: LeadReader + LeadWriter + DealWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Deal, Action::Create))?;
    ensure_permission(repo, ctx, PermissionCode::new(Resource::Lead, Action::Update))?;
    let lead_id = LeadId::new(lead_id)?;
    let payload = ConvertLeadPayload::try_from(form)?;

    let lead = repo
        .get_lead_by_id(lead_id, organization_id)?
        .ok_or(ServiceError::NotFound)?;
    if lead.is_converted() {
        return Err(ServiceError::Conflict(format!(
            "lead {lead_id} is already converted"
        )));
    }

    let new_deal = payload.into_deal(&lead, ctx.user.id)?;
    let (lead, deal) = repo
        .convert_lead(lead_id, organization_id, &new_deal)
        .map_err(|err| {
            log::error!("Failed to convert lead {lead_id}: {err}");
            err
        })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Lead,
        Action::Update,
        lead.id.get(),
        json!({"status": lead.status, "deal_id": deal.id}),
    );
    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Deal,
        Action::Create,
        deal.id.get(),
        json!({"title": deal.title.as_str(), "amount": deal.amount, "lead_id": lead.id}),
    );

    Ok(ConvertedLead { lead, deal })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::deal::{Deal, DealStage};
    use crate::domain::organization::Organization;
    use crate::domain::types::{
        Amount, DealId, DealTitle, LeadTitle, OrganizationId, OrganizationName, UserEmail, UserId,
        UserName,
    };
    use crate::domain::user::User;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn context(owner: bool) -> AccessContext {
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
            owner_id: owner.then_some(user.id),
            is_active: true,
            created_at: now,
        };
        AccessContext::new(user).with_organization(organization, None)
    }

    fn lead(status: LeadStatus) -> Lead {
        let now = Utc::now().naive_utc();
        Lead {
            id: LeadId::new(4).expect("valid lead id"),
            organization_id: OrganizationId::new(2).expect("valid org id"),
            customer_id: None,
            assigned_to: None,
            title: LeadTitle::new("Website redesign").expect("valid title"),
            status,
            source: None,
            estimated_value: Amount::new(5000).expect("valid amount"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn unknown_status_filter_is_rejected() {
        let repo = MockRepository::new();
        let result = list_leads(
            &repo,
            &context(true),
            LeadListParams {
                status: vec!["new".into(), "archived".into()],
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }

    #[test]
    fn conversion_needs_both_permissions() {
        let mut repo = MockRepository::new();
        repo.expect_list_user_permissions().returning(|_, _| {
            Ok(vec![PermissionCode::new(Resource::Deal, Action::Create)])
        });

        let result = convert_lead(&repo, &context(false), 4, ConvertLeadForm::default());
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[test]
    fn converted_lead_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id()
            .returning(|_, _| Ok(Some(lead(LeadStatus::Converted))));

        let result = convert_lead(&repo, &context(true), 4, ConvertLeadForm::default());
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn conversion_creates_deal_from_lead() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id()
            .returning(|_, _| Ok(Some(lead(LeadStatus::Qualified))));
        repo.expect_convert_lead()
            .withf(|id, org, deal| {
                id.get() == 4
                    && org.get() == 2
                    && deal.lead_id == Some(*id)
                    && deal.amount.get() == 5000
                    && deal.owner_id.map(|o| o.get()) == Some(1)
            })
            .times(1)
            .returning(|_, _, new_deal| {
                let now = Utc::now().naive_utc();
                let deal = Deal {
                    id: DealId::new(8).expect("valid deal id"),
                    organization_id: new_deal.organization_id,
                    customer_id: new_deal.customer_id,
                    lead_id: new_deal.lead_id,
                    owner_id: new_deal.owner_id,
                    title: DealTitle::new(new_deal.title.as_str()).expect("valid title"),
                    stage: DealStage::Prospecting,
                    amount: new_deal.amount,
                    closed_at: None,
                    created_at: now,
                    updated_at: now,
                };
                Ok((lead(LeadStatus::Converted), deal))
            });
        repo.expect_create_audit_event()
            .times(2)
            .returning(|_| Err(RepositoryError::NotFound));

        let converted = convert_lead(&repo, &context(true), 4, ConvertLeadForm::default())
            .expect("lead converted");

        assert!(converted.lead.is_converted());
        assert_eq!(converted.deal.title.as_str(), "Website redesign");
    }

    #[test]
    fn editing_converted_lead_keeps_it_converted() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id()
            .returning(|_, _| Ok(Some(lead(LeadStatus::Converted))));
        repo.expect_update_lead()
            .withf(|_, _, updates| updates.status == LeadStatus::Converted)
            .times(1)
            .returning(|_, _, _| Ok(lead(LeadStatus::Converted)));
        repo.expect_create_audit_event()
            .returning(|_| Err(RepositoryError::NotFound));

        let updated = update_lead(
            &repo,
            &context(true),
            4,
            LeadForm {
                title: "Website v2".into(),
                ..Default::default()
            },
        )
        .expect("lead updated");
        assert!(updated.is_converted());
    }

    #[test]
    fn status_change_on_converted_lead_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id()
            .returning(|_, _| Ok(Some(lead(LeadStatus::Converted))));

        let result = update_lead(
            &repo,
            &context(true),
            4,
            LeadForm {
                title: "Website".into(),
                status: Some("qualified".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn foreign_customer_reference_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer_by_id().returning(|_, _| Ok(None));

        let result = create_lead(
            &repo,
            &context(true),
            LeadForm {
                title: "Expansion".into(),
                customer_id: Some(77),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
