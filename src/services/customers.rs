use serde_json::json;

use crate::domain::access::AccessContext;
use crate::domain::customer::Customer;
use crate::domain::types::{Action, CustomerId, PermissionCode, Resource};
use crate::dto::query::CustomerListParams;
use crate::dto::records::UploadSummary;
use crate::forms::customer::{CustomerForm, CustomerPayload, UploadCustomersForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{AuditWriter, CustomerListQuery, CustomerReader, CustomerWriter, RoleReader};
use crate::services::rbac::ensure_permission;
use crate::services::{ServiceError, ServiceResult, audit};

fn customer_payload(customer: &Customer) -> serde_json::Value {
    json!({
        "name": customer.name.as_str(),
        "email": customer.email.as_ref().map(|email| email.as_str()),
        "company": customer.company.as_ref().map(|company| company.as_str()),
    })
}

pub fn list_customers<R>(
    repo: &R,
    ctx: &AccessContext,
    params: CustomerListParams,
) -> ServiceResult<Paginated<Customer>>
where
    R: CustomerReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Customer, Action::View))?;

    let page = params.page.unwrap_or(1).max(1);
    let mut query = CustomerListQuery::new(organization_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = params.search {
        query = query.search(term);
    }

    let (total, customers) = repo.list_customers(query)?;
    Ok(Paginated::new(customers, page, total, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_customer<R>(repo: &R, ctx: &AccessContext, customer_id: i32) -> ServiceResult<Customer>
where
    R: CustomerReader + RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Customer, Action::View))?;
    let customer_id = CustomerId::new(customer_id)?;

    repo.get_customer_by_id(customer_id, organization_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_customer<R>(
    repo: &R,
    ctx: &AccessContext,
    form: CustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Customer, Action::Create))?;
    let new_customer = CustomerPayload::try_from(form)
        .map_err(|err| {
            log::warn!("Rejected customer form: {err}");
            err
        })?
        .into_new(organization_id);

    let customer = repo.create_customer(&new_customer).map_err(|err| {
        log::error!("Failed to create customer: {err}");
        err
    })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Customer,
        Action::Create,
        customer.id.get(),
        customer_payload(&customer),
    );

    Ok(customer)
}

pub fn update_customer<R>(
    repo: &R,
    ctx: &AccessContext,
    customer_id: i32,
    form: CustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Customer, Action::Update))?;
    let customer_id = CustomerId::new(customer_id)?;
    let updates = CustomerPayload::try_from(form)?.into_update();

    let customer = repo
        .update_customer(customer_id, organization_id, &updates)
        .map_err(|err| {
            log::error!("Failed to update customer {customer_id}: {err}");
            err
        })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Customer,
        Action::Update,
        customer.id.get(),
        customer_payload(&customer),
    );

    Ok(customer)
}

pub fn delete_customer<R>(repo: &R, ctx: &AccessContext, customer_id: i32) -> ServiceResult<()>
where
    R: CustomerWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Customer, Action::Delete))?;
    let customer_id = CustomerId::new(customer_id)?;

    repo.delete_customer(customer_id, organization_id)?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Customer,
        Action::Delete,
        customer_id.get(),
        json!({}),
    );

    Ok(())
}

/// Imports customers from an uploaded CSV file in a single batch.
pub fn upload_customers<R>(
    repo: &R,
    ctx: &AccessContext,
    form: &mut UploadCustomersForm,
) -> ServiceResult<UploadSummary>
where
    R: CustomerWriter + RoleReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Customer, Action::Create))?;

    let customers = form.parse(organization_id).map_err(|err| {
        log::error!("Failed to parse customers: {err}");
        ServiceError::from(err)
    })?;

    let created = repo.create_customers(&customers).map_err(|err| {
        log::error!("Failed to import customers: {err}");
        err
    })?;

    // Bulk imports are recorded once, against no particular row.
    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Customer,
        Action::Create,
        0,
        json!({"imported": created}),
    );

    Ok(UploadSummary { created })
}
