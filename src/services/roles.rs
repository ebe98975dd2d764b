use serde_json::json;

use crate::domain::access::AccessContext;
use crate::domain::role::{NewUserRole, Permission, RoleWithPermissions};
use crate::domain::types::{Action, PermissionCode, Resource, RoleId, UserId};
use crate::forms::role::{AssignRoleForm, CreateRoleForm, CreateRolePayload, RolePermissionsForm};
use crate::repository::{AuditWriter, ProfileReader, RoleReader, RoleWriter};
use crate::services::rbac::ensure_permission;
use crate::services::{ServiceError, ServiceResult, audit};

fn codes(permissions: &[PermissionCode]) -> Vec<String> {
    permissions.iter().map(ToString::to_string).collect()
}

/// The permission catalog.
pub fn list_permissions<R>(repo: &R, ctx: &AccessContext) -> ServiceResult<Vec<Permission>>
where
    R: RoleReader + ?Sized,
{
    ensure_permission(repo, ctx, PermissionCode::new(Resource::Role, Action::View))?;
    Ok(repo.list_permissions()?)
}

pub fn list_roles<R>(repo: &R, ctx: &AccessContext) -> ServiceResult<Vec<RoleWithPermissions>>
where
    R: RoleReader + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Role, Action::View))?;
    Ok(repo.list_roles(organization_id)?)
}

pub fn create_role<R>(
    repo: &R,
    ctx: &AccessContext,
    form: CreateRoleForm,
) -> ServiceResult<RoleWithPermissions>
where
    R: RoleReader + RoleWriter + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Role, Action::Create))?;
    let new_role = CreateRolePayload::try_from(form)?.into_domain(organization_id);

    let role = repo.create_role(&new_role).map_err(|err| {
        log::error!("Failed to create role `{}`: {err}", new_role.name);
        err
    })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Role,
        Action::Create,
        role.role.id.get(),
        json!({"name": role.role.name.as_str(), "permissions": codes(&role.permissions)}),
    );

    Ok(role)
}

/// Replaces the full permission set of a role.
pub fn update_role_permissions<R>(
    repo: &R,
    ctx: &AccessContext,
    role_id: i32,
    form: RolePermissionsForm,
) -> ServiceResult<RoleWithPermissions>
where
    R: RoleReader + RoleWriter + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Role, Action::Update))?;
    let role_id = RoleId::new(role_id)?;
    let permissions = Vec::<PermissionCode>::try_from(form)?;

    let role = repo
        .replace_role_permissions(role_id, organization_id, &permissions)
        .map_err(|err| {
            log::error!("Failed to update permissions of role {role_id}: {err}");
            err
        })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Role,
        Action::Update,
        role_id.get(),
        json!({"permissions": codes(&role.permissions)}),
    );

    Ok(role)
}

/// Deactivates a role together with its assignments.
pub fn delete_role<R>(repo: &R, ctx: &AccessContext, role_id: i32) -> ServiceResult<()>
where
    R: RoleReader + RoleWriter + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Role, Action::Delete))?;
    let role_id = RoleId::new(role_id)?;

    repo.deactivate_role(role_id, organization_id)
        .map_err(|err| {
            log::error!("Failed to deactivate role {role_id}: {err}");
            err
        })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Role,
        Action::Delete,
        role_id.get(),
        json!({}),
    );

    Ok(())
}

/// Assigns a role to a member of the current organization.
pub fn assign_role<R>(
    repo: &R,
    ctx: &AccessContext,
    role_id: i32,
    form: AssignRoleForm,
) -> ServiceResult<()>
where
    R: RoleReader + RoleWriter + ProfileReader + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Role, Action::Update))?;
    let role_id = RoleId::new(role_id)?;
    let user_id = UserId::try_from(form)?;

    let role = repo
        .get_role(role_id, organization_id)?
        .filter(|role| role.role.is_active)
        .ok_or(ServiceError::NotFound)?;

    if repo
        .list_profiles_in_organization(user_id, organization_id)?
        .is_empty()
    {
        return Err(ServiceError::Form(format!(
            "user {user_id} has no active profile in this organization"
        )));
    }

    repo.assign_role(&NewUserRole {
        user_id,
        role_id,
        organization_id,
    })
    .map_err(|err| {
        log::error!("Failed to assign role {role_id} to user {user_id}: {err}");
        err
    })?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Role,
        Action::Update,
        role_id.get(),
        json!({"assigned_user_id": user_id, "role": role.role.name.as_str()}),
    );

    Ok(())
}

pub fn revoke_role<R>(
    repo: &R,
    ctx: &AccessContext,
    role_id: i32,
    user_id: i32,
) -> ServiceResult<()>
where
    R: RoleReader + RoleWriter + AuditWriter + ?Sized,
{
    let organization_id =
        ensure_permission(repo, ctx, PermissionCode::new(Resource::Role, Action::Update))?;
    let role_id = RoleId::new(role_id)?;
    let user_id = UserId::new(user_id)?;

    repo.revoke_role(user_id, role_id, organization_id)?;

    audit::record(
        repo,
        ctx,
        organization_id,
        Resource::Role,
        Action::Update,
        role_id.get(),
        json!({"revoked_user_id": user_id}),
    );

    Ok(())
}
