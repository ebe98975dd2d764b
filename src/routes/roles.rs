use actix_web::{HttpResponse, Responder, delete, get, post, put, web};

use crate::domain::access::AccessContext;
use crate::forms::role::{AssignRoleForm, CreateRoleForm, RolePermissionsForm};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::roles as roles_service;

#[get("/permissions")]
pub async fn list_permissions(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match roles_service::list_permissions(repo.get_ref(), &ctx) {
        Ok(permissions) => HttpResponse::Ok().json(permissions),
        Err(err) => error_response(err),
    }
}

#[get("/roles")]
pub async fn list_roles(ctx: AccessContext, repo: web::Data<DieselRepository>) -> impl Responder {
    match roles_service::list_roles(repo.get_ref(), &ctx) {
        Ok(roles) => HttpResponse::Ok().json(roles),
        Err(err) => error_response(err),
    }
}

#[post("/roles")]
pub async fn create_role(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreateRoleForm>,
) -> impl Responder {
    match roles_service::create_role(repo.get_ref(), &ctx, form) {
        Ok(role) => HttpResponse::Created().json(role),
        Err(err) => error_response(err),
    }
}

#[put("/roles/{role_id}/permissions")]
pub async fn update_role_permissions(
    role_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<RolePermissionsForm>,
) -> impl Responder {
    match roles_service::update_role_permissions(repo.get_ref(), &ctx, role_id.into_inner(), form)
    {
        Ok(role) => HttpResponse::Ok().json(role),
        Err(err) => error_response(err),
    }
}

#[delete("/roles/{role_id}")]
pub async fn delete_role(
    role_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match roles_service::delete_role(repo.get_ref(), &ctx, role_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

#[post("/roles/{role_id}/members")]
pub async fn assign_role(
    role_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AssignRoleForm>,
) -> impl Responder {
    match roles_service::assign_role(repo.get_ref(), &ctx, role_id.into_inner(), form) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

#[delete("/roles/{role_id}/members/{user_id}")]
pub async fn revoke_role(
    path: web::Path<(i32, i32)>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (role_id, user_id) = path.into_inner();
    match roles_service::revoke_role(repo.get_ref(), &ctx, role_id, user_id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
