use actix_web::{HttpResponse, Responder, get, post, put, web};

use crate::domain::access::AccessContext;
use crate::forms::organization::OrganizationForm;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::organizations as organizations_service;

#[get("/organizations")]
pub async fn list_organizations(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match organizations_service::list_organizations(repo.get_ref(), &ctx) {
        Ok(organizations) => HttpResponse::Ok().json(organizations),
        Err(err) => error_response(err),
    }
}

#[post("/organizations")]
pub async fn create_organization(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<OrganizationForm>,
) -> impl Responder {
    match organizations_service::create_organization(repo.get_ref(), &ctx, form) {
        Ok(organization) => HttpResponse::Created().json(organization),
        Err(err) => error_response(err),
    }
}

#[put("/organizations/current")]
pub async fn update_organization(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<OrganizationForm>,
) -> impl Responder {
    match organizations_service::update_organization(repo.get_ref(), &ctx, form) {
        Ok(organization) => HttpResponse::Ok().json(organization),
        Err(err) => error_response(err),
    }
}
