use actix_web::{HttpResponse, Responder, get, post, web};

use crate::domain::access::AccessContext;
use crate::forms::profile::SetActiveProfileForm;
use crate::models::config::AuthConfig;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::access as access_service;

#[post("/auth/token")]
pub async fn issue_token(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    auth: web::Data<AuthConfig>,
) -> impl Responder {
    match access_service::issue_token(repo.get_ref(), &ctx, auth.get_ref()) {
        Ok(token) => HttpResponse::Ok().json(token),
        Err(err) => error_response(err),
    }
}

#[get("/me")]
pub async fn me(ctx: AccessContext, repo: web::Data<DieselRepository>) -> impl Responder {
    match access_service::me(repo.get_ref(), &ctx) {
        Ok(me) => HttpResponse::Ok().json(me),
        Err(err) => error_response(err),
    }
}

#[post("/me/active-profile")]
pub async fn set_active_profile(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SetActiveProfileForm>,
) -> impl Responder {
    match access_service::set_active_profile(repo.get_ref(), &ctx, form) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
