use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, put, web};

use crate::domain::access::AccessContext;
use crate::dto::query::LeadListParams;
use crate::forms::lead::{ConvertLeadForm, LeadForm};
use crate::repository::DieselRepository;
use crate::routes::{error_response, query_params};
use crate::services::leads as leads_service;

#[get("/leads")]
pub async fn list_leads(
    req: HttpRequest,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let params = match query_params::<LeadListParams>(&req) {
        Ok(params) => params,
        Err(response) => return response,
    };
    match leads_service::list_leads(repo.get_ref(), &ctx, params) {
        Ok(leads) => HttpResponse::Ok().json(leads),
        Err(err) => error_response(err),
    }
}

#[get("/leads/stats")]
pub async fn lead_stats(ctx: AccessContext, repo: web::Data<DieselRepository>) -> impl Responder {
    match leads_service::lead_stats(repo.get_ref(), &ctx) {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => error_response(err),
    }
}

#[post("/leads")]
pub async fn create_lead(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<LeadForm>,
) -> impl Responder {
    match leads_service::create_lead(repo.get_ref(), &ctx, form) {
        Ok(lead) => HttpResponse::Created().json(lead),
        Err(err) => error_response(err),
    }
}

#[get("/leads/{lead_id}")]
pub async fn get_lead(
    lead_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match leads_service::get_lead(repo.get_ref(), &ctx, lead_id.into_inner()) {
        Ok(lead) => HttpResponse::Ok().json(lead),
        Err(err) => error_response(err),
    }
}

#[put("/leads/{lead_id}")]
pub async fn update_lead(
    lead_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<LeadForm>,
) -> impl Responder {
    match leads_service::update_lead(repo.get_ref(), &ctx, lead_id.into_inner(), form) {
        Ok(lead) => HttpResponse::Ok().json(lead),
        Err(err) => error_response(err),
    }
}

#[delete("/leads/{lead_id}")]
pub async fn delete_lead(
    lead_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match leads_service::delete_lead(repo.get_ref(), &ctx, lead_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

#[post("/leads/{lead_id}/convert")]
pub async fn convert_lead(
    lead_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    form: Option<web::Json<ConvertLeadForm>>,
) -> impl Responder {
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    match leads_service::convert_lead(repo.get_ref(), &ctx, lead_id.into_inner(), form) {
        Ok(converted) => HttpResponse::Created().json(converted),
        Err(err) => error_response(err),
    }
}
