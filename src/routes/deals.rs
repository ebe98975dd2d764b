use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, put, web};

use crate::domain::access::AccessContext;
use crate::dto::query::DealListParams;
use crate::forms::deal::DealForm;
use crate::repository::DieselRepository;
use crate::routes::{error_response, query_params};
use crate::services::deals as deals_service;

#[get("/deals")]
pub async fn list_deals(
    req: HttpRequest,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let params = match query_params::<DealListParams>(&req) {
        Ok(params) => params,
        Err(response) => return response,
    };
    match deals_service::list_deals(repo.get_ref(), &ctx, params) {
        Ok(deals) => HttpResponse::Ok().json(deals),
        Err(err) => error_response(err),
    }
}

#[get("/deals/stats")]
pub async fn deal_stats(ctx: AccessContext, repo: web::Data<DieselRepository>) -> impl Responder {
    match deals_service::deal_stats(repo.get_ref(), &ctx) {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => error_response(err),
    }
}

#[post("/deals")]
pub async fn create_deal(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<DealForm>,
) -> impl Responder {
    match deals_service::create_deal(repo.get_ref(), &ctx, form) {
        Ok(deal) => HttpResponse::Created().json(deal),
        Err(err) => error_response(err),
    }
}

#[get("/deals/{deal_id}")]
pub async fn get_deal(
    deal_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match deals_service::get_deal(repo.get_ref(), &ctx, deal_id.into_inner()) {
        Ok(deal) => HttpResponse::Ok().json(deal),
        Err(err) => error_response(err),
    }
}

#[put("/deals/{deal_id}")]
pub async fn update_deal(
    deal_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<DealForm>,
) -> impl Responder {
    match deals_service::update_deal(repo.get_ref(), &ctx, deal_id.into_inner(), form) {
        Ok(deal) => HttpResponse::Ok().json(deal),
        Err(err) => error_response(err),
    }
}

#[delete("/deals/{deal_id}")]
pub async fn delete_deal(
    deal_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match deals_service::delete_deal(repo.get_ref(), &ctx, deal_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
