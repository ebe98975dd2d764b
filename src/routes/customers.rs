use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, put, web};

use crate::domain::access::AccessContext;
use crate::dto::query::CustomerListParams;
use crate::forms::customer::{CustomerForm, UploadCustomersForm};
use crate::repository::DieselRepository;
use crate::routes::{error_response, query_params};
use crate::services::customers as customers_service;

#[get("/customers")]
pub async fn list_customers(
    req: HttpRequest,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let params = match query_params::<CustomerListParams>(&req) {
        Ok(params) => params,
        Err(response) => return response,
    };
    match customers_service::list_customers(repo.get_ref(), &ctx, params) {
        Ok(customers) => HttpResponse::Ok().json(customers),
        Err(err) => error_response(err),
    }
}

#[post("/customers")]
pub async fn create_customer(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CustomerForm>,
) -> impl Responder {
    match customers_service::create_customer(repo.get_ref(), &ctx, form) {
        Ok(customer) => HttpResponse::Created().json(customer),
        Err(err) => error_response(err),
    }
}

#[post("/customers/upload")]
pub async fn upload_customers(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    MultipartForm(mut form): MultipartForm<UploadCustomersForm>,
) -> impl Responder {
    match customers_service::upload_customers(repo.get_ref(), &ctx, &mut form) {
        Ok(summary) => HttpResponse::Created().json(summary),
        Err(err) => error_response(err),
    }
}

#[get("/customers/{customer_id}")]
pub async fn get_customer(
    customer_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customers_service::get_customer(repo.get_ref(), &ctx, customer_id.into_inner()) {
        Ok(customer) => HttpResponse::Ok().json(customer),
        Err(err) => error_response(err),
    }
}

#[put("/customers/{customer_id}")]
pub async fn update_customer(
    customer_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CustomerForm>,
) -> impl Responder {
    match customers_service::update_customer(repo.get_ref(), &ctx, customer_id.into_inner(), form)
    {
        Ok(customer) => HttpResponse::Ok().json(customer),
        Err(err) => error_response(err),
    }
}

#[delete("/customers/{customer_id}")]
pub async fn delete_customer(
    customer_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customers_service::delete_customer(repo.get_ref(), &ctx, customer_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
