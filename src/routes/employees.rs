use actix_web::{HttpResponse, Responder, delete, get, post, web};

use crate::domain::access::AccessContext;
use crate::forms::employee::AddEmployeeForm;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::employees as employees_service;

#[get("/employees")]
pub async fn list_employees(ctx: AccessContext, repo: web::Data<DieselRepository>) -> impl Responder {
    match employees_service::list_employees(repo.get_ref(), &ctx) {
        Ok(employees) => HttpResponse::Ok().json(employees),
        Err(err) => error_response(err),
    }
}

#[post("/employees")]
pub async fn add_employee(
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AddEmployeeForm>,
) -> impl Responder {
    match employees_service::add_employee(repo.get_ref(), &ctx, form) {
        Ok(employee) => HttpResponse::Created().json(employee),
        Err(err) => error_response(err),
    }
}

#[delete("/employees/{user_id}")]
pub async fn remove_employee(
    user_id: web::Path<i32>,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match employees_service::remove_employee(repo.get_ref(), &ctx, user_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
