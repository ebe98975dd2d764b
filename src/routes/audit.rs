use actix_web::{HttpRequest, HttpResponse, Responder, get, web};

use crate::domain::access::AccessContext;
use crate::dto::query::AuditListParams;
use crate::repository::DieselRepository;
use crate::routes::{error_response, query_params};
use crate::services::audit as audit_service;

#[get("/audit")]
pub async fn list_audit_events(
    req: HttpRequest,
    ctx: AccessContext,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let params = match query_params::<AuditListParams>(&req) {
        Ok(params) => params,
        Err(response) => return response,
    };
    match audit_service::list_audit_events(repo.get_ref(), &ctx, params) {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(err) => error_response(err),
    }
}
