//! HTTP handlers of the `/api/v1` scope.

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::middleware::from_fn;
use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::middleware::organization_context;
use crate::services::ServiceError;

pub mod access;
pub mod audit;
pub mod customers;
pub mod deals;
pub mod employees;
pub mod leads;
pub mod organizations;
pub mod roles;

fn detail(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "detail": message.into() }))
}

/// Maps a service failure to its HTTP status with a `{"detail": ...}` body.
pub fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => detail(StatusCode::UNAUTHORIZED, err.to_string()),
        ServiceError::Forbidden(message) => detail(StatusCode::FORBIDDEN, message),
        ServiceError::NotFound => detail(StatusCode::NOT_FOUND, "not found"),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            detail(StatusCode::BAD_REQUEST, message)
        }
        ServiceError::Conflict(message) => detail(StatusCode::CONFLICT, message),
        ServiceError::Internal(message) => {
            log::error!("Internal error: {message}");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

/// Parses the query string, keeping repeated keys.
pub(crate) fn query_params<T: DeserializeOwned>(req: &HttpRequest) -> Result<T, HttpResponse> {
    serde_html_form::from_str(req.query_string())
        .map_err(|err| detail(StatusCode::BAD_REQUEST, format!("invalid query: {err}")))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = detail(StatusCode::BAD_REQUEST, err.to_string());
    InternalError::from_response(err, response).into()
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Registers every handler under `/api/v1` behind the organization context
/// middleware. Literal segments are registered before `{id}` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .wrap(from_fn(organization_context))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(health)
            .service(access::issue_token)
            .service(access::me)
            .service(access::set_active_profile)
            .service(organizations::list_organizations)
            .service(organizations::create_organization)
            .service(organizations::update_organization)
            .service(employees::list_employees)
            .service(employees::add_employee)
            .service(employees::remove_employee)
            .service(roles::list_permissions)
            .service(roles::list_roles)
            .service(roles::create_role)
            .service(roles::update_role_permissions)
            .service(roles::delete_role)
            .service(roles::assign_role)
            .service(roles::revoke_role)
            .service(customers::upload_customers)
            .service(customers::list_customers)
            .service(customers::create_customer)
            .service(customers::get_customer)
            .service(customers::update_customer)
            .service(customers::delete_customer)
            .service(leads::lead_stats)
            .service(leads::list_leads)
            .service(leads::create_lead)
            .service(leads::get_lead)
            .service(leads::update_lead)
            .service(leads::delete_lead)
            .service(leads::convert_lead)
            .service(deals::deal_stats)
            .service(deals::list_deals)
            .service(deals::create_deal)
            .service(deals::get_deal)
            .service(deals::update_deal)
            .service(deals::delete_deal)
            .service(audit::list_audit_events),
    );
}
