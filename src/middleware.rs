//! Organization context middleware.
//!
//! Decodes the bearer token, resolves the caller and the organization the
//! request operates in, and stores the resulting [`AccessContext`] in the
//! request extensions. Requests without a valid token pass through without a
//! context; handlers that extract [`AccessContext`] then answer 401.

use std::future::{Ready, ready};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::middleware::Next;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, web};

use crate::domain::access::AccessContext;
use crate::jwt::{bearer_token, decode_token};
use crate::models::config::AuthConfig;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::context::{ORGANIZATION_HEADER, resolve_access_context};
use crate::services::ServiceError;

pub async fn organization_context<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    let (Some(auth), Some(repo)) = (
        req.app_data::<web::Data<AuthConfig>>().cloned(),
        req.app_data::<web::Data<DieselRepository>>().cloned(),
    ) else {
        log::error!("Organization context middleware is missing application data");
        let response = error_response(ServiceError::Internal(
            "server is misconfigured".to_string(),
        ));
        return Ok(req.into_response(response).map_into_right_body());
    };

    let claims = match bearer_token(req.headers()).map(|token| decode_token(token, &auth.secret)) {
        Some(Ok(claims)) => Some(claims),
        Some(Err(err)) => {
            log::debug!("Ignoring invalid bearer token: {err}");
            None
        }
        None => None,
    };

    if let Some(claims) = claims {
        let requested = req
            .headers()
            .get(ORGANIZATION_HEADER)
            .map(|value| value.to_str().unwrap_or_default().to_string());

        match resolve_access_context(repo.get_ref(), &claims, requested.as_deref()) {
            Ok(ctx) => {
                req.extensions_mut().insert(ctx);
            }
            Err(err) => {
                return Ok(req.into_response(error_response(err)).map_into_right_body());
            }
        }
    }

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

impl FromRequest for AccessContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AccessContext>()
            .cloned()
            .ok_or_else(|| {
                InternalError::from_response(
                    "authentication required",
                    error_response(ServiceError::Unauthorized),
                )
                .into()
            });
        ready(result)
    }
}
