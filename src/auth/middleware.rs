use actix_web::{
    HttpMessage,
    Error, HttpResponse, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web::Data,
};
use tracing::{debug, warn};

use crate::{
    auth::{
        access::{self, PageAccess},
        session,
    },
    config::Config,
    error::ApiError,
};

fn app_config(req: &ServiceRequest) -> Result<Data<Config>, Error> {
    req.app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| ApiError::Internal.into())
}

fn redirect(req: ServiceRequest, location: &str) -> ServiceResponse<BoxBody> {
    debug!(from = %req.path(), to = %location, "Redirecting page request");

    let resp = HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, location))
        .finish();
    req.into_response(resp)
}

fn reject(req: ServiceRequest, err: ApiError) -> ServiceResponse<BoxBody> {
    req.into_response(err.error_response())
}

/// Role-based gate for page requests. Wraps the whole app.
pub async fn page_gate(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = app_config(&req)?;

    if access::has_prefix(req.path(), &config.api_prefix) {
        return next.call(req).await;
    }

    let role = session::from_cookies(req.request(), &config.session_secret).map(|s| s.role);

    match access::decide_page(req.path(), role) {
        PageAccess::Pass => next.call(req).await,
        PageAccess::SignIn(target) => Ok(redirect(req, &target)),
        PageAccess::Home(home) => Ok(redirect(req, home)),
    }
}

/// Session and role check for the protected API scope.
///
/// On success the resolved [`session::Session`] is stored in the request
/// extensions for handlers to extract.
pub async fn api_guard(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = app_config(&req)?;

    let Some(session) = session::from_cookies(req.request(), &config.session_secret) else {
        return Ok(reject(req, ApiError::Unauthorized("Authentication required".into())));
    };

    let route = req
        .path()
        .strip_prefix(config.api_prefix.as_str())
        .unwrap_or(req.path());
    let allowed = access::api_allows(session.role, req.method(), route);

    if !allowed {
        warn!(
            role = %session.role,
            method = %req.method(),
            path = %req.path(),
            "Role has no grant for API route"
        );
        return Ok(reject(
            req,
            ApiError::Forbidden("You do not have permission to access this resource".into()),
        ));
    }

    req.extensions_mut().insert(session);

    next.call(req).await
}
