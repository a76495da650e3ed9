use actix_web::{HttpResponse, web};
use tracing::{debug, error, info, instrument};

use crate::{
    api::user::{Account, create_account},
    auth::{
        password::verify_password,
        session::{Session, issue_token, login_cookies, logout_cookies},
    },
    config::Config,
    error::ApiError,
    model::role::Role,
    models::{ApiResponse, LoginReq, LoginResponse, RegisterReq},
    store::UserStore,
    utils::email_cache::EmailCache,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Sign in and receive the session cookies
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Signed in; sets the token, role and userName cookies", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = Object),
        (status = 401, description = "Unknown email or wrong password", body = Object, example = json!({
            "status": "error",
            "message": "Invalid email or password"
        }))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(users, config, payload),
    fields(email = %payload.email)
)]
pub async fn login(
    payload: web::Json<LoginReq>,
    users: web::Data<dyn UserStore>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    info!("Login request received");

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(ApiError::BadRequest("Email and password are required".into()).into());
    }

    debug!("Fetching user");

    let user = match users.find_by_email(payload.email.trim()).await {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()).into());
        }
        Err(e) => return Err(ApiError::from(e).into()),
    };

    if !verify_password(&payload.password, &user.password) {
        info!("Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()).into());
    }

    let token = issue_token(&user, &config.session_secret, config.session_ttl).map_err(|e| {
        error!(error = %e, "Failed to sign session token");
        ApiError::Internal
    })?;

    info!(role = %user.role, "Login successful");

    let mut resp = HttpResponse::Ok();
    for cookie in login_cookies(token, &user, config.session_ttl) {
        resp.cookie(cookie);
    }

    Ok(resp.json(ApiResponse::success(
        "Login successful",
        LoginResponse {
            id: user.id,
            full_name: user.name,
            email: user.email,
            role: user.role,
        },
    )))
}

/// Self-service sign up
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created", body = Object, example = json!({
            "status": "success",
            "message": "User registered successfully",
            "data": {"id": 7, "name": "Tom Customer", "email": "customer@plumbx.com", "role": "customer"}
        })),
        (status = 400, description = "Missing fields, admin role requested or email already registered", body = Object)
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(users, emails, payload))]
pub async fn register(
    payload: web::Json<RegisterReq>,
    users: web::Data<dyn UserStore>,
    emails: web::Data<EmailCache>,
) -> actix_web::Result<HttpResponse> {
    let RegisterReq {
        name,
        email,
        password,
        role,
    } = payload.into_inner();

    let account = Account::from_parts(name, email, password, role)?;

    if account.role == Role::Admin {
        info!("Rejected self-registration as admin");
        return Err(ApiError::BadRequest("Admin accounts cannot be self-registered".into()).into());
    }

    let user = create_account(users.get_ref(), emails.get_ref(), account).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success("User registered successfully", user)))
}

/// Clear the session cookies
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Cookies expired", body = Object, example = json!({
            "status": "success",
            "message": "Logged out successfully",
            "data": null
        }))
    ),
    tag = "Auth"
)]
pub async fn logout() -> HttpResponse {
    let mut resp = HttpResponse::Ok();
    for cookie in logout_cookies() {
        resp.cookie(cookie);
    }

    resp.json(ApiResponse::success("Logged out successfully", ()))
}

/// The session carried by the request cookies
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Signed in", body = Session),
        (status = 401, description = "No valid session", body = Object)
    ),
    tag = "Auth"
)]
pub async fn session(session: Session) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success("Session active", session))
}
