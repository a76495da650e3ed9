use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    api::{MissingFields, check_email, non_blank},
    auth::password::hash_password,
    error::ApiError,
    model::{
        role::Role,
        user::{NewUser, User, UserPatch},
    },
    models::ApiResponse,
    store::UserStore,
    utils::email_cache::EmailCache,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "John Inventory")]
    pub name: Option<String>,
    #[schema(example = "inventory@plumbx.com")]
    pub email: Option<String>,
    #[schema(example = "123456")]
    pub password: Option<String>,
    /// Defaults to `customer`.
    #[schema(example = "inventory")]
    pub role: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(example = "finance")]
    pub role: Option<String>,
}

/// A validated account ready to be hashed and stored.
pub(crate) struct Account {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Account {
    /// Checks required fields and shapes; the role defaults to customer.
    pub fn from_parts(
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
        role: Option<String>,
    ) -> Result<Self, ApiError> {
        let mut missing = MissingFields::default();
        let name = missing.take_text("name", name);
        let email = missing.take_text("email", email);
        let password = missing.take("password", password.filter(|p| !p.is_empty()));

        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(missing.into_error());
        };

        check_email(&email)?;
        check_password(&password)?;

        let role = match non_blank(role) {
            Some(raw) => parse_role(&raw)?,
            None => Role::Customer,
        };

        Ok(Self {
            name,
            email,
            password,
            role,
        })
    }
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("{raw} is not a valid role")))
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn hash(password: &str) -> Result<String, ApiError> {
    hash_password(password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::Internal
    })
}

/// Stores a new account, keeping the taken-email cache in step.
pub(crate) async fn create_account(
    users: &dyn UserStore,
    emails: &EmailCache,
    account: Account,
) -> Result<User, ApiError> {
    if emails.is_taken(&account.email).await {
        return Err(ApiError::BadRequest("Email already registered".into()));
    }

    let user = users
        .insert(NewUser {
            name: account.name,
            email: account.email,
            password: hash(&account.password)?,
            role: account.role,
        })
        .await?;

    emails.mark_taken(&user.email).await;
    info!(user_id = user.id, role = %user.role, "Account created");

    Ok(user)
}

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All user accounts", body = Object, example = json!({
            "status": "success",
            "message": "Users retrieved successfully",
            "count": 1,
            "data": [{"id": 1, "name": "John Inventory", "email": "inventory@plumbx.com", "role": "inventory"}]
        })),
        (status = 403, description = "Admin only", body = Object)
    ),
    tag = "User"
)]
pub async fn list_users(users: web::Data<dyn UserStore>) -> actix_web::Result<HttpResponse> {
    let users = users.list().await.map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(ApiResponse::list("Users retrieved successfully", users)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = Object)
    ),
    tag = "User"
)]
pub async fn get_user(
    users: web::Data<dyn UserStore>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let user = users
        .get(path.into_inner())
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("User retrieved successfully", user)))
}

/// Create a user with any role
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing fields or email already registered", body = Object, example = json!({
            "status": "error",
            "message": "Required fields missing: name, email, password"
        }))
    ),
    tag = "User"
)]
pub async fn create_user(
    users: web::Data<dyn UserStore>,
    emails: web::Data<EmailCache>,
    payload: web::Json<CreateUser>,
) -> actix_web::Result<HttpResponse> {
    let CreateUser {
        name,
        email,
        password,
        role,
    } = payload.into_inner();

    let account = Account::from_parts(name, email, password, role)?;
    let user = create_account(users.get_ref(), emails.get_ref(), account).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success("User created successfully", user)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "User id")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid field or email already registered", body = Object),
        (status = 404, description = "User not found", body = Object)
    ),
    tag = "User"
)]
pub async fn update_user(
    users: web::Data<dyn UserStore>,
    emails: web::Data<EmailCache>,
    path: web::Path<u64>,
    payload: web::Json<UpdateUser>,
) -> actix_web::Result<HttpResponse> {
    let id = path.into_inner();
    let UpdateUser {
        name,
        email,
        password,
        role,
    } = payload.into_inner();

    let email = non_blank(email);
    if let Some(email) = &email {
        check_email(email)?;
    }

    let password = match password {
        Some(password) => {
            check_password(&password)?;
            Some(hash(&password)?)
        }
        None => None,
    };

    let patch = UserPatch {
        name: non_blank(name),
        email: email.clone(),
        password,
        role: non_blank(role).map(|r| parse_role(&r)).transpose()?,
    };

    let previous = users
        .get(id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let user = users
        .update(id, patch)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User"))?;

    if email.is_some() && !previous.email.eq_ignore_ascii_case(&user.email) {
        emails.forget(&previous.email).await;
        emails.mark_taken(&user.email).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("User updated successfully", user)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = Object, example = json!({
            "status": "success",
            "message": "User deleted successfully",
            "data": null
        })),
        (status = 404, description = "User not found", body = Object)
    ),
    tag = "User"
)]
pub async fn delete_user(
    users: web::Data<dyn UserStore>,
    emails: web::Data<EmailCache>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let id = path.into_inner();

    let Some(user) = users.get(id).await.map_err(ApiError::from)? else {
        return Err(ApiError::not_found("User").into());
    };

    if !users.delete(id).await.map_err(ApiError::from)? {
        return Err(ApiError::not_found("User").into());
    }

    emails.forget(&user.email).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success("User deleted successfully", ())))
}
