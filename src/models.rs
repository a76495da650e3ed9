use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            count: None,
            data,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn list(message: impl Into<String>, data: Vec<T>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            count: Some(data.len()),
            data,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Tom Customer")]
    pub name: Option<String>,
    #[schema(example = "customer@plumbx.com")]
    pub email: Option<String>,
    #[schema(example = "123456")]
    pub password: Option<String>,
    /// Defaults to `customer`; `admin` is refused.
    #[schema(example = "customer")]
    pub role: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "inventory@plumbx.com")]
    pub email: String,
    #[schema(example = "123456")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: u64,
    #[schema(example = "John Inventory")]
    pub full_name: String,
    pub email: String,
    #[schema(example = "inventory", value_type = String)]
    pub role: Role,
}

/// Payload of the signed `token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// user email
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}
