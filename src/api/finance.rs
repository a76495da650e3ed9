//! Finance routes. Invoices and salary records are not stored yet; the
//! handlers return fixed envelopes and the report is all zeros.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::ApiResponse;

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Revenue {
    pub total: f64,
    #[schema(value_type = Vec<Object>)]
    pub monthly: Vec<Value>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Expenses {
    pub total: f64,
    #[schema(value_type = Vec<Object>)]
    pub categories: Vec<Value>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct FinancialReport {
    pub revenue: Revenue,
    pub expenses: Expenses,
    pub profit: f64,
}

#[utoipa::path(
    get,
    path = "/api/finance/invoices",
    responses((status = 200, description = "Always empty", body = Object)),
    tag = "Finance"
)]
pub async fn list_invoices() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::list("Get all invoices endpoint", Vec::<Value>::new()))
}

#[utoipa::path(
    get,
    path = "/api/finance/invoices/{id}",
    params(("id" = String, Path, description = "Invoice id")),
    responses((status = 200, description = "Always null data", body = Object)),
    tag = "Finance"
)]
pub async fn get_invoice(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        format!("Get invoice by ID: {}", path.into_inner()),
        (),
    ))
}

#[utoipa::path(
    post,
    path = "/api/finance/invoices",
    request_body = Object,
    responses((status = 201, description = "Echoes the body", body = Object)),
    tag = "Finance"
)]
pub async fn create_invoice(body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success("Create invoice endpoint", body.into_inner()))
}

#[utoipa::path(
    put,
    path = "/api/finance/invoices/{id}",
    params(("id" = String, Path, description = "Invoice id")),
    request_body = Object,
    responses((status = 200, description = "Echoes the body", body = Object)),
    tag = "Finance"
)]
pub async fn update_invoice(path: web::Path<String>, body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        format!("Update invoice with ID: {}", path.into_inner()),
        body.into_inner(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/finance/invoices/{id}",
    params(("id" = String, Path, description = "Invoice id")),
    responses((status = 200, description = "Nothing is removed", body = Object)),
    tag = "Finance"
)]
pub async fn delete_invoice(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        format!("Delete invoice with ID: {}", path.into_inner()),
        (),
    ))
}

#[utoipa::path(
    get,
    path = "/api/finance/salary",
    responses((status = 200, description = "Always empty", body = Object)),
    tag = "Finance"
)]
pub async fn list_salaries() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::list(
        "Get all salary records endpoint",
        Vec::<Value>::new(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/finance/salary/{id}",
    params(("id" = String, Path, description = "Salary record id")),
    responses((status = 200, description = "Always null data", body = Object)),
    tag = "Finance"
)]
pub async fn get_salary(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        format!("Get salary record by ID: {}", path.into_inner()),
        (),
    ))
}

#[utoipa::path(
    post,
    path = "/api/finance/salary",
    request_body = Object,
    responses((status = 201, description = "Echoes the body", body = Object)),
    tag = "Finance"
)]
pub async fn create_salary(body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success(
        "Create salary record endpoint",
        body.into_inner(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/finance/reports",
    responses((status = 200, description = "Zeroed report", body = FinancialReport)),
    tag = "Finance"
)]
pub async fn financial_reports() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        "Get financial reports endpoint",
        FinancialReport::default(),
    ))
}
