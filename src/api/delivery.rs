//! Delivery routes. Nothing is persisted yet: every handler answers with a
//! fixed envelope, echoing the request body where one is sent.

use actix_web::{HttpResponse, web};
use serde_json::Value;

use crate::models::ApiResponse;

#[utoipa::path(
    get,
    path = "/api/delivery",
    responses(
        (status = 200, description = "Always empty", body = Object, example = json!({
            "status": "success",
            "message": "Get all deliveries endpoint",
            "count": 0,
            "data": []
        }))
    ),
    tag = "Delivery"
)]
pub async fn list_deliveries() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::list("Get all deliveries endpoint", Vec::<Value>::new()))
}

#[utoipa::path(
    get,
    path = "/api/delivery/{id}",
    params(("id" = String, Path, description = "Delivery id")),
    responses((status = 200, description = "Always null data", body = Object)),
    tag = "Delivery"
)]
pub async fn get_delivery(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        format!("Get delivery by ID: {}", path.into_inner()),
        (),
    ))
}

#[utoipa::path(
    post,
    path = "/api/delivery",
    request_body = Object,
    responses((status = 201, description = "Echoes the body", body = Object)),
    tag = "Delivery"
)]
pub async fn create_delivery(body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success("Create delivery endpoint", body.into_inner()))
}

#[utoipa::path(
    put,
    path = "/api/delivery/{id}",
    params(("id" = String, Path, description = "Delivery id")),
    request_body = Object,
    responses((status = 200, description = "Echoes the body", body = Object)),
    tag = "Delivery"
)]
pub async fn update_delivery(path: web::Path<String>, body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        format!("Update delivery with ID: {}", path.into_inner()),
        body.into_inner(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/delivery/{id}",
    params(("id" = String, Path, description = "Delivery id")),
    responses((status = 200, description = "Nothing is removed", body = Object)),
    tag = "Delivery"
)]
pub async fn delete_delivery(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        format!("Delete delivery with ID: {}", path.into_inner()),
        (),
    ))
}

#[utoipa::path(
    put,
    path = "/api/delivery/{id}/assign",
    params(("id" = String, Path, description = "Delivery id")),
    request_body = Object,
    responses((status = 200, description = "Echoes the body", body = Object)),
    tag = "Delivery"
)]
pub async fn assign_driver(path: web::Path<String>, body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        format!("Assign driver to delivery ID: {}", path.into_inner()),
        body.into_inner(),
    ))
}

#[utoipa::path(
    put,
    path = "/api/delivery/{id}/status",
    params(("id" = String, Path, description = "Delivery id")),
    request_body = Object,
    responses((status = 200, description = "Echoes the body", body = Object)),
    tag = "Delivery"
)]
pub async fn update_delivery_status(path: web::Path<String>, body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        format!("Update status for delivery ID: {}", path.into_inner()),
        body.into_inner(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/delivery/driver/{driver_id}",
    params(("driver_id" = String, Path, description = "Driver user id")),
    responses((status = 200, description = "Always empty", body = Object)),
    tag = "Delivery"
)]
pub async fn deliveries_by_driver(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::list(
        format!("Get deliveries for driver ID: {}", path.into_inner()),
        Vec::<Value>::new(),
    ))
}
