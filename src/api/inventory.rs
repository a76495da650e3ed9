use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::{
    api::{MissingFields, non_blank},
    error::ApiError,
    auth::session::Session,
    model::inventory::{Category, DEFAULT_REORDER_POINT, InventoryItem, ItemPatch, NewItem},
    models::ApiResponse,
    store::InventoryStore,
    utils::sku::insert_with_unique_sku,
};

/// Body of create and update. On create `itemName`, `category`, `quantity`
/// and `price` are required; on update every field is optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    /// Generated when absent.
    #[schema(example = "SKU-7Q2K9ZX0A")]
    pub sku: Option<String>,
    #[schema(example = "Copper Pipe 3/4\"")]
    pub item_name: Option<String>,
    #[schema(example = "pipes")]
    pub category: Option<String>,
    pub description: Option<String>,
    #[schema(example = 40)]
    pub quantity: Option<i64>,
    #[schema(example = 12.75)]
    pub price: Option<f64>,
    #[schema(example = "3/4\"")]
    pub size: Option<String>,
    #[schema(example = "Copper")]
    pub material: Option<String>,
    pub supplier: Option<String>,
    #[schema(example = 10)]
    pub reorder_point: Option<i64>,
    pub location: Option<String>,
    #[schema(example = "https://cdn.plumbx.com/items/copper-pipe.jpg")]
    pub image_url: Option<String>,
}

/// An item of the category listing, with its stock value.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuedItem {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub total_value: f64,
}

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{raw} is not a valid category")))
}

fn count(field: &str, value: i64) -> Result<u32, ApiError> {
    u32::try_from(value)
        .map_err(|_| ApiError::BadRequest(format!("{field} must be a non-negative whole number")))
}

fn price(value: f64) -> Result<f64, ApiError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ApiError::BadRequest("price must be a non-negative number".into()))
    }
}

/// `http(s)://` followed by anything but spaces and double quotes.
fn image_url(value: String) -> Result<String, ApiError> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));

    match rest {
        Some(rest) if !rest.is_empty() && !rest.contains([' ', '"']) => Ok(value),
        _ => Err(ApiError::BadRequest(format!("{value} is not a valid URL"))),
    }
}

/// Validates every supplied field; absent fields stay `None`.
fn to_patch(payload: ItemPayload) -> Result<ItemPatch, ApiError> {
    Ok(ItemPatch {
        sku: non_blank(payload.sku),
        item_name: non_blank(payload.item_name),
        category: non_blank(payload.category)
            .map(|c| parse_category(&c))
            .transpose()?,
        description: payload.description,
        quantity: payload.quantity.map(|q| count("quantity", q)).transpose()?,
        price: payload.price.map(price).transpose()?,
        size: non_blank(payload.size),
        material: non_blank(payload.material),
        supplier: payload.supplier,
        reorder_point: payload
            .reorder_point
            .map(|r| count("reorderPoint", r))
            .transpose()?,
        location: payload.location,
        image_url: non_blank(payload.image_url).map(image_url).transpose()?,
    })
}

/// List inventory items
#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "All inventory items", body = Object, example = json!({
            "status": "success",
            "message": "Items retrieved successfully",
            "count": 1,
            "data": [{"id": 1, "sku": "SKU-7Q2K9ZX0A", "itemName": "PVC Pipe 1/2\"", "category": "pvc", "quantity": 120, "price": 3.5}]
        }))
    ),
    tag = "Inventory"
)]
pub async fn list_items(store: web::Data<dyn InventoryStore>) -> actix_web::Result<HttpResponse> {
    let items = store.list().await.map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(ApiResponse::list("Items retrieved successfully", items)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(("id" = u64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item found", body = InventoryItem),
        (status = 404, description = "Item not found", body = Object, example = json!({
            "status": "error",
            "message": "Item not found"
        }))
    ),
    tag = "Inventory"
)]
pub async fn get_item(
    store: web::Data<dyn InventoryStore>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let item = store
        .get(path.into_inner())
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Item"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Item retrieved successfully", item)))
}

/// Create an inventory item
///
/// The SKU is generated unless the body carries one.
#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = ItemPayload,
    responses(
        (status = 201, description = "Item created", body = InventoryItem),
        (status = 400, description = "Missing or invalid fields, or SKU taken", body = Object, example = json!({
            "status": "error",
            "message": "Required fields missing: itemName, category, quantity, price"
        }))
    ),
    tag = "Inventory"
)]
pub async fn create_item(
    session: Session,
    store: web::Data<dyn InventoryStore>,
    payload: web::Json<ItemPayload>,
) -> actix_web::Result<HttpResponse> {
    let ItemPatch {
        sku,
        item_name,
        category,
        description,
        quantity,
        price,
        size,
        material,
        supplier,
        reorder_point,
        location,
        image_url,
    } = to_patch(payload.into_inner())?;

    let mut missing = MissingFields::default();
    let item_name = missing.take("itemName", item_name);
    let category = missing.take("category", category);
    let quantity = missing.take("quantity", quantity);
    let price = missing.take("price", price);

    let (Some(item_name), Some(category), Some(quantity), Some(price)) =
        (item_name, category, quantity, price)
    else {
        return Err(missing.into_error().into());
    };

    let item = NewItem {
        sku: sku.clone().unwrap_or_default(),
        item_name,
        category,
        description,
        quantity,
        price,
        size,
        material,
        supplier,
        reorder_point: reorder_point.unwrap_or(DEFAULT_REORDER_POINT),
        location,
        image_url,
    };

    let saved = match sku {
        Some(_) => store.insert(item).await,
        None => insert_with_unique_sku(store.get_ref(), item).await,
    }
    .map_err(ApiError::from)?;

    info!(item_id = saved.id, sku = %saved.sku, by = %session.email, "Inventory item created");

    Ok(HttpResponse::Created().json(ApiResponse::success("Item created successfully", saved)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    params(("id" = u64, Path, description = "Item id")),
    request_body = ItemPayload,
    responses(
        (status = 200, description = "Item updated; lastUpdated is refreshed", body = InventoryItem),
        (status = 400, description = "Invalid field or SKU taken", body = Object),
        (status = 404, description = "Item not found", body = Object)
    ),
    tag = "Inventory"
)]
pub async fn update_item(
    store: web::Data<dyn InventoryStore>,
    path: web::Path<u64>,
    payload: web::Json<ItemPayload>,
) -> actix_web::Result<HttpResponse> {
    let patch = to_patch(payload.into_inner())?;

    let item = store
        .update(path.into_inner(), patch)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Item"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Item updated successfully", item)))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    params(("id" = u64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = Object, example = json!({
            "status": "success",
            "message": "Item deleted successfully",
            "data": null
        })),
        (status = 404, description = "Item not found", body = Object)
    ),
    tag = "Inventory"
)]
pub async fn delete_item(
    session: Session,
    store: web::Data<dyn InventoryStore>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let id = path.into_inner();

    if !store.delete(id).await.map_err(ApiError::from)? {
        return Err(ApiError::not_found("Item").into());
    }

    info!(item_id = id, by = %session.email, "Inventory item deleted");

    Ok(HttpResponse::Ok().json(ApiResponse::success("Item deleted successfully", ())))
}

/// Per-category stock report
#[utoipa::path(
    get,
    path = "/api/inventory/categories",
    responses(
        (status = 200, description = "One row per category that has items, ordered by name", body = [crate::model::inventory::CategoryStats])
    ),
    tag = "Inventory"
)]
pub async fn category_stats(
    store: web::Data<dyn InventoryStore>,
) -> actix_web::Result<HttpResponse> {
    let stats = store.category_stats().await.map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(
        "Category statistics retrieved successfully",
        stats,
    )))
}

/// Items of one category with their stock value
#[utoipa::path(
    get,
    path = "/api/inventory/category/{category}",
    params(("category" = String, Path, description = "Category name, any case", example = "pipes")),
    responses(
        (status = 200, description = "Items of the category; empty for unknown categories", body = [ValuedItem])
    ),
    tag = "Inventory"
)]
pub async fn items_by_category(
    store: web::Data<dyn InventoryStore>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    let name = path.into_inner().to_lowercase();

    let items = match name.parse::<Category>() {
        Ok(category) => store.by_category(category).await.map_err(ApiError::from)?,
        Err(_) => {
            debug!(category = %name, "Unknown category requested");
            Vec::new()
        }
    };

    let items: Vec<_> = items
        .into_iter()
        .map(|item| ValuedItem {
            total_value: item.total_value(),
            item,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::list(
        format!("Items in {name} retrieved successfully"),
        items,
    )))
}

/// Items at or below their reorder point
#[utoipa::path(
    get,
    path = "/api/inventory/alerts/low-stock",
    responses(
        (status = 200, description = "Low stock items, lowest quantity first", body = [InventoryItem])
    ),
    tag = "Inventory"
)]
pub async fn low_stock_alerts(
    store: web::Data<dyn InventoryStore>,
) -> actix_web::Result<HttpResponse> {
    let items = store.low_stock().await.map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(ApiResponse::list("Low stock items retrieved successfully", items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::test_support::{TestApp, json_body, signed_in, test_service};
    use actix_web::{http::StatusCode, test};
    use serde_json::json;

    #[actix_web::test]
    async fn create_requires_the_four_core_fields() {
        let app = TestApp::new();
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::post(), Role::Inventory)
            .uri("/api/inventory")
            .set_json(json!({"itemName": "Ball Valve", "price": 8.0}))
            .to_request();
        let resp = test::call_service(&svc, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(resp).await["message"],
            "Required fields missing: category, quantity"
        );
    }

    #[actix_web::test]
    async fn created_items_are_immediately_retrievable() {
        let app = TestApp::new();
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::post(), Role::Inventory)
            .uri("/api/inventory")
            .set_json(json!({"itemName": "Ball Valve", "category": "Valves", "quantity": 5, "price": 8.0}))
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created = json_body(resp).await["data"].clone();
        assert!(created["sku"].as_str().unwrap().starts_with("SKU-"));
        assert_eq!(created["category"], "valves");
        assert_eq!(created["reorderPoint"], DEFAULT_REORDER_POINT);

        let req = signed_in(test::TestRequest::get(), Role::Inventory)
            .uri(&format!("/api/inventory/{}", created["id"]))
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["data"], created);
    }

    #[actix_web::test]
    async fn delete_removes_and_then_reports_missing() {
        let app = TestApp::new();
        let id = app.seed_item("Teflon Tape", Category::Sealants, 50, 1.25).await;
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::delete(), Role::Inventory)
            .uri("/api/inventory/999")
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::NOT_FOUND);

        let req = signed_in(test::TestRequest::delete(), Role::Inventory)
            .uri(&format!("/api/inventory/{id}"))
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["message"], "Item deleted successfully");

        let req = signed_in(test::TestRequest::get(), Role::Inventory)
            .uri(&format!("/api/inventory/{id}"))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn bad_ids_and_bodies_are_client_errors() {
        let app = TestApp::new();
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::get(), Role::Inventory)
            .uri("/api/inventory/not-a-number")
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::NOT_FOUND);

        let req = signed_in(test::TestRequest::post(), Role::Inventory)
            .uri("/api/inventory")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"itemName\": ")
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["status"], "error");

        let req = signed_in(test::TestRequest::post(), Role::Inventory)
            .uri("/api/inventory")
            .set_json(json!({"itemName": "Wrench", "category": "hammers", "quantity": 1, "price": 9.0}))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::BAD_REQUEST);

        let req = signed_in(test::TestRequest::post(), Role::Inventory)
            .uri("/api/inventory")
            .set_json(json!({"itemName": "Wrench", "category": "tools", "quantity": -1, "price": 9.0}))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn update_is_partial() {
        let app = TestApp::new();
        let id = app.seed_item("Pipe Wrench", Category::Tools, 7, 24.0).await;
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::put(), Role::Inventory)
            .uri(&format!("/api/inventory/{id}"))
            .set_json(json!({"quantity": 3}))
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let data = json_body(resp).await["data"].clone();
        assert_eq!(data["quantity"], 3);
        assert_eq!(data["itemName"], "Pipe Wrench");
        assert_eq!(data["price"], 24.0);

        let req = signed_in(test::TestRequest::put(), Role::Inventory)
            .uri("/api/inventory/4242")
            .set_json(json!({"quantity": 3}))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::NOT_FOUND);

        let req = signed_in(test::TestRequest::put(), Role::Inventory)
            .uri(&format!("/api/inventory/{id}"))
            .set_json(json!({"imageUrl": "ftp://files/wrench.png"}))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn reports_cover_categories_and_low_stock() {
        let app = TestApp::new();
        app.seed_item("Copper Pipe", Category::Pipes, 10, 2.0).await;
        app.seed_item("PEX Pipe", Category::Pipes, 4, 5.0).await;
        app.seed_item("Gloves", Category::Safety, 30, 1.0).await;
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::get(), Role::Inventory)
            .uri("/api/inventory/categories")
            .to_request();
        let body = json_body(test::call_service(&svc, req).await).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["name"], "pipes");
        assert_eq!(body["data"][0]["inStock"], 14);
        assert_eq!(body["data"][0]["totalValue"], 40.0);
        assert_eq!(body["data"][0]["link"], "/inventory/category/pipes");
        assert_eq!(body["data"][1]["name"], "safety");

        let req = signed_in(test::TestRequest::get(), Role::Inventory)
            .uri("/api/inventory/category/PIPES")
            .to_request();
        let body = json_body(test::call_service(&svc, req).await).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][1]["totalValue"], 20.0);

        let req = signed_in(test::TestRequest::get(), Role::Inventory)
            .uri("/api/inventory/category/unicorns")
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["count"], 0);

        let req = signed_in(test::TestRequest::get(), Role::Inventory)
            .uri("/api/inventory/alerts/low-stock")
            .to_request();
        let body = json_body(test::call_service(&svc, req).await).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["itemName"], "PEX Pipe");
        assert_eq!(body["data"][1]["itemName"], "Copper Pipe");
    }

    #[actix_web::test]
    async fn customers_may_browse_but_not_write() {
        let app = TestApp::new();
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::get(), Role::Customer)
            .uri("/api/inventory")
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::OK);

        let req = signed_in(test::TestRequest::post(), Role::Customer)
            .uri("/api/inventory")
            .set_json(json!({"itemName": "Hack", "category": "tools", "quantity": 1, "price": 1.0}))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/api/inventory").to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
