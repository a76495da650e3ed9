use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Default `reorderPoint` for items created without one.
pub const DEFAULT_REORDER_POINT: u32 = 10;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    Tools,
    Pipes,
    Fittings,
    Valves,
    Pvc,
    Fixtures,
    Sealants,
    Safety,
    Others,
}

impl TryFrom<String> for Category {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "sku": "SKU-7Q2K9ZX0A",
    "itemName": "PVC Pipe 1/2\"",
    "category": "pvc",
    "quantity": 120,
    "price": 3.5,
    "size": "1/2\"",
    "material": "PVC",
    "reorderPoint": 10,
    "lastUpdated": "2026-01-01T00:00:00Z"
}))]
pub struct InventoryItem {
    pub id: u64,
    pub sku: String,
    pub item_name: String,
    #[sqlx(try_from = "String")]
    pub category: Category,
    pub description: Option<String>,
    pub quantity: u32,
    pub price: f64,
    pub size: Option<String>,
    pub material: Option<String>,
    pub supplier: Option<String>,
    pub reorder_point: u32,
    pub location: Option<String>,
    pub image_url: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub last_updated: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn total_value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_point
    }
}

/// A validated item ready to insert; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub sku: String,
    pub item_name: String,
    pub category: Category,
    pub description: Option<String>,
    pub quantity: u32,
    pub price: f64,
    pub size: Option<String>,
    pub material: Option<String>,
    pub supplier: Option<String>,
    pub reorder_point: u32,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub sku: Option<String>,
    pub item_name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub price: Option<f64>,
    pub size: Option<String>,
    pub material: Option<String>,
    pub supplier: Option<String>,
    pub reorder_point: Option<u32>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

impl ItemPatch {
    pub fn apply(self, item: &mut InventoryItem) {
        if let Some(v) = self.sku {
            item.sku = v;
        }
        if let Some(v) = self.item_name {
            item.item_name = v;
        }
        if let Some(v) = self.category {
            item.category = v;
        }
        if let Some(v) = self.description {
            item.description = Some(v);
        }
        if let Some(v) = self.quantity {
            item.quantity = v;
        }
        if let Some(v) = self.price {
            item.price = v;
        }
        if let Some(v) = self.size {
            item.size = Some(v);
        }
        if let Some(v) = self.material {
            item.material = Some(v);
        }
        if let Some(v) = self.supplier {
            item.supplier = Some(v);
        }
        if let Some(v) = self.reorder_point {
            item.reorder_point = v;
        }
        if let Some(v) = self.location {
            item.location = Some(v);
        }
        if let Some(v) = self.image_url {
            item.image_url = Some(v);
        }
    }
}

/// One row of the category report.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "pipes",
    "inStock": 340,
    "totalValue": 1875.5,
    "itemCount": 4,
    "image": "/image/pipes.jpg",
    "link": "/inventory/category/pipes"
}))]
pub struct CategoryStats {
    pub name: String,
    pub in_stock: u64,
    pub total_value: f64,
    pub item_count: u64,
    pub image: String,
    pub link: String,
}

impl CategoryStats {
    pub fn new(name: &str, item_count: u64, in_stock: u64, total_value: f64) -> Self {
        let slug = name.to_lowercase();
        Self {
            name: name.to_string(),
            in_stock,
            total_value,
            item_count,
            image: format!("/image/{slug}.jpg"),
            link: format!("/inventory/category/{slug}"),
        }
    }
}
