//! Fixtures shared by the unit tests.

use actix_web::{cookie::Cookie, dev::ServiceResponse, test};
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::{
    auth::{
        password::hash_password,
        session::{ROLE_COOKIE, TOKEN_COOKIE, issue_token},
    },
    config::{Config, test_config},
    model::{
        employee::{EmployeeStatus, NewEmployee},
        inventory::{Category, DEFAULT_REORDER_POINT, InventoryItem, NewItem},
        role::Role,
        user::{NewUser, User},
    },
    routes::AppState,
    store::Stores,
    utils::{email_cache::EmailCache, sku::insert_with_unique_sku},
};

/// Same secret as [`test_config`].
pub const SECRET: &str = "test-secret-0123456789abcdef";

pub fn user(id: u64, role: Role) -> User {
    let now = Utc::now();
    User {
        id,
        name: format!("{role} user"),
        email: format!("{role}{id}@plumbx.com"),
        password: String::new(),
        role,
        created_at: now,
        updated_at: now,
    }
}

pub fn new_item(name: &str, category: Category) -> NewItem {
    NewItem {
        sku: String::new(),
        item_name: name.to_string(),
        category,
        description: None,
        quantity: 1,
        price: 1.0,
        size: None,
        material: None,
        supplier: None,
        reorder_point: DEFAULT_REORDER_POINT,
        location: None,
        image_url: None,
    }
}

pub fn item(id: u64, category: Category, quantity: u32, price: f64) -> InventoryItem {
    let now = Utc::now();
    InventoryItem {
        id,
        sku: format!("SKU-TEST{id:05}"),
        item_name: format!("item {id}"),
        category,
        description: None,
        quantity,
        price,
        size: None,
        material: None,
        supplier: None,
        reorder_point: DEFAULT_REORDER_POINT,
        location: None,
        image_url: None,
        last_updated: now,
        created_at: now,
        updated_at: now,
    }
}

/// Adds a valid `token` and `role` cookie pair for `role`.
pub fn signed_in(req: test::TestRequest, role: Role) -> test::TestRequest {
    let token = issue_token(&user(1, role), SECRET, 3600).unwrap();
    req.cookie(Cookie::new(TOKEN_COOKIE, token))
        .cookie(Cookie::new(ROLE_COOKIE, role.to_string()))
}

pub async fn json_body(resp: ServiceResponse) -> Value {
    test::read_body_json(resp).await
}

/// Application state over a fresh in-memory store.
pub struct TestApp {
    pub state: AppState,
    pub emails: EmailCache,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::new(config, Stores::memory()).unwrap();
        let emails = state.emails.clone();
        Self { state, emails }
    }

    pub async fn seed_user(&self, email: &str, password: &str, role: Role) -> User {
        let user = self
            .state
            .stores
            .users
            .insert(NewUser {
                name: format!("{role} user"),
                email: email.to_string(),
                password: hash_password(password).unwrap(),
                role,
            })
            .await
            .unwrap();
        self.emails.mark_taken(&user.email).await;
        user
    }

    pub async fn seed_item(&self, name: &str, category: Category, quantity: u32, price: f64) -> u64 {
        let mut item = new_item(name, category);
        item.quantity = quantity;
        item.price = price;

        insert_with_unique_sku(self.state.stores.inventory.as_ref(), item)
            .await
            .unwrap()
            .id
    }

    pub async fn seed_employee(&self, email: &str) -> u64 {
        self.state
            .stores
            .employees
            .insert(NewEmployee {
                full_name: "Seeded Employee".into(),
                email: email.to_string(),
                phone: "+94770000000".into(),
                department: "Operations".into(),
                position: "Clerk".into(),
                salary: 50_000.0,
                joining_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                is_full_time: true,
                status: EmployeeStatus::Active,
            })
            .await
            .unwrap()
            .id
    }
}

/// Initializes the full app, page gate included, over a [`TestApp`].
macro_rules! test_service {
    ($app:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::from_fn(
                    crate::auth::middleware::page_gate,
                ))
                .configure(|cfg| crate::routes::configure(cfg, &$app.state)),
        )
        .await
    };
}

pub(crate) use test_service;
