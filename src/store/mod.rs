//! Persistence seams.
//!
//! One trait per collection. Handlers receive them as `web::Data<dyn Trait>`
//! so the same routes run against MySQL in production and against
//! [`MemoryStore`] in development (`DATABASE_URL=memory://`) and tests.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use derive_more::Display;
use serde::Serialize;
use sqlx::MySqlPool;

use crate::model::{
    attendance::{Attendance, NewAttendance},
    employee::{Employee, EmployeePatch, NewEmployee},
    inventory::{Category, CategoryStats, InventoryItem, ItemPatch, NewItem},
    leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest},
    user::{NewUser, User, UserPatch},
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A unique key is already taken; the message names it.
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "{}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<InventoryItem>>;
    async fn get(&self, id: u64) -> StoreResult<Option<InventoryItem>>;
    async fn by_category(&self, category: Category) -> StoreResult<Vec<InventoryItem>>;
    /// Items at or below their reorder point, lowest quantity first.
    async fn low_stock(&self) -> StoreResult<Vec<InventoryItem>>;
    /// Per-category totals ordered by category name.
    async fn category_stats(&self) -> StoreResult<Vec<CategoryStats>>;
    async fn sku_exists(&self, sku: &str) -> StoreResult<bool>;
    async fn insert(&self, item: NewItem) -> StoreResult<InventoryItem>;
    async fn update(&self, id: u64, patch: ItemPatch) -> StoreResult<Option<InventoryItem>>;
    async fn delete(&self, id: u64) -> StoreResult<bool>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Employee>>;
    async fn get(&self, id: u64) -> StoreResult<Option<Employee>>;
    async fn insert(&self, employee: NewEmployee) -> StoreResult<Employee>;
    async fn update(&self, id: u64, patch: EmployeePatch) -> StoreResult<Option<Employee>>;
    async fn delete(&self, id: u64) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn get(&self, id: u64) -> StoreResult<Option<User>>;
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn emails(&self) -> StoreResult<Vec<String>>;
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    async fn update(&self, id: u64, patch: UserPatch) -> StoreResult<Option<User>>;
    async fn delete(&self, id: u64) -> StoreResult<bool>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn record(&self, attendance: NewAttendance) -> StoreResult<Attendance>;
    /// Newest date first.
    async fn for_employee(&self, employee: u64) -> StoreResult<Vec<Attendance>>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn insert(&self, request: NewLeaveRequest) -> StoreResult<LeaveRequest>;
    /// Newest first.
    async fn for_employee(&self, employee: u64) -> StoreResult<Vec<LeaveRequest>>;
    async fn set_status(
        &self,
        id: u64,
        status: LeaveStatus,
        approved_by: Option<u64>,
    ) -> StoreResult<Option<LeaveRequest>>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub enum ConnectionState {
    Disconnected = 0,
    Connected = 1,
}

impl ConnectionState {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connected => "Connected",
        }
    }
}

#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    /// Short name of the backend, e.g. "MySQL".
    fn backend(&self) -> &'static str;
    async fn state(&self) -> ConnectionState;
}

/// Every store the application needs, backed by one implementation.
#[derive(Clone)]
pub struct Stores {
    pub inventory: Arc<dyn InventoryStore>,
    pub employees: Arc<dyn EmployeeStore>,
    pub users: Arc<dyn UserStore>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub leave: Arc<dyn LeaveStore>,
    pub probe: Arc<dyn ConnectionProbe>,
}

impl Stores {
    pub fn memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::default()))
    }

    pub fn mysql(pool: MySqlPool) -> Self {
        Self::from_backend(Arc::new(MySqlStore::new(pool)))
    }

    fn from_backend<S>(store: Arc<S>) -> Self
    where
        S: InventoryStore
            + EmployeeStore
            + UserStore
            + AttendanceStore
            + LeaveStore
            + ConnectionProbe
            + 'static,
    {
        Self {
            inventory: store.clone(),
            employees: store.clone(),
            users: store.clone(),
            attendance: store.clone(),
            leave: store.clone(),
            probe: store,
        }
    }

    /// Exposes each store to handlers as `web::Data<dyn Trait>`.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::from(self.inventory.clone()))
            .app_data(web::Data::from(self.employees.clone()))
            .app_data(web::Data::from(self.users.clone()))
            .app_data(web::Data::from(self.attendance.clone()))
            .app_data(web::Data::from(self.leave.clone()))
            .app_data(web::Data::from(self.probe.clone()));
    }
}
