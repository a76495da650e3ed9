use async_trait::async_trait;
use chrono::Utc;
use futures_util::StreamExt;
use sqlx::MySqlPool;
use tracing::{debug, warn};

use super::{
    AttendanceStore, ConnectionProbe, ConnectionState, EmployeeStore, InventoryStore, LeaveStore,
    StoreError, StoreResult, UserStore,
};
use crate::model::{
    attendance::{Attendance, NewAttendance},
    employee::{Employee, EmployeePatch, NewEmployee},
    inventory::{Category, CategoryStats, InventoryItem, ItemPatch, NewItem},
    leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest},
    user::{NewUser, User, UserPatch},
};
use crate::utils::db_utils::SqlUpdate;

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Duplicate keys become a `Conflict` carrying `message`.
fn conflict_or_backend(e: sqlx::Error, message: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(message.to_string());
        }
    }
    db_error(e)
}

fn vanished(table: &str, id: u64) -> StoreError {
    StoreError::Backend(format!("row {id} in {table} missing right after insert"))
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    name: String,
    item_count: i64,
    in_stock: i64,
    total_value: f64,
}

#[async_trait]
impl InventoryStore for MySqlStore {
    async fn list(&self) -> StoreResult<Vec<InventoryItem>> {
        sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn get(&self, id: u64) -> StoreResult<Option<InventoryItem>> {
        sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn by_category(&self, category: Category) -> StoreResult<Vec<InventoryItem>> {
        sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE category = ? ORDER BY id",
        )
        .bind(category.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn low_stock(&self) -> StoreResult<Vec<InventoryItem>> {
        sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT * FROM inventory_items
            WHERE quantity <= reorder_point
            ORDER BY quantity, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn category_stats(&self) -> StoreResult<Vec<CategoryStats>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT
                category AS name,
                COUNT(*) AS item_count,
                CAST(SUM(quantity) AS SIGNED) AS in_stock,
                SUM(price * quantity) AS total_value
            FROM inventory_items
            GROUP BY category
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                CategoryStats::new(
                    &row.name,
                    row.item_count.max(0) as u64,
                    row.in_stock.max(0) as u64,
                    row.total_value,
                )
            })
            .collect())
    }

    async fn sku_exists(&self, sku: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM inventory_items WHERE sku = ? LIMIT 1)",
        )
        .bind(sku)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(exists > 0)
    }

    async fn insert(&self, item: NewItem) -> StoreResult<InventoryItem> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO inventory_items
            (sku, item_name, category, description, quantity, price, size, material,
             supplier, reorder_point, location, image_url, last_updated, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.sku)
        .bind(&item.item_name)
        .bind(item.category.to_string())
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.price)
        .bind(&item.size)
        .bind(&item.material)
        .bind(&item.supplier)
        .bind(item.reorder_point)
        .bind(&item.location)
        .bind(&item.image_url)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_backend(e, "SKU already exists"))?;

        let id = result.last_insert_id();
        debug!(id, sku = %item.sku, "Inventory item inserted");
        InventoryStore::get(self, id)
            .await?
            .ok_or_else(|| vanished("inventory_items", id))
    }

    async fn update(&self, id: u64, patch: ItemPatch) -> StoreResult<Option<InventoryItem>> {
        let now = Utc::now();
        let mut update = SqlUpdate::new("inventory_items");
        update
            .set_opt("sku", patch.sku)
            .set_opt("item_name", patch.item_name)
            .set_opt("category", patch.category.map(|c| c.to_string()))
            .set_opt("description", patch.description)
            .set_opt("quantity", patch.quantity)
            .set_opt("price", patch.price)
            .set_opt("size", patch.size)
            .set_opt("material", patch.material)
            .set_opt("supplier", patch.supplier)
            .set_opt("reorder_point", patch.reorder_point)
            .set_opt("location", patch.location)
            .set_opt("image_url", patch.image_url)
            .set("last_updated", now)
            .set("updated_at", now);

        update
            .execute(&self.pool, "id", id)
            .await
            .map_err(|e| conflict_or_backend(e, "SKU already exists"))?;

        InventoryStore::get(self, id).await
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EmployeeStore for MySqlStore {
    async fn list(&self) -> StoreResult<Vec<Employee>> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn get(&self, id: u64) -> StoreResult<Option<Employee>> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn insert(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (full_name, email, phone, department, position, salary, joining_date,
             is_full_time, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.full_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.department)
        .bind(&employee.position)
        .bind(employee.salary)
        .bind(employee.joining_date)
        .bind(employee.is_full_time)
        .bind(employee.status.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_backend(e, "An employee with this email already exists"))?;

        let id = result.last_insert_id();
        EmployeeStore::get(self, id)
            .await?
            .ok_or_else(|| vanished("employees", id))
    }

    async fn update(&self, id: u64, patch: EmployeePatch) -> StoreResult<Option<Employee>> {
        let mut update = SqlUpdate::new("employees");
        update
            .set_opt("full_name", patch.full_name)
            .set_opt("email", patch.email)
            .set_opt("phone", patch.phone)
            .set_opt("department", patch.department)
            .set_opt("position", patch.position)
            .set_opt("salary", patch.salary)
            .set_opt("joining_date", patch.joining_date)
            .set_opt("is_full_time", patch.is_full_time)
            .set_opt("status", patch.status.map(|s| s.to_string()))
            .set("updated_at", Utc::now());

        update
            .execute(&self.pool, "id", id)
            .await
            .map_err(|e| conflict_or_backend(e, "An employee with this email already exists"))?;

        EmployeeStore::get(self, id).await
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for MySqlStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn get(&self, id: u64) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        // email column uses a case-insensitive collation
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn emails(&self) -> StoreResult<Vec<String>> {
        let mut stream = sqlx::query_scalar::<_, String>("SELECT email FROM users").fetch(&self.pool);

        let mut emails = Vec::new();
        while let Some(row) = stream.next().await {
            emails.push(row.map_err(db_error)?);
        }
        Ok(emails)
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_backend(e, "Email already registered"))?;

        let id = result.last_insert_id();
        UserStore::get(self, id)
            .await?
            .ok_or_else(|| vanished("users", id))
    }

    async fn update(&self, id: u64, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut update = SqlUpdate::new("users");
        update
            .set_opt("name", patch.name)
            .set_opt("email", patch.email)
            .set_opt("password", patch.password)
            .set_opt("role", patch.role.map(|r| r.to_string()))
            .set("updated_at", Utc::now());

        update
            .execute(&self.pool, "id", id)
            .await
            .map_err(|e| conflict_or_backend(e, "Email already registered"))?;

        UserStore::get(self, id).await
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn record(&self, attendance: NewAttendance) -> StoreResult<Attendance> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, check_in, check_out, status, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(attendance.employee)
        .bind(attendance.date)
        .bind(attendance.check_in)
        .bind(attendance.check_out)
        .bind(attendance.status.to_string())
        .bind(&attendance.notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_id();
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| vanished("attendance", id))
    }

    async fn for_employee(&self, employee: u64) -> StoreResult<Vec<Attendance>> {
        sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance WHERE employee_id = ? ORDER BY date DESC, id DESC",
        )
        .bind(employee)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn insert(&self, request: NewLeaveRequest) -> StoreResult<LeaveRequest> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.employee)
        .bind(request.leave_type.to_string())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(LeaveStatus::Pending.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_id();
        self.leave_by_id(id)
            .await?
            .ok_or_else(|| vanished("leave_requests", id))
    }

    async fn for_employee(&self, employee: u64) -> StoreResult<Vec<LeaveRequest>> {
        sqlx::query_as::<_, LeaveRequest>(
            "SELECT * FROM leave_requests WHERE employee_id = ? ORDER BY id DESC",
        )
        .bind(employee)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn set_status(
        &self,
        id: u64,
        status: LeaveStatus,
        approved_by: Option<u64>,
    ) -> StoreResult<Option<LeaveRequest>> {
        sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approved_by = COALESCE(?, approved_by), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(approved_by)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        self.leave_by_id(id).await
    }
}

impl MySqlStore {
    async fn leave_by_id(&self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl ConnectionProbe for MySqlStore {
    fn backend(&self) -> &'static str {
        "MySQL"
    }

    async fn state(&self) -> ConnectionState {
        if self.pool.is_closed() {
            return ConnectionState::Disconnected;
        }

        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => ConnectionState::Connected,
            Err(e) => {
                warn!(error = %e, "Database ping failed");
                ConnectionState::Disconnected
            }
        }
    }
}

/// These run against a scratch database created per test from `DATABASE_URL`;
/// `cargo test -- --ignored` with a MySQL server available.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeStatus;
    use crate::model::leave_request::LeaveType;
    use crate::test_support::new_item;
    use crate::utils::category_report;
    use chrono::NaiveDate;

    fn stocked(sku: &str, category: Category, quantity: u32, price: f64) -> NewItem {
        let mut item = new_item(sku, category);
        item.sku = sku.to_string();
        item.quantity = quantity;
        item.price = price;
        item
    }

    async fn seed(store: &MySqlStore) {
        for (sku, category, quantity, price) in [
            ("SKU-P1", Category::Pipes, 10, 2.0),
            ("SKU-P2", Category::Pipes, 5, 4.0),
            ("SKU-T1", Category::Tools, 1, 99.5),
            ("SKU-V1", Category::Valves, 0, 12.0),
            ("SKU-V2", Category::Valves, 11, 3.0),
        ] {
            InventoryStore::insert(store, stocked(sku, category, quantity, price))
                .await
                .unwrap();
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a MySQL DATABASE_URL"]
    async fn category_stats_agree_with_the_in_process_report(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        seed(&store).await;

        let from_sql = store.category_stats().await.unwrap();
        let items = InventoryStore::list(&store).await.unwrap();
        assert_eq!(from_sql, category_report::summarize(&items));

        let pipes = &from_sql[0];
        assert_eq!(pipes.name, "pipes");
        assert_eq!((pipes.item_count, pipes.in_stock), (2, 15));
        assert_eq!(pipes.total_value, 40.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a MySQL DATABASE_URL"]
    async fn low_stock_is_ordered_lowest_first(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        seed(&store).await;

        let low: Vec<_> = store
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.sku)
            .collect();
        assert_eq!(low, ["SKU-V1", "SKU-T1", "SKU-P2", "SKU-P1"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a MySQL DATABASE_URL"]
    async fn duplicate_keys_surface_as_conflicts(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        seed(&store).await;

        let dup = InventoryStore::insert(&store, stocked("SKU-P1", Category::Tools, 1, 1.0)).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));

        let clash = InventoryStore::update(
            &store,
            1,
            ItemPatch {
                sku: Some("SKU-T1".into()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(clash, Err(StoreError::Conflict(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a MySQL DATABASE_URL"]
    async fn deleting_an_employee_cascades(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        let mut ids = Vec::new();
        for email in ["leaver@plumbx.com", "manager@plumbx.com"] {
            let employee = EmployeeStore::insert(
                &store,
                NewEmployee {
                    full_name: "Kasun Perera".into(),
                    email: email.into(),
                    phone: "+94771234567".into(),
                    department: "Warehouse".into(),
                    position: "Storekeeper".into(),
                    salary: 60_000.0,
                    joining_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    is_full_time: true,
                    status: EmployeeStatus::Active,
                },
            )
            .await
            .unwrap();
            ids.push(employee.id);
        }
        let (leaver, manager) = (ids[0], ids[1]);

        let request = LeaveStore::insert(
            &store,
            NewLeaveRequest {
                employee: manager,
                leave_type: LeaveType::Vacation,
                start_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
                reason: None,
            },
        )
        .await
        .unwrap();
        store
            .set_status(request.id, LeaveStatus::Approved, Some(leaver))
            .await
            .unwrap();

        assert!(EmployeeStore::delete(&store, leaver).await.unwrap());

        let kept = LeaveStore::for_employee(&store, manager).await.unwrap();
        assert_eq!(kept[0].approved_by, None);
        assert_eq!(kept[0].status, LeaveStatus::Approved);
    }
}
