use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

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
use crate::utils::category_report;

/// Process-local store for development and tests. Data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inventory: RwLock<Table<InventoryItem>>,
    employees: RwLock<Table<Employee>>,
    users: RwLock<Table<User>>,
    attendance: RwLock<Table<Attendance>>,
    leave: RwLock<Table<LeaveRequest>>,
}

#[derive(Debug)]
struct Table<T> {
    last_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<InventoryItem>> {
        Ok(read(&self.inventory)?.rows.values().cloned().collect())
    }

    async fn get(&self, id: u64) -> StoreResult<Option<InventoryItem>> {
        Ok(read(&self.inventory)?.rows.get(&id).cloned())
    }

    async fn by_category(&self, category: Category) -> StoreResult<Vec<InventoryItem>> {
        let table = read(&self.inventory)?;
        Ok(table
            .rows
            .values()
            .filter(|item| item.category == category)
            .cloned()
            .collect())
    }

    async fn low_stock(&self) -> StoreResult<Vec<InventoryItem>> {
        let table = read(&self.inventory)?;
        let mut items: Vec<_> = table
            .rows
            .values()
            .filter(|item| item.is_low_stock())
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.quantity, item.id));
        Ok(items)
    }

    async fn category_stats(&self) -> StoreResult<Vec<CategoryStats>> {
        let table = read(&self.inventory)?;
        let items: Vec<&InventoryItem> = table.rows.values().collect();
        Ok(category_report::summarize(items))
    }

    async fn sku_exists(&self, sku: &str) -> StoreResult<bool> {
        Ok(read(&self.inventory)?.rows.values().any(|item| item.sku == sku))
    }

    async fn insert(&self, item: NewItem) -> StoreResult<InventoryItem> {
        let mut table = write(&self.inventory)?;
        if table.rows.values().any(|existing| existing.sku == item.sku) {
            return Err(StoreError::Conflict("SKU already exists".into()));
        }

        let now = Utc::now();
        let id = table.next_id();
        let stored = InventoryItem {
            id,
            sku: item.sku,
            item_name: item.item_name,
            category: item.category,
            description: item.description,
            quantity: item.quantity,
            price: item.price,
            size: item.size,
            material: item.material,
            supplier: item.supplier,
            reorder_point: item.reorder_point,
            location: item.location,
            image_url: item.image_url,
            last_updated: now,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: u64, patch: ItemPatch) -> StoreResult<Option<InventoryItem>> {
        let mut table = write(&self.inventory)?;
        if let Some(sku) = &patch.sku {
            if table.rows.values().any(|other| other.id != id && &other.sku == sku) {
                return Err(StoreError::Conflict("SKU already exists".into()));
            }
        }

        let Some(item) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(item);
        let now = Utc::now();
        item.last_updated = now;
        item.updated_at = now;
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        Ok(write(&self.inventory)?.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Employee>> {
        Ok(read(&self.employees)?.rows.values().cloned().collect())
    }

    async fn get(&self, id: u64) -> StoreResult<Option<Employee>> {
        Ok(read(&self.employees)?.rows.get(&id).cloned())
    }

    async fn insert(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let mut table = write(&self.employees)?;
        if table
            .rows
            .values()
            .any(|existing| same_email(&existing.email, &employee.email))
        {
            return Err(StoreError::Conflict(
                "An employee with this email already exists".into(),
            ));
        }

        let now = Utc::now();
        let id = table.next_id();
        let stored = Employee {
            id,
            full_name: employee.full_name,
            email: employee.email,
            phone: employee.phone,
            department: employee.department,
            position: employee.position,
            salary: employee.salary,
            joining_date: employee.joining_date,
            is_full_time: employee.is_full_time,
            status: employee.status,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: u64, patch: EmployeePatch) -> StoreResult<Option<Employee>> {
        let mut table = write(&self.employees)?;
        if let Some(email) = &patch.email {
            if table
                .rows
                .values()
                .any(|other| other.id != id && same_email(&other.email, email))
            {
                return Err(StoreError::Conflict(
                    "An employee with this email already exists".into(),
                ));
            }
        }

        let Some(employee) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(employee);
        employee.updated_at = Utc::now();
        Ok(Some(employee.clone()))
    }

    /// Removes the employee with their attendance and leave rows, and clears
    /// them as approver elsewhere. Locks are taken employees, attendance, leave.
    async fn delete(&self, id: u64) -> StoreResult<bool> {
        let mut employees = write(&self.employees)?;
        let mut attendance = write(&self.attendance)?;
        let mut leave = write(&self.leave)?;

        if employees.rows.remove(&id).is_none() {
            return Ok(false);
        }

        attendance.rows.retain(|_, record| record.employee != id);
        leave.rows.retain(|_, request| request.employee != id);
        for request in leave.rows.values_mut() {
            if request.approved_by == Some(id) {
                request.approved_by = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(read(&self.users)?.rows.values().cloned().collect())
    }

    async fn get(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(read(&self.users)?.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(read(&self.users)?
            .rows
            .values()
            .find(|user| same_email(&user.email, email))
            .cloned())
    }

    async fn emails(&self) -> StoreResult<Vec<String>> {
        Ok(read(&self.users)?
            .rows
            .values()
            .map(|user| user.email.clone())
            .collect())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut table = write(&self.users)?;
        if table
            .rows
            .values()
            .any(|existing| same_email(&existing.email, &user.email))
        {
            return Err(StoreError::Conflict("Email already registered".into()));
        }

        let now = Utc::now();
        let id = table.next_id();
        let stored = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: u64, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut table = write(&self.users)?;
        if let Some(email) = &patch.email {
            if table
                .rows
                .values()
                .any(|other| other.id != id && same_email(&other.email, email))
            {
                return Err(StoreError::Conflict("Email already registered".into()));
            }
        }

        let Some(user) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(user);
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        Ok(write(&self.users)?.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn record(&self, attendance: NewAttendance) -> StoreResult<Attendance> {
        let mut table = write(&self.attendance)?;
        let id = table.next_id();
        let stored = Attendance {
            id,
            employee: attendance.employee,
            date: attendance.date,
            check_in: attendance.check_in,
            check_out: attendance.check_out,
            status: attendance.status,
            notes: attendance.notes,
            created_at: Utc::now(),
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn for_employee(&self, employee: u64) -> StoreResult<Vec<Attendance>> {
        let table = read(&self.attendance)?;
        let mut records: Vec<_> = table
            .rows
            .values()
            .filter(|record| record.employee == employee)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(records)
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn insert(&self, request: NewLeaveRequest) -> StoreResult<LeaveRequest> {
        let mut table = write(&self.leave)?;
        let now = Utc::now();
        let id = table.next_id();
        let stored = LeaveRequest {
            id,
            employee: request.employee,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            status: LeaveStatus::Pending,
            approved_by: None,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn for_employee(&self, employee: u64) -> StoreResult<Vec<LeaveRequest>> {
        let table = read(&self.leave)?;
        Ok(table
            .rows
            .values()
            .rev()
            .filter(|request| request.employee == employee)
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        id: u64,
        status: LeaveStatus,
        approved_by: Option<u64>,
    ) -> StoreResult<Option<LeaveRequest>> {
        let mut table = write(&self.leave)?;
        let Some(request) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        request.status = status;
        if approved_by.is_some() {
            request.approved_by = approved_by;
        }
        request.updated_at = Utc::now();
        Ok(Some(request.clone()))
    }
}

#[async_trait]
impl ConnectionProbe for MemoryStore {
    fn backend(&self) -> &'static str {
        "Memory store"
    }

    async fn state(&self) -> ConnectionState {
        ConnectionState::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        attendance::AttendanceStatus,
        employee::EmployeeStatus,
        inventory::DEFAULT_REORDER_POINT,
        leave_request::LeaveType,
    };
    use chrono::NaiveDate;

    fn new_employee(email: &str) -> NewEmployee {
        NewEmployee {
            full_name: "Kasun Perera".into(),
            email: email.to_string(),
            phone: "+94771234567".into(),
            department: "Warehouse".into(),
            position: "Storekeeper".into(),
            salary: 60_000.0,
            joining_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            is_full_time: true,
            status: EmployeeStatus::Active,
        }
    }

    fn new_leave(employee: u64) -> NewLeaveRequest {
        NewLeaveRequest {
            employee,
            leave_type: LeaveType::Sick,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            reason: None,
        }
    }

    fn new_item(sku: &str, category: Category, quantity: u32) -> NewItem {
        NewItem {
            sku: sku.to_string(),
            item_name: format!("item {sku}"),
            category,
            description: None,
            quantity,
            price: 2.5,
            size: None,
            material: None,
            supplier: None,
            reorder_point: DEFAULT_REORDER_POINT,
            location: None,
            image_url: None,
        }
    }

    #[actix_web::test]
    async fn inventory_ids_are_sequential_and_skus_unique() {
        let store = MemoryStore::default();
        let a = InventoryStore::insert(&store, new_item("SKU-A", Category::Pipes, 4))
            .await
            .unwrap();
        let b = InventoryStore::insert(&store, new_item("SKU-B", Category::Tools, 40))
            .await
            .unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let dup = InventoryStore::insert(&store, new_item("SKU-A", Category::Valves, 1)).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));

        let clash = InventoryStore::update(
            &store,
            b.id,
            ItemPatch {
                sku: Some("SKU-A".into()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(clash, Err(StoreError::Conflict(_))));
    }

    #[actix_web::test]
    async fn low_stock_lists_items_at_or_below_reorder_point() {
        let store = MemoryStore::default();
        for (sku, quantity) in [("S1", 10), ("S2", 3), ("S3", 11), ("S4", 0)] {
            InventoryStore::insert(&store, new_item(sku, Category::Fittings, quantity))
                .await
                .unwrap();
        }

        let low: Vec<_> = store
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.sku)
            .collect();
        assert_eq!(low, ["S4", "S2", "S1"]);
    }

    #[actix_web::test]
    async fn deleted_rows_are_gone_and_ids_are_not_reused() {
        let store = MemoryStore::default();
        let first = InventoryStore::insert(&store, new_item("X1", Category::Safety, 1))
            .await
            .unwrap();
        assert!(InventoryStore::delete(&store, first.id).await.unwrap());
        assert!(!InventoryStore::delete(&store, first.id).await.unwrap());
        assert!(InventoryStore::get(&store, first.id).await.unwrap().is_none());

        let second = InventoryStore::insert(&store, new_item("X2", Category::Safety, 1))
            .await
            .unwrap();
        assert_eq!(second.id, 2);
    }

    #[actix_web::test]
    async fn user_emails_are_unique_ignoring_case() {
        let store = MemoryStore::default();
        let user = NewUser {
            name: "Admin User".into(),
            email: "admin@plumbx.com".into(),
            password: "hash".into(),
            role: crate::model::role::Role::Admin,
        };
        UserStore::insert(&store, user.clone()).await.unwrap();

        let mut shouting = user;
        shouting.email = "ADMIN@plumbx.com".into();
        assert!(matches!(
            UserStore::insert(&store, shouting).await,
            Err(StoreError::Conflict(_))
        ));
        assert!(store.find_by_email("Admin@PlumbX.com").await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn deleting_an_employee_removes_their_records() {
        let store = MemoryStore::default();
        let leaver = EmployeeStore::insert(&store, new_employee("leaver@plumbx.com"))
            .await
            .unwrap();
        let manager = EmployeeStore::insert(&store, new_employee("manager@plumbx.com"))
            .await
            .unwrap();

        for employee in [leaver.id, manager.id] {
            store
                .record(NewAttendance {
                    employee,
                    date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                    check_in: None,
                    check_out: None,
                    status: AttendanceStatus::Present,
                    notes: None,
                })
                .await
                .unwrap();
        }
        let own = LeaveStore::insert(&store, new_leave(leaver.id)).await.unwrap();
        let approved = LeaveStore::insert(&store, new_leave(manager.id)).await.unwrap();
        store
            .set_status(approved.id, LeaveStatus::Approved, Some(leaver.id))
            .await
            .unwrap();

        assert!(EmployeeStore::delete(&store, leaver.id).await.unwrap());

        assert!(AttendanceStore::for_employee(&store, leaver.id).await.unwrap().is_empty());
        assert!(LeaveStore::for_employee(&store, leaver.id).await.unwrap().is_empty());
        assert!(store.set_status(own.id, LeaveStatus::Rejected, None).await.unwrap().is_none());

        assert_eq!(AttendanceStore::for_employee(&store, manager.id).await.unwrap().len(), 1);
        let kept = LeaveStore::for_employee(&store, manager.id).await.unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].status, LeaveStatus::Approved);
        assert_eq!(kept[0].approved_by, None);

        assert!(!EmployeeStore::delete(&store, leaver.id).await.unwrap());
    }
}
