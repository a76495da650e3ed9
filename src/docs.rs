use crate::api::{
    attendance::AttendancePayload,
    employee::EmployeePayload,
    finance::{Expenses, FinancialReport, Revenue},
    inventory::{ItemPayload, ValuedItem},
    leave_request::{LeaveDecision, LeavePayload},
    status::StatusResponse,
    user::{CreateUser, UpdateUser},
};
use crate::auth::session::{Session, TOKEN_COOKIE};
use crate::model::{
    attendance::{Attendance, AttendanceStatus},
    employee::{Employee, EmployeeStatus},
    inventory::{Category, CategoryStats, InventoryItem},
    leave_request::{LeaveRequest, LeaveStatus, LeaveType},
    user::User,
};
use crate::models::{LoginReq, LoginResponse, RegisterReq};
use utoipa::Modify;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, openapi};

/// Documents the `token` cookie set by login.
pub struct SessionCookie;

impl Modify for SessionCookie {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(TOKEN_COOKIE))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PlumbX API",
        version = "1.0.0",
        description = r#"
## PlumbX business backend

Back office of a plumbing supplies business, one workspace per role.

### Key Features
- **Inventory**
  - Items with SKUs, per-category stock and value, low-stock alerts
- **Employees**
  - Employee records, daily attendance, leave requests and approvals
- **Users**
  - Accounts for inventory, employee, delivery, finance, customer and admin roles
- **Delivery** and **Finance**
  - Route skeletons that answer with fixed envelopes

### Security
Sign in with `POST /api/auth/login`. The response sets an HttpOnly `token`
cookie plus `role` and `userName` cookies; every route outside `/api/auth` and
`/api/status` requires them, and each role only reaches its own area.

### Response Format
`{"status": "success" | "error", "message": "...", "data": ...}`, with a
`count` on lists.
"#,
    ),
    paths(
        crate::api::status::api_status,

        crate::auth::handlers::login,
        crate::auth::handlers::register,
        crate::auth::handlers::logout,
        crate::auth::handlers::session,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::create_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,

        crate::api::inventory::list_items,
        crate::api::inventory::get_item,
        crate::api::inventory::create_item,
        crate::api::inventory::update_item,
        crate::api::inventory::delete_item,
        crate::api::inventory::category_stats,
        crate::api::inventory::items_by_category,
        crate::api::inventory::low_stock_alerts,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::record_attendance,
        crate::api::attendance::attendance_for_employee,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_for_employee,
        crate::api::leave_request::update_leave,

        crate::api::delivery::list_deliveries,
        crate::api::delivery::get_delivery,
        crate::api::delivery::create_delivery,
        crate::api::delivery::update_delivery,
        crate::api::delivery::delete_delivery,
        crate::api::delivery::assign_driver,
        crate::api::delivery::update_delivery_status,
        crate::api::delivery::deliveries_by_driver,

        crate::api::finance::list_invoices,
        crate::api::finance::get_invoice,
        crate::api::finance::create_invoice,
        crate::api::finance::update_invoice,
        crate::api::finance::delete_invoice,
        crate::api::finance::list_salaries,
        crate::api::finance::get_salary,
        crate::api::finance::create_salary,
        crate::api::finance::financial_reports
    ),
    components(
        schemas(
            StatusResponse,
            LoginReq,
            LoginResponse,
            RegisterReq,
            Session,
            User,
            CreateUser,
            UpdateUser,
            InventoryItem,
            Category,
            CategoryStats,
            ItemPayload,
            ValuedItem,
            Employee,
            EmployeeStatus,
            EmployeePayload,
            Attendance,
            AttendanceStatus,
            AttendancePayload,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            LeavePayload,
            LeaveDecision,
            FinancialReport,
            Revenue,
            Expenses
        )
    ),
    modifiers(&SessionCookie),
    tags(
        (name = "Status", description = "Backend health"),
        (name = "Auth", description = "Sign in, sign up and session cookies"),
        (name = "User", description = "Account management (admin)"),
        (name = "Inventory", description = "Stock items and category reports"),
        (name = "Employee", description = "Employee records"),
        (name = "Attendance", description = "Daily attendance"),
        (name = "Leave", description = "Leave requests and approvals"),
        (name = "Delivery", description = "Delivery routes (not persisted)"),
        (name = "Finance", description = "Invoices, salaries and reports (not persisted)"),
    )
)]
pub struct ApiDoc;
