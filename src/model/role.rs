use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Inventory,
    Employee,
    Delivery,
    Finance,
    Customer,
    Admin,
}

impl TryFrom<String> for Role {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Role {
    /// Landing page a signed-in user is sent to.
    pub fn home(self) -> &'static str {
        match self {
            Role::Inventory => "/inventory/dashboard",
            Role::Employee => "/employees/employee_manager_dashboard",
            Role::Delivery => "/delivery/dashboard",
            Role::Finance => "/finance/dashboard",
            Role::Customer => "/dashboard/orderAndCustomer",
            Role::Admin => "/admin/dashboard",
        }
    }

    /// Page prefixes the role may open. `None` means unrestricted.
    pub fn page_prefixes(self) -> Option<&'static [&'static str]> {
        match self {
            Role::Inventory => Some(&[
                "/inventory",
                "/inventory/dashboard",
                "/inventory/add_new",
                "/inventory/inventory_management",
                "/inventory/category",
                "/inventory/view_alerts",
                "/inventory/inventory_analytics",
            ]),
            Role::Employee => Some(&[
                "/employees",
                "/employees/employee_manager_dashboard",
                "/employees/attendance_check",
                "/employees/leave_management",
                "/employees/view_employees",
                "/employees/add_employee",
                "/employees/edit_employee",
            ]),
            Role::Delivery => Some(&[
                "/delivery",
                "/delivery/dashboard",
                "/delivery/assign_drivers",
                "/delivery/track",
                "/delivery/reports",
            ]),
            Role::Finance => Some(&[
                "/finance",
                "/finance/dashboard",
                "/finance/invoices",
                "/finance/salary",
                "/finance/insights",
            ]),
            Role::Customer => Some(&[
                "/dashboard/orderAndCustomer",
                "/product",
                "/cart",
                "/dashboard/orderAndCustomer/order",
            ]),
            Role::Admin => None,
        }
    }
}
