use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, AsRefStr, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl TryFrom<String> for EmployeeStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "fullName": "Jane Employee",
        "email": "jane@plumbx.com",
        "phone": "+94771234567",
        "department": "Warehouse",
        "position": "Storekeeper",
        "salary": 85000.0,
        "joiningDate": "2024-01-01",
        "isFullTime": true,
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Jane Employee")]
    pub full_name: String,

    #[schema(example = "jane@plumbx.com")]
    pub email: String,

    #[schema(example = "+94771234567")]
    pub phone: String,

    #[schema(example = "Warehouse")]
    pub department: String,

    #[schema(example = "Storekeeper")]
    pub position: String,

    #[schema(example = 85000.0)]
    pub salary: f64,

    #[schema(
        example = "2024-01-01",
        value_type = String,
        format = "date"
    )]
    pub joining_date: NaiveDate,

    pub is_full_time: bool,

    #[sqlx(try_from = "String")]
    pub status: EmployeeStatus,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub joining_date: NaiveDate,
    pub is_full_time: bool,
    pub status: EmployeeStatus,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub joining_date: Option<NaiveDate>,
    pub is_full_time: Option<bool>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeePatch {
    pub fn apply(self, employee: &mut Employee) {
        if let Some(v) = self.full_name {
            employee.full_name = v;
        }
        if let Some(v) = self.email {
            employee.email = v;
        }
        if let Some(v) = self.phone {
            employee.phone = v;
        }
        if let Some(v) = self.department {
            employee.department = v;
        }
        if let Some(v) = self.position {
            employee.position = v;
        }
        if let Some(v) = self.salary {
            employee.salary = v;
        }
        if let Some(v) = self.joining_date {
            employee.joining_date = v;
        }
        if let Some(v) = self.is_full_time {
            employee.is_full_time = v;
        }
        if let Some(v) = self.status {
            employee.status = v;
        }
    }
}
