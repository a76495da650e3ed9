use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    api::{MissingFields, non_blank, parse_date},
    error::ApiError,
    model::attendance::{AttendanceStatus, NewAttendance},
    models::ApiResponse,
    store::{AttendanceStore, EmployeeStore},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePayload {
    /// Employee id
    #[schema(example = 1)]
    pub employee: Option<u64>,
    #[schema(example = "2026-03-02", format = "date")]
    pub date: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time", example = "2026-03-02T08:58:00Z")]
    pub check_in: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out: Option<DateTime<Utc>>,
    /// `present`, `absent`, `half-day` or `leave`
    #[schema(example = "present")]
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// 404 unless the employee is on record.
pub(crate) async fn require_employee(store: &dyn EmployeeStore, id: u64) -> Result<(), ApiError> {
    match store.get(id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("Employee")),
    }
}

/// Record attendance for a day
#[utoipa::path(
    post,
    path = "/api/employees/attendance",
    request_body = AttendancePayload,
    responses(
        (status = 201, description = "Attendance recorded", body = crate::model::attendance::Attendance),
        (status = 400, description = "Missing fields, bad date or status", body = Object, example = json!({
            "status": "error",
            "message": "Required fields missing: status"
        })),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Attendance"
)]
pub async fn record_attendance(
    attendance: web::Data<dyn AttendanceStore>,
    employees: web::Data<dyn EmployeeStore>,
    payload: web::Json<AttendancePayload>,
) -> actix_web::Result<HttpResponse> {
    let AttendancePayload {
        employee,
        date,
        check_in,
        check_out,
        status,
        notes,
    } = payload.into_inner();

    let mut missing = MissingFields::default();
    let employee = missing.take("employee", employee);
    let date = missing.take_text("date", date);
    let status = missing.take_text("status", status);

    let (Some(employee), Some(date), Some(status)) = (employee, date, status) else {
        return Err(missing.into_error().into());
    };

    let date = parse_date("date", &date)?;
    let status: AttendanceStatus = status
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{status} is not a valid attendance status")))?;

    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        if check_out < check_in {
            return Err(ApiError::BadRequest("checkOut cannot be before checkIn".into()).into());
        }
    }

    require_employee(employees.get_ref(), employee).await?;

    let record = attendance
        .record(NewAttendance {
            employee,
            date,
            check_in,
            check_out,
            status,
            notes: non_blank(notes),
        })
        .await
        .map_err(ApiError::from)?;

    info!(employee_id = employee, %date, status = %record.status, "Attendance recorded");

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Attendance recorded successfully",
        record,
    )))
}

#[utoipa::path(
    get,
    path = "/api/employees/attendance/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Attendance history, newest day first", body = [crate::model::attendance::Attendance])
    ),
    tag = "Attendance"
)]
pub async fn attendance_for_employee(
    attendance: web::Data<dyn AttendanceStore>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let records = attendance
        .for_employee(path.into_inner())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(
        "Attendance records retrieved successfully",
        records,
    )))
}
