use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    api::{MissingFields, attendance::require_employee, non_blank, parse_date},
    auth::session::Session,
    error::ApiError,
    model::leave_request::{LeaveStatus, LeaveType, NewLeaveRequest},
    models::ApiResponse,
    store::{EmployeeStore, LeaveStore},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeavePayload {
    /// Employee id
    #[schema(example = 1)]
    pub employee: Option<u64>,
    /// `sick`, `vacation`, `personal` or `other`
    #[schema(example = "vacation")]
    pub leave_type: Option<String>,
    #[schema(example = "2026-04-06", format = "date")]
    pub start_date: Option<String>,
    #[schema(example = "2026-04-10", format = "date")]
    pub end_date: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDecision {
    /// `pending`, `approved` or `rejected`
    #[schema(example = "approved")]
    pub status: Option<String>,
    /// Employee id of the approver
    #[schema(example = 2)]
    pub approved_by: Option<u64>,
}

/// Request leave
#[utoipa::path(
    post,
    path = "/api/employees/leave",
    request_body = LeavePayload,
    responses(
        (status = 201, description = "Leave request created as pending", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Missing fields, bad dates or leave type", body = Object, example = json!({
            "status": "error",
            "message": "endDate cannot be before startDate"
        })),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    leave: web::Data<dyn LeaveStore>,
    employees: web::Data<dyn EmployeeStore>,
    payload: web::Json<LeavePayload>,
) -> actix_web::Result<HttpResponse> {
    let LeavePayload {
        employee,
        leave_type,
        start_date,
        end_date,
        reason,
    } = payload.into_inner();

    let mut missing = MissingFields::default();
    let employee = missing.take("employee", employee);
    let leave_type = missing.take_text("leaveType", leave_type);
    let start_date = missing.take_text("startDate", start_date);
    let end_date = missing.take_text("endDate", end_date);

    let (Some(employee), Some(leave_type), Some(start_date), Some(end_date)) =
        (employee, leave_type, start_date, end_date)
    else {
        return Err(missing.into_error().into());
    };

    let leave_type: LeaveType = leave_type
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{leave_type} is not a valid leave type")))?;
    let start_date = parse_date("startDate", &start_date)?;
    let end_date = parse_date("endDate", &end_date)?;

    if end_date < start_date {
        return Err(ApiError::BadRequest("endDate cannot be before startDate".into()).into());
    }

    require_employee(employees.get_ref(), employee).await?;

    let request = leave
        .insert(NewLeaveRequest {
            employee,
            leave_type,
            start_date,
            end_date,
            reason: non_blank(reason),
        })
        .await
        .map_err(ApiError::from)?;

    info!(employee_id = employee, request_id = request.id, "Leave requested");

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Leave request created successfully",
        request,
    )))
}

#[utoipa::path(
    get,
    path = "/api/employees/leave/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Leave requests of the employee, newest first", body = [crate::model::leave_request::LeaveRequest])
    ),
    tag = "Leave"
)]
pub async fn leave_for_employee(
    leave: web::Data<dyn LeaveStore>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let requests = leave
        .for_employee(path.into_inner())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(
        "Leave requests retrieved successfully",
        requests,
    )))
}

/// Approve or reject a leave request
#[utoipa::path(
    put,
    path = "/api/employees/leave/{request_id}",
    params(("request_id" = u64, Path, description = "Leave request id")),
    request_body = LeaveDecision,
    responses(
        (status = 200, description = "Status changed", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Missing or unknown status", body = Object),
        (status = 404, description = "Leave request or approver not found", body = Object, example = json!({
            "status": "error",
            "message": "Leave request not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    session: Session,
    leave: web::Data<dyn LeaveStore>,
    employees: web::Data<dyn EmployeeStore>,
    path: web::Path<u64>,
    payload: web::Json<LeaveDecision>,
) -> actix_web::Result<HttpResponse> {
    let LeaveDecision {
        status,
        approved_by,
    } = payload.into_inner();

    let mut missing = MissingFields::default();
    let Some(status) = missing.take_text("status", status) else {
        return Err(missing.into_error().into());
    };
    let status: LeaveStatus = status
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{status} is not a valid leave status")))?;

    if let Some(approver) = approved_by {
        require_employee(employees.get_ref(), approver).await?;
    }

    let request = leave
        .set_status(path.into_inner(), status, approved_by)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Leave request"))?;

    info!(
        request_id = request.id,
        status = %request.status,
        by = %session.email,
        "Leave request updated"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Leave request updated successfully",
        request,
    )))
}
