use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    api::{MissingFields, check_email, non_blank, parse_date},
    auth::session::Session,
    error::ApiError,
    model::employee::{EmployeePatch, EmployeeStatus, NewEmployee},
    models::ApiResponse,
    store::EmployeeStore,
};

/// Body of create and update. Unknown keys, including a client-sent
/// `employeeId`, are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[schema(example = "Jane Employee")]
    pub full_name: Option<String>,
    #[schema(example = "jane@plumbx.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "+94771234567")]
    pub phone: Option<String>,
    #[schema(example = "Warehouse")]
    pub department: Option<String>,
    #[schema(example = "Storekeeper")]
    pub position: Option<String>,
    #[schema(example = 85000.0)]
    pub salary: Option<f64>,
    #[schema(example = "2026-01-01", format = "date")]
    pub joining_date: Option<String>,
    /// Defaults to true.
    pub is_full_time: Option<bool>,
    /// `active` (default) or `inactive`.
    #[schema(example = "active")]
    pub status: Option<String>,
}

fn salary(value: f64) -> Result<f64, ApiError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ApiError::BadRequest("salary must be a non-negative number".into()))
    }
}

fn parse_status(raw: &str) -> Result<EmployeeStatus, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("{raw} is not a valid employee status")))
}

fn to_patch(payload: EmployeePayload) -> Result<EmployeePatch, ApiError> {
    let email = non_blank(payload.email);
    if let Some(email) = &email {
        check_email(email)?;
    }

    Ok(EmployeePatch {
        full_name: non_blank(payload.full_name),
        email,
        phone: non_blank(payload.phone),
        department: non_blank(payload.department),
        position: non_blank(payload.position),
        salary: payload.salary.map(salary).transpose()?,
        joining_date: non_blank(payload.joining_date)
            .map(|d| parse_date("joiningDate", &d))
            .transpose()?,
        is_full_time: payload.is_full_time,
        status: non_blank(payload.status)
            .map(|s| parse_status(&s))
            .transpose()?,
    })
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees", body = [crate::model::employee::Employee])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    store: web::Data<dyn EmployeeStore>,
) -> actix_web::Result<HttpResponse> {
    let employees = store.list().await.map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(ApiResponse::list(
        "Employees retrieved successfully",
        employees,
    )))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee found", body = crate::model::employee::Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "status": "error",
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    store: web::Data<dyn EmployeeStore>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let employee = store
        .get(path.into_inner())
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Employee retrieved successfully",
        employee,
    )))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = EmployeePayload,
    responses(
        (status = 201, description = "Employee created; the id is assigned by the server", body = crate::model::employee::Employee),
        (status = 400, description = "Missing fields or email already used", body = Object, example = json!({
            "status": "error",
            "message": "An employee with this email already exists"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    store: web::Data<dyn EmployeeStore>,
    payload: web::Json<EmployeePayload>,
) -> actix_web::Result<HttpResponse> {
    let EmployeePatch {
        full_name,
        email,
        phone,
        department,
        position,
        salary,
        joining_date,
        is_full_time,
        status,
    } = to_patch(payload.into_inner())?;

    let mut missing = MissingFields::default();
    let full_name = missing.take("fullName", full_name);
    let email = missing.take("email", email);
    let phone = missing.take("phone", phone);
    let department = missing.take("department", department);
    let position = missing.take("position", position);
    let salary = missing.take("salary", salary);
    let joining_date = missing.take("joiningDate", joining_date);

    let (
        Some(full_name),
        Some(email),
        Some(phone),
        Some(department),
        Some(position),
        Some(salary),
        Some(joining_date),
    ) = (full_name, email, phone, department, position, salary, joining_date)
    else {
        return Err(missing.into_error().into());
    };

    let employee = store
        .insert(NewEmployee {
            full_name,
            email,
            phone,
            department,
            position,
            salary,
            joining_date,
            is_full_time: is_full_time.unwrap_or(true),
            status: status.unwrap_or_default(),
        })
        .await
        .map_err(ApiError::from)?;

    info!(employee_id = employee.id, "Employee created");

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Employee created successfully",
        employee,
    )))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Employee updated", body = crate::model::employee::Employee),
        (status = 400, description = "Invalid field or email already used", body = Object),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    store: web::Data<dyn EmployeeStore>,
    path: web::Path<u64>,
    payload: web::Json<EmployeePayload>,
) -> actix_web::Result<HttpResponse> {
    let patch = to_patch(payload.into_inner())?;

    let employee = store
        .update(path.into_inner(), patch)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Employee updated successfully",
        employee,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted", body = Object, example = json!({
            "status": "success",
            "message": "Employee deleted successfully",
            "data": null
        })),
        (status = 404, description = "Employee not found", body = Object)
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    session: Session,
    store: web::Data<dyn EmployeeStore>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let id = path.into_inner();

    if !store.delete(id).await.map_err(ApiError::from)? {
        return Err(ApiError::not_found("Employee").into());
    }

    info!(employee_id = id, by = %session.email, "Employee deleted");

    Ok(HttpResponse::Ok().json(ApiResponse::success("Employee deleted successfully", ())))
}

#[cfg(test)]
mod tests {
    use crate::model::role::Role;
    use crate::test_support::{TestApp, json_body, signed_in, test_service};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    fn jane() -> Value {
        json!({
            "employeeId": 999,
            "fullName": "Jane Employee",
            "email": "jane@plumbx.com",
            "phone": "+94771234567",
            "department": "Warehouse",
            "position": "Storekeeper",
            "salary": 85000,
            "joiningDate": "2024-01-15"
        })
    }

    #[actix_web::test]
    async fn create_assigns_the_id_and_defaults() {
        let app = TestApp::new();
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::post(), Role::Employee)
            .uri("/api/employees")
            .set_json(jane())
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let data = json_body(resp).await["data"].clone();
        assert_eq!(data["id"], 1);
        assert_eq!(data["isFullTime"], true);
        assert_eq!(data["status"], "active");
        assert_eq!(data["joiningDate"], "2024-01-15");
    }

    #[actix_web::test]
    async fn missing_fields_are_listed() {
        let app = TestApp::new();
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::post(), Role::Employee)
            .uri("/api/employees")
            .set_json(json!({"fullName": "Jane Employee", "email": "jane@plumbx.com"}))
            .to_request();
        let resp = test::call_service(&svc, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(resp).await["message"],
            "Required fields missing: phone, department, position, salary, joiningDate"
        );
    }

    #[actix_web::test]
    async fn duplicate_email_is_a_bad_request() {
        let app = TestApp::new();
        let svc = test_service!(app);

        for expected in [StatusCode::CREATED, StatusCode::BAD_REQUEST] {
            let req = signed_in(test::TestRequest::post(), Role::Employee)
                .uri("/api/employees")
                .set_json(jane())
                .to_request();
            assert_eq!(test::call_service(&svc, req).await.status(), expected);
        }
    }

    #[actix_web::test]
    async fn finance_reads_but_cannot_edit_employees() {
        let app = TestApp::new();
        let id = app.seed_employee("jane@plumbx.com").await;
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::get(), Role::Finance)
            .uri(&format!("/api/employees/{id}"))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::OK);

        let req = signed_in(test::TestRequest::put(), Role::Finance)
            .uri(&format!("/api/employees/{id}"))
            .set_json(json!({"salary": 1}))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn update_and_delete_round_out_the_lifecycle() {
        let app = TestApp::new();
        let id = app.seed_employee("jane@plumbx.com").await;
        let svc = test_service!(app);

        let req = signed_in(test::TestRequest::put(), Role::Employee)
            .uri(&format!("/api/employees/{id}"))
            .set_json(json!({"position": "Warehouse Lead", "status": "inactive"}))
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let data = json_body(resp).await["data"].clone();
        assert_eq!(data["position"], "Warehouse Lead");
        assert_eq!(data["status"], "inactive");
        assert_eq!(data["email"], "jane@plumbx.com");

        let req = signed_in(test::TestRequest::delete(), Role::Employee)
            .uri(&format!("/api/employees/{id}"))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::OK);

        let req = signed_in(test::TestRequest::delete(), Role::Employee)
            .uri(&format!("/api/employees/{id}"))
            .to_request();
        assert_eq!(test::call_service(&svc, req).await.status(), StatusCode::NOT_FOUND);
    }
}
