pub mod attendance;
pub mod delivery;
pub mod employee;
pub mod finance;
pub mod inventory;
pub mod leave_request;
pub mod status;
pub mod user;

use chrono::{DateTime, NaiveDate};

use crate::error::ApiError;

/// Collects the names of absent required fields while a create payload is
/// unpacked, so one 400 can list all of them.
#[derive(Debug, Default)]
pub(crate) struct MissingFields(Vec<&'static str>);

impl MissingFields {
    pub fn take<T>(&mut self, field: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.0.push(field);
        }
        value
    }

    /// Like [`take`](Self::take), treating blank strings as absent.
    pub fn take_text(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        self.take(field, non_blank(value))
    }

    pub fn into_error(self) -> ApiError {
        ApiError::missing_fields(&self.0)
    }
}

/// Minimal shape check; the unique index decides whether it is free.
pub(crate) fn check_email(email: &str) -> Result<(), ApiError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !email.contains(' ') => {
            Ok(())
        }
        _ => Err(ApiError::BadRequest(format!("{email} is not a valid email address"))),
    }
}

/// Accepts `2026-01-31` and full RFC 3339 timestamps.
pub(crate) fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ApiError::BadRequest(format!("{field} must be a date (YYYY-MM-DD)")))
}

/// Trims and drops empty strings.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
