//! Request body schemas.
//!
//! Bodies arrive as raw JSON so that every violation can be reported at once,
//! instead of stopping at the first field serde fails to deserialize.

use axum::{extract::rejection::JsonRejection, Json};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use strum::VariantNames;
use utoipa::ToSchema;

use crate::auth::types::{LoginRequest, RegisterRequest};
use crate::reimbursement::models::{OutOfPocket, PaymentType, RequestStatus};
use crate::reimbursement::types::{StatusUpdateRequest, SubmitReimbursementRequest};
use crate::shared::AppError;
use crate::user::models::Role;

const MIN_PASSWORD_LEN: usize = 8;
const MIN_FNAME_LEN: usize = 3;

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldIssue {
    #[schema(example = json!(["password"]))]
    pub path: Vec<String>,
    #[schema(example = "String must contain at least 8 character(s)")]
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            path: if field.is_empty() {
                Vec::new()
            } else {
                vec![field.to_string()]
            },
            message: message.into(),
        }
    }
}

/// Collects issues while a body is walked field by field
#[derive(Default)]
struct Issues(Vec<FieldIssue>);

impl Issues {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldIssue::new(field, message));
    }

    fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

/// Unwraps an extracted JSON body, reporting an unreadable one (bad syntax,
/// wrong content type) as a root-level validation issue
pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(vec![FieldIssue::new("", rejection.body_text())]))
}

/// Reads login credentials; anything that is not a string counts as absent
pub fn credentials(body: &Value) -> LoginRequest {
    let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
    LoginRequest {
        email: field("email"),
        password: field("password"),
    }
}

/// Validates a registration body
pub fn registration(body: &Value) -> Result<RegisterRequest, AppError> {
    let mut issues = Issues::default();
    let fields = object(body, &mut issues)?;

    let email = required_string(fields, "email", &mut issues);
    if let Some(email) = &email {
        if !is_valid_email(email) {
            issues.push("email", "Invalid email");
        }
    }

    let password = required_string(fields, "password", &mut issues);
    if let Some(password) = &password {
        check_min_len(password, MIN_PASSWORD_LEN, "password", &mut issues);
    }

    let role: Option<Option<Role>> = enum_field(fields, "role", &mut issues);

    let fname = required_string(fields, "fname", &mut issues);
    if let Some(fname) = &fname {
        check_min_len(fname, MIN_FNAME_LEN, "fname", &mut issues);
    }

    issues.finish()?;
    match (email, password, role, fname) {
        (Some(email), Some(password), Some(Some(role)), Some(fname)) => Ok(RegisterRequest {
            email,
            password,
            role,
            fname,
        }),
        _ => Err(AppError::Internal(
            "registration passed validation with missing fields".to_string(),
        )),
    }
}

/// Validates a reimbursement submission body
pub fn reimbursement(body: &Value) -> Result<SubmitReimbursementRequest, AppError> {
    let mut issues = Issues::default();
    let fields = object(body, &mut issues)?;

    let date = match fields.get("date") {
        None | Some(Value::Null) => {
            issues.push("date", "Required");
            None
        }
        Some(value) => {
            let parsed = parse_date(value);
            if parsed.is_none() {
                issues.push("date", "Invalid date format");
            }
            parsed
        }
    };

    let amount = match fields.get("amount") {
        None | Some(Value::Null) => {
            issues.push("amount", "Required");
            None
        }
        Some(value) => match coerce_number(value) {
            Some(amount) if amount > 0.0 => Some(amount),
            Some(_) => {
                issues.push("amount", "Number must be greater than 0");
                None
            }
            None => {
                issues.push(
                    "amount",
                    format!("Expected number, received {}", type_name(value)),
                );
                None
            }
        },
    };

    let payment_type: Option<Option<PaymentType>> =
        enum_field(fields, "paymentType", &mut issues);

    let out_of_pocket = match fields.get("outOfPocket") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut parsed: Vec<OutOfPocket> = Vec::with_capacity(items.len());
            for item in items {
                match parse_enum(item) {
                    Ok(kind) => parsed.push(kind),
                    Err(message) => issues.push("outOfPocket", message),
                }
            }
            parsed
        }
        Some(other) => {
            issues.push(
                "outOfPocket",
                format!("Expected array, received {}", type_name(other)),
            );
            Vec::new()
        }
    };

    let material_transportation = optional_string(fields, "materialTransportation", &mut issues);
    let other_reason = optional_string(fields, "otherReason", &mut issues);
    let remarks = optional_string(fields, "remarks", &mut issues);
    // Accepted for older clients; the submitter is taken from the token
    let raised_by = optional_string(fields, "raisedBy", &mut issues);

    let status: Option<RequestStatus> = match fields.get("status") {
        None | Some(Value::Null) => Some(RequestStatus::default()),
        Some(value) => match parse_enum(value) {
            Ok(status) => Some(status),
            Err(message) => {
                issues.push("status", message);
                None
            }
        },
    };

    issues.finish()?;
    match (date, amount, payment_type, status) {
        (Some(date), Some(amount), Some(Some(payment_type)), Some(status)) => {
            Ok(SubmitReimbursementRequest {
                date,
                amount,
                payment_type,
                out_of_pocket,
                material_transportation,
                other_reason,
                raised_by,
                remarks,
                status,
            })
        }
        _ => Err(AppError::Internal(
            "reimbursement passed validation with missing fields".to_string(),
        )),
    }
}

/// Validates a status update body; only `status` is read
pub fn status_update(body: &Value) -> Result<StatusUpdateRequest, AppError> {
    let mut issues = Issues::default();
    let fields = object(body, &mut issues)?;
    let status: Option<Option<RequestStatus>> = enum_field(fields, "status", &mut issues);

    issues.finish()?;
    match status {
        Some(Some(status)) => Ok(StatusUpdateRequest { status }),
        _ => Err(AppError::Internal(
            "status update passed validation without a status".to_string(),
        )),
    }
}

fn object<'a>(body: &'a Value, issues: &mut Issues) -> Result<&'a Map<String, Value>, AppError> {
    match body.as_object() {
        Some(fields) => Ok(fields),
        None => {
            issues.push("", format!("Expected object, received {}", type_name(body)));
            Err(AppError::Validation(std::mem::take(&mut issues.0)))
        }
    }
}

fn required_string(fields: &Map<String, Value>, field: &str, issues: &mut Issues) -> Option<String> {
    match fields.get(field) {
        None | Some(Value::Null) => {
            issues.push(field, "Required");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(
                field,
                format!("Expected string, received {}", type_name(other)),
            );
            None
        }
    }
}

fn optional_string(fields: &Map<String, Value>, field: &str, issues: &mut Issues) -> Option<String> {
    match fields.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(
                field,
                format!("Expected string, received {}", type_name(other)),
            );
            None
        }
    }
}

/// Outer `None` means the field was missing, inner `None` that it was invalid
fn enum_field<T>(fields: &Map<String, Value>, field: &str, issues: &mut Issues) -> Option<Option<T>>
where
    T: FromStr + VariantNames,
{
    match fields.get(field) {
        None | Some(Value::Null) => {
            issues.push(field, "Required");
            None
        }
        Some(value) => match parse_enum(value) {
            Ok(parsed) => Some(Some(parsed)),
            Err(message) => {
                issues.push(field, message);
                Some(None)
            }
        },
    }
}

fn parse_enum<T>(value: &Value) -> Result<T, String>
where
    T: FromStr + VariantNames,
{
    let expected = T::VARIANTS
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(" | ");

    match value {
        Value::String(s) => T::from_str(s)
            .map_err(|_| format!("Invalid enum value. Expected {expected}, received '{s}'")),
        other => Err(format!(
            "Expected {expected}, received {}",
            type_name(other)
        )),
    }
}

fn check_min_len(value: &str, min: usize, field: &str, issues: &mut Issues) {
    if value.chars().count() < min {
        issues.push(
            field,
            format!("String must contain at least {min} character(s)"),
        );
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Largest distance from the epoch a date may have, in milliseconds (±100,000,000 days)
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Coerces a JSON value into a timestamp.
///
/// Strings may be RFC 3339, RFC 2822, a local date-time without offset or a plain
/// date (both read as UTC). Numbers are epoch milliseconds, fractions truncated.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => {
            let millis = n.as_f64().filter(|m| m.is_finite() && m.abs() <= MAX_EPOCH_MILLIS)?;
            DateTime::from_timestamp_millis(millis.trunc() as i64)
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    {
        return Some(naive.and_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn issues_of(result: Result<impl std::fmt::Debug, AppError>) -> Vec<FieldIssue> {
        match result {
            Err(AppError::Validation(issues)) => issues,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn fields_of(issues: &[FieldIssue]) -> Vec<String> {
        issues.iter().map(|i| i.path.join(".")).collect()
    }

    fn valid_reimbursement() -> Value {
        json!({
            "date": "2024-03-01",
            "amount": 50.25,
            "paymentType": "creditCard",
            "outOfPocket": ["food", "lodging"],
            "remarks": "client dinner"
        })
    }

    #[rstest]
    #[case("1234567", false)]
    #[case("12345678", true)]
    #[case("a much longer passphrase", true)]
    fn test_registration_password_length(#[case] password: &str, #[case] accepted: bool) {
        let body = json!({
            "email": "ana@example.com",
            "password": password,
            "role": "employee",
            "fname": "Ana"
        });
        assert_eq!(registration(&body).is_ok(), accepted);
    }

    #[test]
    fn test_registration_reports_every_violation() {
        let body = json!({
            "email": "not-an-email",
            "password": "short",
            "role": "manager",
            "fname": "Al"
        });
        let issues = issues_of(registration(&body));
        assert_eq!(fields_of(&issues), vec!["email", "password", "role", "fname"]);
        assert!(issues[2].message.contains("'admin' | 'employee'"));
    }

    #[test]
    fn test_registration_missing_fields() {
        let issues = issues_of(registration(&json!({})));
        assert_eq!(issues.len(), 4);
        assert!(issues.iter().all(|i| i.message == "Required"));
    }

    #[test]
    fn test_registration_parses_role() {
        let body = json!({
            "email": "boss@example.com",
            "password": "correct horse",
            "role": "admin",
            "fname": "Bossman"
        });
        let request = registration(&body).unwrap();
        assert_eq!(request.role, Role::Admin);
        assert_eq!(request.email, "boss@example.com");
    }

    #[test]
    fn test_non_object_body_rejected() {
        let issues = issues_of(registration(&json!(["email"])));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].path.is_empty());
    }

    #[rstest]
    #[case("ana@example.com", true)]
    #[case("a.b+tag@mail.example.org", true)]
    #[case("ana@example", false)]
    #[case("@example.com", false)]
    #[case("ana@@example.com", false)]
    #[case("ana @example.com", false)]
    #[case("ana@example..com", false)]
    fn test_email_shape(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(is_valid_email(email), valid);
    }

    #[test]
    fn test_reimbursement_valid_body() {
        let request = reimbursement(&valid_reimbursement()).unwrap();
        assert_eq!(request.amount, 50.25);
        assert_eq!(request.payment_type, PaymentType::CreditCard);
        assert_eq!(request.out_of_pocket, vec![OutOfPocket::Food, OutOfPocket::Lodging]);
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.remarks.as_deref(), Some("client dinner"));
        assert_eq!(request.date.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[rstest]
    #[case(json!(-5), "Number must be greater than 0")]
    #[case(json!(0), "Number must be greater than 0")]
    #[case(json!("abc"), "Expected number, received string")]
    #[case(json!(true), "Expected number, received boolean")]
    fn test_reimbursement_rejects_bad_amount(#[case] amount: Value, #[case] message: &str) {
        let mut body = valid_reimbursement();
        body["amount"] = amount;
        let issues = issues_of(reimbursement(&body));
        assert_eq!(issues, vec![FieldIssue::new("amount", message)]);
    }

    #[test]
    fn test_reimbursement_coerces_numeric_string_amount() {
        let mut body = valid_reimbursement();
        body["amount"] = json!(" 12.5 ");
        assert_eq!(reimbursement(&body).unwrap().amount, 12.5);
    }

    #[rstest]
    #[case(json!("2024-03-01T10:30:00Z"))]
    #[case(json!("2024-03-01T10:30:00+02:00"))]
    #[case(json!("2024-03-01"))]
    #[case(json!(1709289000000_i64))]
    #[case(json!(1709289000000.0))]
    #[case(json!("2024-03-01T10:30:00"))]
    #[case(json!("2024-03-01T10:30:00.250"))]
    #[case(json!("2024-03-01T10:30"))]
    #[case(json!("2024/03/01"))]
    #[case(json!("Fri, 01 Mar 2024 10:30:00 GMT"))]
    fn test_reimbursement_accepts_date_forms(#[case] date: Value) {
        let mut body = valid_reimbursement();
        body["date"] = date;
        assert!(reimbursement(&body).is_ok());
    }

    #[rstest]
    #[case(json!("yesterday"))]
    #[case(json!("2024-13-45"))]
    #[case(json!({"day": 1}))]
    #[case(json!(1e300))]
    fn test_reimbursement_rejects_invalid_dates(#[case] date: Value) {
        let mut body = valid_reimbursement();
        body["date"] = date;
        let issues = issues_of(reimbursement(&body));
        assert_eq!(issues, vec![FieldIssue::new("date", "Invalid date format")]);
    }

    #[test]
    fn test_reimbursement_checks_enums() {
        let mut body = valid_reimbursement();
        body["paymentType"] = json!("cheque");
        body["outOfPocket"] = json!(["food", "travel"]);
        body["status"] = json!("done");
        let issues = issues_of(reimbursement(&body));
        assert_eq!(fields_of(&issues), vec!["paymentType", "outOfPocket", "status"]);
        assert!(issues[0].message.contains("'cash' | 'creditCard' | 'debitCard'"));
    }

    #[test]
    fn test_reimbursement_missing_required_fields() {
        let issues = issues_of(reimbursement(&json!({ "remarks": 4 })));
        assert_eq!(
            fields_of(&issues),
            vec!["date", "amount", "paymentType", "remarks"]
        );
    }

    #[test]
    fn test_reimbursement_keeps_supplied_status() {
        let mut body = valid_reimbursement();
        body["status"] = json!("approved");
        assert_eq!(reimbursement(&body).unwrap().status, RequestStatus::Approved);
    }

    #[rstest]
    #[case(json!({"status": "approved"}), Some(RequestStatus::Approved))]
    #[case(json!({"status": "rejected", "amount": -1}), Some(RequestStatus::Rejected))]
    #[case(json!({"status": "archived"}), None)]
    #[case(json!({"status": 1}), None)]
    #[case(json!({}), None)]
    fn test_status_update(#[case] body: Value, #[case] expected: Option<RequestStatus>) {
        let result = status_update(&body);
        match expected {
            Some(status) => assert_eq!(result.unwrap().status, status),
            None => assert!(matches!(result, Err(AppError::Validation(_)))),
        }
    }

    #[rstest]
    #[case(json!({"email": "ana@example.com", "password": "pw"}), Some("ana@example.com"), Some("pw"))]
    #[case(json!({"email": 5, "password": "pw"}), None, Some("pw"))]
    #[case(json!({}), None, None)]
    #[case(json!("not an object"), None, None)]
    fn test_credentials_ignore_non_strings(
        #[case] body: Value,
        #[case] email: Option<&str>,
        #[case] password: Option<&str>,
    ) {
        let request = credentials(&body);
        assert_eq!(request.email.as_deref(), email);
        assert_eq!(request.password.as_deref(), password);
    }

    #[test]
    fn test_json_body_passes_parsed_value_through() {
        let body = json_body(Ok(Json(json!({"status": "approved"})))).unwrap();
        assert_eq!(body["status"], "approved");
    }
}
