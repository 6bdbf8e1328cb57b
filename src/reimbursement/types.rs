use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::models::{OutOfPocket, PaymentType, ReimbursementModel, RequestStatus};

/// Submission body, produced by `validation::reimbursement`
#[derive(Debug, Clone, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SubmitReimbursementRequest {
    /// RFC 3339 timestamp, `YYYY-MM-DD`, or epoch milliseconds
    #[schema(value_type = String, example = "2024-03-01")]
    pub date: DateTime<Utc>,
    /// Must be greater than zero
    #[schema(example = 50.25)]
    pub amount: f64,
    pub payment_type: PaymentType,
    pub out_of_pocket: Vec<OutOfPocket>,
    pub material_transportation: Option<String>,
    pub other_reason: Option<String>,
    /// Ignored; the submitter is the authenticated caller
    pub raised_by: Option<String>,
    pub remarks: Option<String>,
    pub status: RequestStatus,
}

/// Query parameters of the admin filter endpoint; absent or empty values do not constrain
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RequestFilter {
    /// Exact match on `raisedBy.fname`
    pub employee_name: Option<String>,
    /// Exact match on `status`
    pub status: Option<String>,
}

impl RequestFilter {
    /// Drops empty parameters so `?status=` behaves like no parameter
    pub fn normalized(self) -> Self {
        Self {
            employee_name: self.employee_name.filter(|name| !name.is_empty()),
            status: self.status.filter(|status| !status.is_empty()),
        }
    }

    pub fn matches(&self, request: &ReimbursementModel) -> bool {
        let name_matches = self
            .employee_name
            .as_deref()
            .map_or(true, |name| request.raised_by.fname == name);
        let status_matches = self
            .status
            .as_deref()
            .map_or(true, |status| request.status.as_ref() == status);
        name_matches && status_matches
    }
}

/// Body of the admin status update
#[derive(Debug, Clone, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: RequestStatus,
}
