use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, VariantNames};
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::SubmitReimbursementRequest;
use crate::user::models::UserModel;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    VariantNames,
    ToSchema,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PaymentType {
    Cash,
    CreditCard,
    DebitCard,
}

/// Kind of out-of-pocket expense
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    VariantNames,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutOfPocket {
    Food,
    Lodging,
    Other,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    VariantNames,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Snapshot of the submitter taken when the request is stored; never re-synced with the user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaisedBy {
    pub employee_id: String,
    pub email: String,
    pub fname: String,
}

impl From<&UserModel> for RaisedBy {
    fn from(user: &UserModel) -> Self {
        Self {
            employee_id: user.id.clone(),
            email: user.email.clone(),
            fname: user.fname.clone(),
        }
    }
}

/// Stored reimbursement request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReimbursementModel {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: DateTime<Utc>,
    #[schema(example = 50.25)]
    pub amount: f64,
    pub payment_type: PaymentType,
    pub out_of_pocket: Vec<OutOfPocket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_transportation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_reason: Option<String>,
    pub raised_by: RaisedBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub status: RequestStatus,
}

impl ReimbursementModel {
    pub fn new(request: SubmitReimbursementRequest, submitter: &UserModel) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date: request.date,
            amount: request.amount,
            payment_type: request.payment_type,
            out_of_pocket: request.out_of_pocket,
            material_transportation: request.material_transportation,
            other_reason: request.other_reason,
            raised_by: RaisedBy::from(submitter),
            remarks: request.remarks,
            status: request.status,
        }
    }
}
