use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, VariantNames};
use utoipa::ToSchema;
use uuid::Uuid;

/// Role stored on the user record; gates which endpoints the user may call
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
pub enum Role {
    Admin,
    Employee,
}

/// Stored user record
#[derive(Debug, Clone)]
pub struct UserModel {
    pub id: String,
    pub email: String,
    /// bcrypt hash, never the plain password
    pub password_hash: String,
    pub role: Role,
    pub fname: String,
}

impl UserModel {
    pub fn new(email: String, password_hash: String, role: Role, fname: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            role,
            fname,
        }
    }
}
