use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{
    models::{OutOfPocket, PaymentType, RaisedBy, ReimbursementModel, RequestStatus},
    types::RequestFilter,
};
use crate::shared::AppError;

/// Trait for reimbursement repository operations
#[async_trait]
pub trait ReimbursementRepository {
    async fn create_request(&self, request: &ReimbursementModel) -> Result<(), AppError>;
    /// Every stored request, oldest first
    async fn list_requests(&self) -> Result<Vec<ReimbursementModel>, AppError>;
    async fn filter_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<ReimbursementModel>, AppError>;
    /// Sets the status and returns the updated record, or `None` if no record has this id
    async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> Result<Option<ReimbursementModel>, AppError>;
}

/// In-memory implementation of ReimbursementRepository for development and testing
///
/// Requests are kept in submission order. Data is lost when the process exits.
pub struct InMemoryReimbursementRepository {
    requests: RwLock<Vec<ReimbursementModel>>,
}

impl Default for InMemoryReimbursementRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReimbursementRepository {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated requests
    pub fn with_requests(requests: Vec<ReimbursementModel>) -> Self {
        Self {
            requests: RwLock::new(requests),
        }
    }

    pub async fn get_request(&self, id: &str) -> Option<ReimbursementModel> {
        self.requests
            .read()
            .await
            .iter()
            .find(|request| request.id == id)
            .cloned()
    }
}

#[async_trait]
impl ReimbursementRepository for InMemoryReimbursementRepository {
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    async fn create_request(&self, request: &ReimbursementModel) -> Result<(), AppError> {
        debug!(employee_id = %request.raised_by.employee_id, "Creating reimbursement request in memory");

        let mut requests = self.requests.write().await;
        if requests.iter().any(|existing| existing.id == request.id) {
            warn!("Reimbursement request already exists in memory");
            return Err(AppError::DatabaseError(
                "Reimbursement request already exists".to_string(),
            ));
        }
        requests.push(request.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_requests(&self) -> Result<Vec<ReimbursementModel>, AppError> {
        let requests = self.requests.read().await.clone();
        debug!(count = requests.len(), "Listed reimbursement requests from memory");
        Ok(requests)
    }

    #[instrument(skip(self))]
    async fn filter_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<ReimbursementModel>, AppError> {
        let matching: Vec<ReimbursementModel> = self
            .requests
            .read()
            .await
            .iter()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect();

        debug!(count = matching.len(), "Filtered reimbursement requests in memory");
        Ok(matching)
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> Result<Option<ReimbursementModel>, AppError> {
        let mut requests = self.requests.write().await;
        let updated = requests
            .iter_mut()
            .find(|request| request.id == id)
            .map(|request| {
                request.status = status;
                request.clone()
            });

        debug!(found = updated.is_some(), "Updated reimbursement status in memory");
        Ok(updated)
    }
}

/// PostgreSQL implementation of reimbursement repository
pub struct PostgresReimbursementRepository {
    pool: PgPool,
}

impl PostgresReimbursementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, date, amount, payment_type, out_of_pocket, \
    material_transportation, other_reason, raised_by_employee_id, raised_by_email, \
    raised_by_fname, remarks, status";

fn parse_column<T: FromStr>(row: &PgRow, column: &str) -> Result<T, AppError> {
    let raw: String = row.get(column);
    T::from_str(&raw).map_err(|_| {
        AppError::DatabaseError(format!("Unexpected value '{raw}' in column {column}"))
    })
}

fn request_from_row(row: &PgRow) -> Result<ReimbursementModel, AppError> {
    let out_of_pocket = row
        .get::<Vec<String>, _>("out_of_pocket")
        .iter()
        .map(|kind| {
            OutOfPocket::from_str(kind).map_err(|_| {
                AppError::DatabaseError(format!("Unexpected out_of_pocket value '{kind}'"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReimbursementModel {
        id: row.get("id"),
        date: row.get("date"),
        amount: row.get("amount"),
        payment_type: parse_column::<PaymentType>(row, "payment_type")?,
        out_of_pocket,
        material_transportation: row.get("material_transportation"),
        other_reason: row.get("other_reason"),
        raised_by: RaisedBy {
            employee_id: row.get("raised_by_employee_id"),
            email: row.get("raised_by_email"),
            fname: row.get("raised_by_fname"),
        },
        remarks: row.get("remarks"),
        status: parse_column::<RequestStatus>(row, "status")?,
    })
}

fn database_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, "{}", context);
        AppError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl ReimbursementRepository for PostgresReimbursementRepository {
    #[instrument(skip(self, request), fields(request_id = %request.id))]
    async fn create_request(&self, request: &ReimbursementModel) -> Result<(), AppError> {
        debug!("Creating reimbursement request in database");

        let out_of_pocket: Vec<String> = request
            .out_of_pocket
            .iter()
            .map(|kind| kind.to_string())
            .collect();

        sqlx::query(
            "INSERT INTO reimbursement_requests (id, date, amount, payment_type, out_of_pocket, \
             material_transportation, other_reason, raised_by_employee_id, raised_by_email, \
             raised_by_fname, remarks, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&request.id)
        .bind(request.date)
        .bind(request.amount)
        .bind(request.payment_type.as_ref())
        .bind(out_of_pocket)
        .bind(&request.material_transportation)
        .bind(&request.other_reason)
        .bind(&request.raised_by.employee_id)
        .bind(&request.raised_by.email)
        .bind(&request.raised_by.fname)
        .bind(&request.remarks)
        .bind(request.status.as_ref())
        .execute(&self.pool)
        .await
        .map_err(database_error("Failed to create reimbursement request in database"))?;

        debug!("Reimbursement request created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_requests(&self) -> Result<Vec<ReimbursementModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM reimbursement_requests ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to list reimbursement requests"))?;

        debug!(count = rows.len(), "Listed reimbursement requests from database");
        rows.iter().map(request_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn filter_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<ReimbursementModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM reimbursement_requests \
             WHERE ($1::TEXT IS NULL OR raised_by_fname = $1) \
             AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY created_at"
        ))
        .bind(&filter.employee_name)
        .bind(&filter.status)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to filter reimbursement requests"))?;

        debug!(count = rows.len(), "Filtered reimbursement requests in database");
        rows.iter().map(request_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> Result<Option<ReimbursementModel>, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE reimbursement_requests SET status = $2 WHERE id = $1 RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to update reimbursement status"))?;

        debug!(found = row.is_some(), "Updated reimbursement status in database");
        row.as_ref().map(request_from_row).transpose()
    }
}
