use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{ReimbursementModel, RequestStatus},
    repository::ReimbursementRepository,
    types::{RequestFilter, SubmitReimbursementRequest},
};
use crate::shared::AppError;
use crate::user::models::UserModel;

/// Service layer for reimbursement request business logic
pub struct ReimbursementService {
    repository: Arc<dyn ReimbursementRepository + Send + Sync>,
}

impl ReimbursementService {
    pub fn new(repository: Arc<dyn ReimbursementRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Stores a submission raised by `submitter`
    #[instrument(skip(self, request, submitter), fields(employee_id = %submitter.id))]
    pub async fn submit(
        &self,
        request: SubmitReimbursementRequest,
        submitter: &UserModel,
    ) -> Result<ReimbursementModel, AppError> {
        if let Some(claimed) = request.raised_by.as_deref() {
            if claimed != submitter.id {
                warn!(claimed_id = %claimed, "Ignoring raisedBy that differs from the caller");
            }
        }

        let model = ReimbursementModel::new(request, submitter);
        self.repository.create_request(&model).await?;

        info!(request_id = %model.id, amount = model.amount, "Reimbursement request stored");
        Ok(model)
    }

    pub async fn list_all(&self) -> Result<Vec<ReimbursementModel>, AppError> {
        self.repository.list_requests().await
    }

    pub async fn filter(&self, filter: RequestFilter) -> Result<Vec<ReimbursementModel>, AppError> {
        self.repository.filter_requests(&filter.normalized()).await
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
    ) -> Result<ReimbursementModel, AppError> {
        let updated = self
            .repository
            .update_status(id, status)
            .await?
            .ok_or_else(|| {
                warn!("Status update for unknown reimbursement request");
                AppError::NotFound("Reimbursement request not found".to_string())
            })?;

        info!(status = %updated.status, "Reimbursement request status updated");
        Ok(updated)
    }
}
