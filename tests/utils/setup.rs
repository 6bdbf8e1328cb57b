use axum::Router;
use reimburse::{
    create_router,
    reimbursement::repository::InMemoryReimbursementRepository,
    user::repository::InMemoryUserRepository,
    AppState, TokenConfig,
};
use std::sync::Arc;

/// The full router over in-memory repositories, with handles to the stores
pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub requests: Arc<InMemoryReimbursementRepository>,
}

pub struct TestAppBuilder {
    secret: String,
    expiration_hours: i64,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            secret: "integration-secret".to_string(),
            expiration_hours: 1,
        }
    }

    pub fn with_expiration_hours(mut self, hours: i64) -> Self {
        self.expiration_hours = hours;
        self
    }

    pub fn build(self) -> TestApp {
        let users = Arc::new(InMemoryUserRepository::new());
        let requests = Arc::new(InMemoryReimbursementRepository::new());
        let state = AppState::new(
            users.clone(),
            requests.clone(),
            TokenConfig::new(&self.secret, self.expiration_hours),
        );

        TestApp {
            router: create_router(state),
            users,
            requests,
        }
    }
}
