use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", token);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    pub async fn register(&self, email: &str, password: &str, role: &str, fname: &str) -> TestResponse {
        self.send(
            "POST",
            "/register",
            None,
            Some(json!({
                "email": email,
                "password": password,
                "role": role,
                "fname": fname
            })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers and logs in, returning `Bearer <token>`
    pub async fn signed_in(&self, email: &str, role: &str, fname: &str) -> String {
        let registered = self.register(email, "password123", role, fname).await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let login = self.login(email, "password123").await;
        assert_eq!(login.status, StatusCode::OK);
        format!("Bearer {}", login.body["token"].as_str().unwrap())
    }

    pub async fn submit(&self, token: &str, body: Value) -> TestResponse {
        self.send("POST", "/submit-reimbursement", Some(token), Some(body))
            .await
    }

    pub async fn update_status(&self, token: &str, id: &str, status: Value) -> TestResponse {
        self.send(
            "PATCH",
            &format!("/admin/requests/{id}"),
            Some(token),
            Some(json!({ "status": status })),
        )
        .await
    }
}
