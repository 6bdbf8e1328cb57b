use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Token ids revoked by logout, each kept until the token would have expired anyway
#[derive(Default)]
pub struct RevocationList {
    revoked: RwLock<HashMap<String, usize>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn revoke(&self, jti: &str, exp: usize) {
        let now = Utc::now().timestamp() as usize;
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, expires_at| *expires_at > now);
        revoked.insert(jti.to_string(), exp);
        debug!(revoked_count = revoked.len(), "Revoked token");
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.read().await.contains_key(jti)
    }

    #[cfg(test)]
    pub async fn revoked_count(&self) -> usize {
        self.revoked.read().await.len()
    }
}
