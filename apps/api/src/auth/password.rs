use std::sync::Arc;

use anyhow::anyhow;
use tracing::info;

use crate::errors::AppError;

/// Compares passwords against the one configured bcrypt hash.
/// Without a hash the gate is open and every password is accepted.
#[derive(Debug, Clone)]
pub struct PasswordGate {
    hash: Option<Arc<str>>,
}

impl PasswordGate {
    pub fn new(hash: Option<String>) -> Self {
        let hash = hash.filter(|h| !h.trim().is_empty()).map(Arc::from);
        if hash.is_none() {
            info!("EDIT_PASSWORD_HASH not set; editor is unprotected");
        }
        Self { hash }
    }

    pub fn is_enabled(&self) -> bool {
        self.hash.is_some()
    }

    /// A malformed hash is a configuration problem, not a wrong password.
    /// bcrypt runs on the blocking pool so logins never stall the runtime.
    pub async fn verify(&self, password: &str) -> Result<bool, AppError> {
        let Some(hash) = self.hash.clone() else {
            return Ok(true);
        };
        let password = password.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(anyhow!("Password check aborted: {e}")))?
            .map_err(|e| AppError::Internal(anyhow!("Invalid EDIT_PASSWORD_HASH: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate_for(password: &str) -> PasswordGate {
        PasswordGate::new(Some(bcrypt::hash(password, 4).unwrap()))
    }

    #[tokio::test]
    async fn test_correct_password_verifies() {
        let gate = gate_for("hunter2");
        assert!(gate.is_enabled());
        assert!(gate.verify("hunter2").await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        assert!(!gate_for("hunter2").verify("hunter3").await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_hash_disables_gate() {
        let gate = PasswordGate::new(Some("   ".to_string()));
        assert!(!gate.is_enabled());
        assert!(gate.verify("anything").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal_error() {
        let gate = PasswordGate::new(Some("not-a-bcrypt-hash".to_string()));
        assert!(matches!(gate.verify("hunter2").await, Err(AppError::Internal(_))));
    }
}
