use crate::error::{AppError, AppResult};

/// Hashes a plaintext password with bcrypt. There is no plaintext fallback.
pub async fn hash_password(plaintext: String, cost: u32) -> AppResult<String> {
    // bcrypt is deliberately slow; keep it off the async workers
    tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {e}")))?
        .map_err(AppError::from)
}

#[cfg(test)]
pub(crate) fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_is_not_plaintext_and_verifies() {
        let hash = hash_password("hunter2".to_string(), 4).await.unwrap();
        assert_ne!(hash, "hunter2");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let a = hash_password("same".to_string(), 4).await.unwrap();
        let b = hash_password("same".to_string(), 4).await.unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[tokio::test]
    async fn invalid_cost_is_an_error() {
        assert!(hash_password("x".to_string(), 2).await.is_err());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("x", "not-a-bcrypt-hash"));
    }
}
