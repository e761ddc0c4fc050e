use serde_json::Value;

use crate::auth::password::hash_password;
use crate::db::models::{Account, NewAccount};
use crate::error::AppResult;
use crate::repository::{AccountStore, Repository};
use crate::serializers::account::Registration;

/// Validates a registration payload and creates a regular account.
pub async fn register(repo: &dyn Repository, body: &Value, bcrypt_cost: u32) -> AppResult<Account> {
    let registration = Registration::validate(body, repo).await?;
    create_account(repo, registration, false, bcrypt_cost).await
}

/// Same validation and hashing as [`register`], but the account is an admin.
pub async fn create_superuser(
    repo: &dyn Repository,
    body: &Value,
    bcrypt_cost: u32,
) -> AppResult<Account> {
    let registration = Registration::validate(body, repo).await?;
    create_account(repo, registration, true, bcrypt_cost).await
}

async fn create_account(
    repo: &dyn Repository,
    registration: Registration,
    is_admin: bool,
    bcrypt_cost: u32,
) -> AppResult<Account> {
    let Registration {
        username,
        email,
        first_name,
        last_name,
        password,
    } = registration;

    let password_hash = hash_password(password, bcrypt_cost).await?;

    let account = repo
        .create_account(NewAccount {
            username,
            email,
            first_name,
            last_name,
            password_hash,
            is_admin,
        })
        .await?;
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::error::AppError;
    use crate::repository::test_support::*;
    use serde_json::json;

    fn payload(username: &str) -> Value {
        json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "first_name": "Ada",
            "last_name": "Lovelace",
            "password": "analytical-engine",
        })
    }

    #[tokio::test]
    async fn register_stores_only_a_hash() {
        let (repo, _temp) = create_test_repo();
        let account = register(&repo, &payload("ada"), 4).await.unwrap();

        assert_ne!(account.password, "analytical-engine");
        assert!(verify_password("analytical-engine", &account.password));
        assert!(!account.is_admin);
        assert!(!account.is_staff());
        assert!(account.is_active);
    }

    #[tokio::test]
    async fn superuser_is_admin_and_staff() {
        let (repo, _temp) = create_test_repo();
        let account = create_superuser(&repo, &payload("root"), 4).await.unwrap();

        assert!(account.is_admin);
        assert!(account.is_staff());
        assert!(verify_password("analytical-engine", &account.password));
    }

    #[tokio::test]
    async fn duplicate_registration_creates_nothing() {
        let (repo, _temp) = create_test_repo();
        let first = register(&repo, &payload("ada"), 4).await.unwrap();

        let result = register(&repo, &payload("ada"), 4).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let stored = repo.find_account_by_username("ada").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert!(repo.get_account(first.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn superuser_path_validates_like_registration() {
        let (repo, _temp) = create_test_repo();
        let result = create_superuser(&repo, &json!({ "username": "root" }), 4).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(repo.find_account_by_username("root").await.unwrap().is_none());
    }
}
