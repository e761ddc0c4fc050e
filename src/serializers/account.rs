use serde_json::Value;

use super::{require, Fields};
use crate::error::AppResult;
use crate::repository::{AccountStore, Repository};

/// A validated registration payload. The password is still plaintext here and
/// must only leave this struct through the hashing step.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl Registration {
    /// Applies field rules and uniqueness checks; nothing is written.
    pub async fn validate(body: &Value, repo: &dyn Repository) -> AppResult<Self> {
        let mut fields = Fields::new(body, false)?;

        let username = fields.required_str("username", Some(50));
        let email = fields.email("email", 255);
        let password = fields.required_str("password", None);
        let first_name = fields.required_str("first_name", Some(155));
        let last_name = fields.required_str("last_name", Some(155));

        if let Some(ref username) = username {
            if repo.find_account_by_username(username).await?.is_some() {
                fields.error("username", "user with this username already exists.");
            }
        }
        if let Some(ref email) = email {
            if repo.find_account_by_email(email).await?.is_some() {
                fields.error("email", "user with this email already exists.");
            }
        }

        fields.finish()?;

        Ok(Self {
            username: require(username, "username")?,
            email: require(email, "email")?,
            first_name: require(first_name, "first_name")?,
            last_name: require(last_name, "last_name")?,
            password: require(password, "password")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::repository::test_support::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "username": "alice",
            "email": "alice@example.com",
            "first_name": "Alice",
            "last_name": "Liddell",
            "password": "wonderland",
        })
    }

    #[tokio::test]
    async fn valid_payload_passes() {
        let (repo, _temp) = create_test_repo();
        let registration = Registration::validate(&payload(), &repo).await.unwrap();
        assert_eq!(registration.username, "alice");
        assert_eq!(registration.password, "wonderland");
    }

    #[tokio::test]
    async fn missing_fields_are_all_reported() {
        let (repo, _temp) = create_test_repo();
        match Registration::validate(&json!({ "username": "alice" }), &repo).await {
            Err(AppError::Validation(errors)) => {
                let keys: Vec<&str> = errors.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["email", "first_name", "last_name", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn taken_username_and_email_are_reported() {
        let (repo, _temp) = create_test_repo();
        seed_account(&repo, "alice").await;

        match Registration::validate(&payload(), &repo).await {
            Err(AppError::Validation(errors)) => {
                assert_eq!(
                    errors["username"],
                    vec!["user with this username already exists.".to_string()]
                );
                assert_eq!(
                    errors["email"],
                    vec!["user with this email already exists.".to_string()]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let (repo, _temp) = create_test_repo();
        let mut body = payload();
        body["email"] = json!("not-an-email");
        match Registration::validate(&body, &repo).await {
            Err(AppError::Validation(errors)) => {
                assert_eq!(
                    errors["email"],
                    vec!["Enter a valid email address.".to_string()]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
