// Repository pattern - isolates all database side effects
mod accounts;
mod categories;
mod comments;
mod communities;
mod gallery;
mod posts;
mod profiles;

use async_trait::async_trait;
use rusqlite::ErrorCode;
use thiserror::Error;

use crate::db::models::*;
use crate::state::DbPool;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Not found")]
    NotFound,

    #[error("Conflict on {field}: {message}")]
    Conflict { field: String, message: String },
}

pub type RepoResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(&self, account: NewAccount) -> RepoResult<Account>;

    async fn get_account(&self, id: i64) -> RepoResult<Option<Account>>;

    async fn find_account_by_username(&self, username: &str) -> RepoResult<Option<Account>>;

    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>>;
}

#[async_trait]
pub trait GalleryStore: Send + Sync {
    async fn create_gallery_image(&self, account_id: i64, image: &str)
        -> RepoResult<GalleryImage>;

    async fn get_gallery_image(&self, id: i64) -> RepoResult<Option<GalleryImage>>;

    /// Profiles pointing at the image keep existing with an empty reference.
    async fn delete_gallery_image(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn list_profiles(&self) -> RepoResult<Vec<Profile>>;

    async fn get_profile(&self, id: i64) -> RepoResult<Option<Profile>>;

    async fn find_profile_by_account(&self, account_id: i64) -> RepoResult<Option<Profile>>;

    async fn create_profile(&self, data: ProfileData) -> RepoResult<Profile>;

    async fn update_profile(&self, id: i64, data: ProfileData) -> RepoResult<Profile>;

    /// Cascades to the profile's posts and comments and drops its community memberships.
    async fn delete_profile(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list_categories(&self) -> RepoResult<Vec<Category>>;

    async fn get_category(&self, id: i64) -> RepoResult<Option<Category>>;

    async fn create_category(&self, name: &str) -> RepoResult<Category>;
}

#[async_trait]
pub trait CommunityStore: Send + Sync {
    async fn list_communities(&self) -> RepoResult<Vec<Community>>;

    async fn get_community(&self, id: i64) -> RepoResult<Option<Community>>;

    async fn find_community_by_name(&self, name: &str) -> RepoResult<Option<Community>>;

    async fn create_community(&self, data: CommunityData) -> RepoResult<Community>;

    async fn update_community(&self, id: i64, data: CommunityData) -> RepoResult<Community>;

    /// Cascades to the community's posts and, through them, their comments.
    async fn delete_community(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn list_posts(&self) -> RepoResult<Vec<Post>>;

    async fn get_post(&self, id: i64) -> RepoResult<Option<Post>>;

    async fn list_posts_by_category(&self, category_id: i64) -> RepoResult<Vec<Post>>;

    async fn create_post(&self, post: NewPost) -> RepoResult<Post>;

    async fn delete_post(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_comment(&self, comment: NewComment) -> RepoResult<Comment>;

    async fn list_comments_for_post(&self, post_id: i64) -> RepoResult<Vec<Comment>>;
}

/// Everything the HTTP handlers need from persistence.
pub trait Repository:
    AccountStore
    + GalleryStore
    + ProfileStore
    + CategoryStore
    + CommunityStore
    + PostStore
    + CommentStore
{
}

impl<T> Repository for T where
    T: AccountStore
        + GalleryStore
        + ProfileStore
        + CategoryStore
        + CommunityStore
        + PostStore
        + CommentStore
{
}

/// SQLite implementation
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Message for a reference that vanished between validation and the write.
const REFERENCE_GONE: &str = "A referenced object does not exist.";

/// Turns UNIQUE and FOREIGN KEY violations into field-level conflicts; anything else stays a
/// SQL error. SQLite does not name the column of a failed foreign key, so those land on
/// `non_field_errors`.
fn classify(err: rusqlite::Error) -> RepositoryError {
    classify_reference("non_field_errors")(err)
}

/// Like [`classify`], but a FOREIGN KEY violation is reported on `field`.
fn classify_reference(field: &'static str) -> impl Fn(rusqlite::Error) -> RepositoryError {
    move |err| {
        if is_foreign_key_violation(&err) {
            return RepositoryError::Conflict {
                field: field.to_string(),
                message: REFERENCE_GONE.to_string(),
            };
        }
        classify_unique(err)
    }
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, Some(msg))
            if code.code == ErrorCode::ConstraintViolation
                && msg.starts_with("FOREIGN KEY constraint failed")
    )
}

fn classify_unique(err: rusqlite::Error) -> RepositoryError {
    if let rusqlite::Error::SqliteFailure(code, Some(msg)) = &err {
        if code.code == ErrorCode::ConstraintViolation {
            if let Some(target) = msg.strip_prefix("UNIQUE constraint failed: ") {
                if let Some((field, message)) = unique_violation(target) {
                    return RepositoryError::Conflict {
                        field: field.to_string(),
                        message: message.to_string(),
                    };
                }
            }
        }
    }
    RepositoryError::Sql(err)
}

fn unique_violation(target: &str) -> Option<(&'static str, &'static str)> {
    match target {
        "accounts.username" => Some(("username", "user with this username already exists.")),
        "accounts.email" => Some(("email", "user with this email already exists.")),
        "profiles.account_id" => Some(("user", "user profile with this user already exists.")),
        "communities.name" => Some(("name", "community with this name already exists.")),
        _ => None,
    }
}

/// Collects an id column for one owner row, ordered by id.
fn load_ids(
    conn: &rusqlite::Connection,
    sql: &str,
    owner_id: i64,
) -> Result<Vec<i64>, rusqlite::Error> {
    let mut stmt = conn.prepare_cached(sql)?;
    let ids = stmt
        .query_map([owner_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db;

    pub fn create_test_repo() -> (SqliteRepository, tempfile::TempDir) {
        let temp = tempfile::tempdir().unwrap();
        let pool = db::create_pool(&temp.path().join("test.db")).unwrap();
        db::run_migrations(&pool).unwrap();
        (SqliteRepository::new(pool), temp)
    }

    pub async fn seed_account(repo: &SqliteRepository, username: &str) -> Account {
        repo.create_account(NewAccount {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            is_admin: false,
        })
        .await
        .unwrap()
    }

    pub async fn seed_profile(repo: &SqliteRepository, username: &str) -> Profile {
        let account = seed_account(repo, username).await;
        repo.create_profile(ProfileData {
            user: account.id,
            status: None,
            bio: String::new(),
            avatar: None,
            date_of_birth: None,
            user_image: None,
            is_active: true,
        })
        .await
        .unwrap()
    }

    pub async fn seed_community(repo: &SqliteRepository, name: &str, member: i64) -> Community {
        repo.create_community(CommunityData {
            name: name.to_string(),
            description: format!("All about {name}"),
            members: vec![member],
            moderators: vec![member],
        })
        .await
        .unwrap()
    }

    pub async fn seed_post(
        repo: &SqliteRepository,
        title: &str,
        author: i64,
        community: i64,
        categories: Vec<i64>,
    ) -> Post {
        repo.create_post(NewPost {
            title: title.to_string(),
            count_of_views: 0,
            count_of_likes: 0,
            is_active: true,
            author,
            community,
            categories,
        })
        .await
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_map_to_wire_fields() {
        assert_eq!(unique_violation("accounts.username").unwrap().0, "username");
        assert_eq!(unique_violation("accounts.email").unwrap().0, "email");
        assert_eq!(unique_violation("profiles.account_id").unwrap().0, "user");
        assert_eq!(unique_violation("communities.name").unwrap().0, "name");
        assert!(unique_violation("post_categories.post_id, post_categories.category_id").is_none());
    }

    #[test]
    fn classify_keeps_non_constraint_errors() {
        let err = classify(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, RepositoryError::Sql(_)));
    }
}
