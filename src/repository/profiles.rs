use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::{classify, ProfileStore, RepoResult, RepositoryError, SqliteRepository};
use crate::db::models::{Profile, ProfileData};

const PROFILE_COLUMNS: &str =
    "id, account_id, status, bio, avatar, date_of_birth, user_image_id, is_active";

fn profile_from_row(row: &Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        user: row.get(1)?,
        status: row.get(2)?,
        bio: row.get(3)?,
        avatar: row.get(4)?,
        date_of_birth: row.get(5)?,
        user_image: row.get(6)?,
        is_active: row.get(7)?,
    })
}

#[async_trait]
impl ProfileStore for SqliteRepository {
    async fn list_profiles(&self) -> RepoResult<Vec<Profile>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY id"
        ))?;
        let profiles = stmt
            .query_map([], profile_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    async fn get_profile(&self, id: i64) -> RepoResult<Option<Profile>> {
        let conn = self.pool.get()?;
        let profile = conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
                params![id],
                profile_from_row,
            )
            .optional()?;
        Ok(profile)
    }

    async fn find_profile_by_account(&self, account_id: i64) -> RepoResult<Option<Profile>> {
        let conn = self.pool.get()?;
        let profile = conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE account_id = ?1"),
                params![account_id],
                profile_from_row,
            )
            .optional()?;
        Ok(profile)
    }

    async fn create_profile(&self, data: ProfileData) -> RepoResult<Profile> {
        let id = {
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO profiles
                    (account_id, status, bio, avatar, date_of_birth, user_image_id, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    data.user,
                    data.status,
                    data.bio,
                    data.avatar,
                    data.date_of_birth,
                    data.user_image,
                    data.is_active
                ],
            )
            .map_err(classify)?;
            conn.last_insert_rowid()
        };

        tracing::info!("Created profile {} for account {}", id, data.user);
        self.get_profile(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn update_profile(&self, id: i64, data: ProfileData) -> RepoResult<Profile> {
        let rows = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE profiles SET
                    account_id = ?1, status = ?2, bio = ?3, avatar = ?4,
                    date_of_birth = ?5, user_image_id = ?6, is_active = ?7
                 WHERE id = ?8",
                params![
                    data.user,
                    data.status,
                    data.bio,
                    data.avatar,
                    data.date_of_birth,
                    data.user_image,
                    data.is_active,
                    id
                ],
            )
            .map_err(classify)?
        };
        if rows == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_profile(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete_profile(&self, id: i64) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM profiles WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!("Deleted profile {}", id);
        Ok(())
    }
}
