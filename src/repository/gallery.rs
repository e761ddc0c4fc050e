use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use super::{classify_reference, GalleryStore, RepoResult, RepositoryError, SqliteRepository};
use crate::db::models::GalleryImage;

#[async_trait]
impl GalleryStore for SqliteRepository {
    async fn create_gallery_image(
        &self,
        account_id: i64,
        image: &str,
    ) -> RepoResult<GalleryImage> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO gallery_images (account_id, image) VALUES (?1, ?2)",
            params![account_id, image],
        )
        .map_err(classify_reference("user"))?;

        Ok(GalleryImage {
            id: conn.last_insert_rowid(),
            user: account_id,
            image: image.to_string(),
        })
    }

    async fn get_gallery_image(&self, id: i64) -> RepoResult<Option<GalleryImage>> {
        let conn = self.pool.get()?;
        let image = conn
            .query_row(
                "SELECT id, account_id, image FROM gallery_images WHERE id = ?1",
                params![id],
                |row| {
                    Ok(GalleryImage {
                        id: row.get(0)?,
                        user: row.get(1)?,
                        image: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(image)
    }

    async fn delete_gallery_image(&self, id: i64) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM gallery_images WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::ProfileStore;
    use super::*;
    use crate::db::models::ProfileData;

    #[tokio::test]
    async fn deleting_image_clears_profile_reference() {
        let (repo, _temp) = create_test_repo();
        let account = seed_account(&repo, "alice").await;
        let image = repo
            .create_gallery_image(account.id, "user_images/cat.png")
            .await
            .unwrap();

        let profile = repo
            .create_profile(ProfileData {
                user: account.id,
                status: None,
                bio: String::new(),
                avatar: None,
                date_of_birth: None,
                user_image: Some(image.id),
                is_active: true,
            })
            .await
            .unwrap();
        assert_eq!(profile.user_image, Some(image.id));

        repo.delete_gallery_image(image.id).await.unwrap();

        let reloaded = repo.get_profile(profile.id).await.unwrap().unwrap();
        assert_eq!(reloaded.user_image, None);
        assert!(repo.get_gallery_image(image.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn account_may_own_many_images() {
        let (repo, _temp) = create_test_repo();
        let account = seed_account(&repo, "alice").await;

        let first = repo
            .create_gallery_image(account.id, "user_images/a.png")
            .await
            .unwrap();
        let second = repo
            .create_gallery_image(account.id, "user_images/b.png")
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        let fetched = repo.get_gallery_image(second.id).await.unwrap().unwrap();
        assert_eq!(fetched.user, account.id);
        assert_eq!(fetched.image, "user_images/b.png");
    }

    #[tokio::test]
    async fn deleting_missing_image_is_not_found() {
        let (repo, _temp) = create_test_repo();
        assert!(matches!(
            repo.delete_gallery_image(7).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
