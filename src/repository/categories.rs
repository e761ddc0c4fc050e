use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::{CategoryStore, RepoResult, SqliteRepository};
use crate::db::models::Category;

fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        is_active: row.get(2)?,
    })
}

#[async_trait]
impl CategoryStore for SqliteRepository {
    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT id, name, is_active FROM categories ORDER BY id")?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> RepoResult<Option<Category>> {
        let conn = self.pool.get()?;
        let category = conn
            .query_row(
                "SELECT id, name, is_active FROM categories WHERE id = ?1",
                params![id],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    async fn create_category(&self, name: &str) -> RepoResult<Category> {
        let conn = self.pool.get()?;
        conn.execute("INSERT INTO categories (name) VALUES (?1)", params![name])?;
        let id = conn.last_insert_rowid();
        tracing::info!("Created category {} ({})", name, id);

        Ok(Category {
            id,
            name: name.to_string(),
            is_active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn list_includes_inactive_categories() {
        let (repo, _temp) = create_test_repo();
        let news = repo.create_category("news").await.unwrap();
        let old = repo.create_category("archive").await.unwrap();

        {
            let conn = repo.pool.get().unwrap();
            conn.execute(
                "UPDATE categories SET is_active = 0 WHERE id = ?1",
                params![old.id],
            )
            .unwrap();
        }

        let listed = repo.list_categories().await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![news.id, old.id]);
        assert!(!listed[1].is_active);
    }

    #[tokio::test]
    async fn get_category_by_id() {
        let (repo, _temp) = create_test_repo();
        let news = repo.create_category("news").await.unwrap();

        let fetched = repo.get_category(news.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "news");
        assert!(fetched.is_active);
        assert!(repo.get_category(news.id + 1).await.unwrap().is_none());
    }
}
