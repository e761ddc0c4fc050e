use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    classify, classify_reference, load_ids, PostStore, RepoResult, RepositoryError,
    SqliteRepository,
};
use crate::db::models::{NewPost, Post};

const POST_COLUMNS: &str = "p.id, p.title, p.created_date, p.updated_date, p.count_of_views, \
     p.count_of_likes, p.is_active, p.author_id, p.community_id";

const CATEGORY_IDS_SQL: &str =
    "SELECT category_id FROM post_categories WHERE post_id = ?1 ORDER BY category_id";

fn post_from_row(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        created_date: row.get(2)?,
        updated_date: row.get(3)?,
        count_of_views: row.get(4)?,
        count_of_likes: row.get(5)?,
        is_active: row.get(6)?,
        author: row.get(7)?,
        community: row.get(8)?,
        categories: Vec::new(),
    })
}

/// Runs a post query and fills in each row's category set.
fn query_posts(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<Post>> {
    let mut posts = {
        let mut stmt = conn.prepare(sql)?;
        let posts = stmt
            .query_map(params, post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        posts
    };
    for post in &mut posts {
        post.categories = load_ids(conn, CATEGORY_IDS_SQL, post.id)?;
    }
    Ok(posts)
}

fn load_post(conn: &Connection, id: i64) -> rusqlite::Result<Option<Post>> {
    let post = conn
        .query_row(
            &format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?1"),
            params![id],
            post_from_row,
        )
        .optional()?;

    match post {
        Some(mut post) => {
            post.categories = load_ids(conn, CATEGORY_IDS_SQL, post.id)?;
            Ok(Some(post))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl PostStore for SqliteRepository {
    async fn list_posts(&self) -> RepoResult<Vec<Post>> {
        let conn = self.pool.get()?;
        let posts = query_posts(
            &conn,
            &format!("SELECT {POST_COLUMNS} FROM posts p ORDER BY p.id"),
            [],
        )?;
        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> RepoResult<Option<Post>> {
        let conn = self.pool.get()?;
        Ok(load_post(&conn, id)?)
    }

    async fn list_posts_by_category(&self, category_id: i64) -> RepoResult<Vec<Post>> {
        let conn = self.pool.get()?;
        let posts = query_posts(
            &conn,
            &format!(
                "SELECT {POST_COLUMNS} FROM posts p
                 JOIN post_categories pc ON pc.post_id = p.id
                 WHERE pc.category_id = ?1
                 ORDER BY p.id"
            ),
            params![category_id],
        )?;
        Ok(posts)
    }

    async fn create_post(&self, post: NewPost) -> RepoResult<Post> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let now = Utc::now();

        tx.execute(
            "INSERT INTO posts
                (title, created_date, updated_date, count_of_views, count_of_likes,
                 is_active, author_id, community_id)
             VALUES (?1, ?2, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                post.title,
                now,
                post.count_of_views,
                post.count_of_likes,
                post.is_active,
                post.author,
                post.community
            ],
        )
        .map_err(classify)?;
        let id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?1, ?2)",
            )?;
            for category_id in &post.categories {
                stmt.execute(params![id, category_id])
                    .map_err(classify_reference("categories"))?;
            }
        }

        let created = load_post(&tx, id)?.ok_or(RepositoryError::NotFound)?;
        tx.commit()?;

        tracing::info!("Created post {} in community {}", id, created.community);
        Ok(created)
    }

    async fn delete_post(&self, id: i64) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
