use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Row};

use super::{classify, CommentStore, RepoResult, SqliteRepository};
use crate::db::models::{Comment, NewComment};

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        body: row.get(1)?,
        user: row.get(2)?,
        post: row.get(3)?,
        created_date: row.get(4)?,
        updated_date: row.get(5)?,
        is_active: row.get(6)?,
    })
}

#[async_trait]
impl CommentStore for SqliteRepository {
    async fn create_comment(&self, comment: NewComment) -> RepoResult<Comment> {
        let conn = self.pool.get()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO comments (body, profile_id, post_id, created_date, updated_date)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![comment.body, comment.user, comment.post, now],
        )
        .map_err(classify)?;

        Ok(Comment {
            id: conn.last_insert_rowid(),
            body: comment.body,
            user: comment.user,
            post: comment.post,
            created_date: now,
            updated_date: now,
            is_active: true,
        })
    }

    async fn list_comments_for_post(&self, post_id: i64) -> RepoResult<Vec<Comment>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, body, profile_id, post_id, created_date, updated_date, is_active
             FROM comments WHERE post_id = ?1 ORDER BY id",
        )?;
        let comments = stmt
            .query_map(params![post_id], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }
}
