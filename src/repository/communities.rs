use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    classify, classify_reference, load_ids, CommunityStore, RepoResult, RepositoryError,
    SqliteRepository,
};
use crate::db::models::{Community, CommunityData};

fn load_community(conn: &Connection, id: i64) -> rusqlite::Result<Option<Community>> {
    let row = conn
        .query_row(
            "SELECT id, name, description FROM communities WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, description)) = row else {
        return Ok(None);
    };

    Ok(Some(Community {
        id,
        name,
        description,
        members: load_ids(
            conn,
            "SELECT profile_id FROM community_members WHERE community_id = ?1 ORDER BY profile_id",
            id,
        )?,
        moderators: load_ids(
            conn,
            "SELECT profile_id FROM community_moderators WHERE community_id = ?1 ORDER BY profile_id",
            id,
        )?,
    }))
}

/// Replaces both profile sets of a community.
fn write_memberships(
    conn: &Connection,
    community_id: i64,
    data: &CommunityData,
) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM community_members WHERE community_id = ?1",
        params![community_id],
    )?;
    conn.execute(
        "DELETE FROM community_moderators WHERE community_id = ?1",
        params![community_id],
    )?;

    let mut members = conn.prepare_cached(
        "INSERT OR IGNORE INTO community_members (community_id, profile_id) VALUES (?1, ?2)",
    )?;
    for profile_id in &data.members {
        members
            .execute(params![community_id, profile_id])
            .map_err(classify_reference("members"))?;
    }

    let mut moderators = conn.prepare_cached(
        "INSERT OR IGNORE INTO community_moderators (community_id, profile_id) VALUES (?1, ?2)",
    )?;
    for profile_id in &data.moderators {
        moderators
            .execute(params![community_id, profile_id])
            .map_err(classify_reference("moderators"))?;
    }

    Ok(())
}

#[async_trait]
impl CommunityStore for SqliteRepository {
    async fn list_communities(&self) -> RepoResult<Vec<Community>> {
        let conn = self.pool.get()?;
        let ids = {
            let mut stmt = conn.prepare("SELECT id FROM communities ORDER BY id")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };

        let mut communities = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(community) = load_community(&conn, id)? {
                communities.push(community);
            }
        }
        Ok(communities)
    }

    async fn get_community(&self, id: i64) -> RepoResult<Option<Community>> {
        let conn = self.pool.get()?;
        Ok(load_community(&conn, id)?)
    }

    async fn find_community_by_name(&self, name: &str) -> RepoResult<Option<Community>> {
        let conn = self.pool.get()?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM communities WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        match id {
            Some(id) => Ok(load_community(&conn, id)?),
            None => Ok(None),
        }
    }

    async fn create_community(&self, data: CommunityData) -> RepoResult<Community> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO communities (name, description) VALUES (?1, ?2)",
            params![data.name, data.description],
        )
        .map_err(classify)?;
        let id = tx.last_insert_rowid();
        write_memberships(&tx, id, &data)?;

        let community = load_community(&tx, id)?.ok_or(RepositoryError::NotFound)?;
        tx.commit()?;

        tracing::info!("Created community {} ({})", community.name, id);
        Ok(community)
    }

    async fn update_community(&self, id: i64, data: CommunityData) -> RepoResult<Community> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let rows = tx
            .execute(
                "UPDATE communities SET name = ?1, description = ?2 WHERE id = ?3",
                params![data.name, data.description, id],
            )
            .map_err(classify)?;
        if rows == 0 {
            return Err(RepositoryError::NotFound);
        }
        write_memberships(&tx, id, &data)?;

        let community = load_community(&tx, id)?.ok_or(RepositoryError::NotFound)?;
        tx.commit()?;
        Ok(community)
    }

    async fn delete_community(&self, id: i64) -> RepoResult<()> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM communities WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!("Deleted community {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{CategoryStore, CommentStore, PostStore};
    use super::*;
    use crate::db::models::NewComment;

    #[tokio::test]
    async fn member_and_moderator_sets_are_independent() {
        let (repo, _temp) = create_test_repo();
        let alice = seed_profile(&repo, "alice").await;
        let bob = seed_profile(&repo, "bob").await;
        let carol = seed_profile(&repo, "carol").await;

        let community = repo
            .create_community(CommunityData {
                name: "rust".to_string(),
                description: "crabs".to_string(),
                members: vec![bob.id, alice.id],
                moderators: vec![carol.id],
            })
            .await
            .unwrap();

        assert_eq!(community.members, vec![alice.id, bob.id]);
        assert_eq!(community.moderators, vec![carol.id]);
        assert_eq!(
            repo.get_community(community.id).await.unwrap(),
            Some(community)
        );
    }

    #[tokio::test]
    async fn duplicate_name_is_conflict_and_rolls_back() {
        let (repo, _temp) = create_test_repo();
        let alice = seed_profile(&repo, "alice").await;
        seed_community(&repo, "rust", alice.id).await;

        let result = repo
            .create_community(CommunityData {
                name: "rust".to_string(),
                description: "again".to_string(),
                members: vec![alice.id],
                moderators: vec![alice.id],
            })
            .await;

        match result {
            Err(RepositoryError::Conflict { field, .. }) => assert_eq!(field, "name"),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(repo.list_communities().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_replaces_sets() {
        let (repo, _temp) = create_test_repo();
        let alice = seed_profile(&repo, "alice").await;
        let bob = seed_profile(&repo, "bob").await;
        let community = seed_community(&repo, "rust", alice.id).await;

        let updated = repo
            .update_community(
                community.id,
                CommunityData {
                    name: "rustaceans".to_string(),
                    description: "more crabs".to_string(),
                    members: vec![bob.id],
                    moderators: vec![alice.id, bob.id],
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "rustaceans");
        assert_eq!(updated.members, vec![bob.id]);
        assert_eq!(updated.moderators, vec![alice.id, bob.id]);
        assert!(repo.find_community_by_name("rust").await.unwrap().is_none());
        assert_eq!(
            repo.find_community_by_name("rustaceans")
                .await
                .unwrap()
                .map(|c| c.id),
            Some(community.id)
        );
    }

    #[tokio::test]
    async fn update_missing_community_is_not_found() {
        let (repo, _temp) = create_test_repo();
        let result = repo
            .update_community(
                3,
                CommunityData {
                    name: "x".to_string(),
                    description: "y".to_string(),
                    members: vec![],
                    moderators: vec![],
                },
            )
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn delete_cascades_to_posts_and_comments() {
        let (repo, _temp) = create_test_repo();
        let alice = seed_profile(&repo, "alice").await;
        let doomed = seed_community(&repo, "doomed", alice.id).await;
        let kept = seed_community(&repo, "kept", alice.id).await;
        let category = repo.create_category("news").await.unwrap();

        let gone = seed_post(&repo, "gone", alice.id, doomed.id, vec![category.id]).await;
        let stays = seed_post(&repo, "stays", alice.id, kept.id, vec![category.id]).await;
        let comment = repo
            .create_comment(NewComment {
                body: "bye".to_string(),
                user: alice.id,
                post: gone.id,
            })
            .await
            .unwrap();

        repo.delete_community(doomed.id).await.unwrap();

        assert!(repo.get_community(doomed.id).await.unwrap().is_none());
        assert!(repo.get_post(gone.id).await.unwrap().is_none());
        assert!(repo.get_post(stays.id).await.unwrap().is_some());
        assert!(repo
            .list_comments_for_post(gone.id)
            .await
            .unwrap()
            .iter()
            .all(|c| c.id != comment.id));
        assert_eq!(
            repo.list_posts_by_category(category.id)
                .await
                .unwrap()
                .iter()
                .map(|p| p.id)
                .collect::<Vec<_>>(),
            vec![stays.id]
        );
    }

    #[tokio::test]
    async fn vanished_member_is_a_field_conflict() {
        let (repo, _temp) = create_test_repo();
        let alice = seed_profile(&repo, "alice").await;

        let result = repo
            .create_community(CommunityData {
                name: "rust".to_string(),
                description: "crabs".to_string(),
                members: vec![alice.id],
                moderators: vec![alice.id, 999],
            })
            .await;
        match result {
            Err(RepositoryError::Conflict { field, .. }) => assert_eq!(field, "moderators"),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert!(repo.find_community_by_name("rust").await.unwrap().is_none());
    }
}
