use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{does_not_exist, require, Fields};
use crate::db::models::{NewPost, Post};
use crate::error::AppResult;
use crate::repository::{CategoryStore, CommunityStore, ProfileStore, Repository};

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    pub count_of_views: i64,
    pub count_of_likes: i64,
    pub is_active: bool,
    pub author: i64,
    pub community: i64,
    pub categories: Vec<i64>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            created_date: post.created_date,
            updated_date: post.updated_date,
            count_of_views: post.count_of_views,
            count_of_likes: post.count_of_likes,
            is_active: post.is_active,
            author: post.author,
            community: post.community,
            categories: post.categories,
        }
    }
}

/// Validates a new post, including that every referenced row exists.
pub async fn validate_new(body: &Value, repo: &dyn Repository) -> AppResult<NewPost> {
    let mut fields = Fields::new(body, false)?;

    let title = fields.required_str("title", Some(125));
    let count_of_views = fields.counter("count_of_views");
    let count_of_likes = fields.counter("count_of_likes");
    let is_active = fields.boolean("is_active");
    let author = fields.pk("author");
    let community = fields.pk("community");
    let categories = fields.pk_list("categories");

    if let Some(author) = author {
        if repo.get_profile(author).await?.is_none() {
            fields.error("author", does_not_exist(author));
        }
    }
    if let Some(community) = community {
        if repo.get_community(community).await?.is_none() {
            fields.error("community", does_not_exist(community));
        }
    }
    if let Some(ref categories) = categories {
        for &id in categories {
            if repo.get_category(id).await?.is_none() {
                fields.error("categories", does_not_exist(id));
                break;
            }
        }
    }

    fields.finish()?;

    Ok(NewPost {
        title: require(title, "title")?,
        count_of_views: count_of_views.unwrap_or(0),
        count_of_likes: count_of_likes.unwrap_or(0),
        is_active: is_active.unwrap_or(true),
        author: require(author, "author")?,
        community: require(community, "community")?,
        categories: require(categories, "categories")?,
    })
}
