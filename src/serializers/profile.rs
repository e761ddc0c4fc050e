use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::{does_not_exist, require, Fields};
use crate::db::models::{Profile, ProfileData};
use crate::error::AppResult;
use crate::repository::{AccountStore, GalleryStore, ProfileStore, Repository};

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: i64,
    pub user: i64,
    pub status: Option<String>,
    pub bio: String,
    /// Stored path joined onto the media URL.
    pub avatar: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub user_image: Option<i64>,
    pub is_active: bool,
}

impl ProfileView {
    pub fn new(profile: Profile, media_url: &str) -> Self {
        Self {
            id: profile.id,
            user: profile.user,
            status: profile.status,
            bio: profile.bio,
            avatar: profile.avatar.map(|path| format!("{media_url}{path}")),
            date_of_birth: profile.date_of_birth,
            user_image: profile.user_image,
            is_active: profile.is_active,
        }
    }
}

/// Validates a create (`existing` is `None`), full update or partial update.
pub async fn validate(
    body: &Value,
    partial: bool,
    existing: Option<&Profile>,
    repo: &dyn Repository,
    media_url: &str,
) -> AppResult<ProfileData> {
    let mut fields = Fields::new(body, partial)?;

    let user = fields.pk("user");
    let status = fields.nullable_str("status", Some(100));
    let bio = fields.blank_str("bio", None);
    let avatar = fields.nullable_image("avatar", media_url);
    let date_of_birth = fields.nullable_date("date_of_birth");
    let user_image = fields.nullable_pk("user_image");
    let is_active = fields.boolean("is_active");

    if let Some(user) = user {
        if repo.get_account(user).await?.is_none() {
            fields.error("user", does_not_exist(user));
        } else if let Some(other) = repo.find_profile_by_account(user).await? {
            if existing.map(|p| p.id) != Some(other.id) {
                fields.error("user", "user profile with this user already exists.");
            }
        }
    }
    if let Some(Some(image)) = user_image {
        if repo.get_gallery_image(image).await?.is_none() {
            fields.error("user_image", does_not_exist(image));
        }
    }

    fields.finish()?;

    let base = match existing {
        Some(current) => ProfileData::from(current),
        None => ProfileData {
            user: require(user, "user")?,
            status: None,
            bio: String::new(),
            avatar: None,
            date_of_birth: None,
            user_image: None,
            is_active: true,
        },
    };

    Ok(ProfileData {
        user: user.unwrap_or(base.user),
        status: status.unwrap_or(base.status),
        bio: bio.unwrap_or(base.bio),
        avatar: avatar.unwrap_or(base.avatar),
        date_of_birth: date_of_birth.unwrap_or(base.date_of_birth),
        user_image: user_image.unwrap_or(base.user_image),
        is_active: is_active.unwrap_or(base.is_active),
    })
}
