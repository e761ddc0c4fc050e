use serde::Serialize;
use serde_json::Value;

use super::{does_not_exist, require, Fields};
use crate::db::models::{Community, CommunityData};
use crate::error::AppResult;
use crate::repository::{CommunityStore, ProfileStore, Repository};

#[derive(Debug, Serialize)]
pub struct CommunityView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub members: Vec<i64>,
    pub moderators: Vec<i64>,
}

impl From<Community> for CommunityView {
    fn from(community: Community) -> Self {
        Self {
            id: community.id,
            name: community.name,
            description: community.description,
            members: community.members,
            moderators: community.moderators,
        }
    }
}

async fn check_profiles(
    fields: &mut Fields<'_>,
    field: &str,
    ids: &[i64],
    repo: &dyn Repository,
) -> AppResult<()> {
    for &id in ids {
        if repo.get_profile(id).await?.is_none() {
            fields.error(field, does_not_exist(id));
            break;
        }
    }
    Ok(())
}

/// Validates a create (`existing` is `None`), full update or partial update.
pub async fn validate(
    body: &Value,
    partial: bool,
    existing: Option<&Community>,
    repo: &dyn Repository,
) -> AppResult<CommunityData> {
    let mut fields = Fields::new(body, partial)?;

    let name = fields.required_str("name", Some(125));
    let description = fields.required_str("description", None);
    let members = fields.pk_list("members");
    let moderators = fields.pk_list("moderators");

    if let Some(ref name) = name {
        if let Some(other) = repo.find_community_by_name(name).await? {
            if existing.map(|c| c.id) != Some(other.id) {
                fields.error("name", "community with this name already exists.");
            }
        }
    }
    if let Some(ref members) = members {
        check_profiles(&mut fields, "members", members, repo).await?;
    }
    if let Some(ref moderators) = moderators {
        check_profiles(&mut fields, "moderators", moderators, repo).await?;
    }

    fields.finish()?;

    match existing {
        Some(current) => {
            let base = CommunityData::from(current);
            Ok(CommunityData {
                name: name.unwrap_or(base.name),
                description: description.unwrap_or(base.description),
                members: members.unwrap_or(base.members),
                moderators: moderators.unwrap_or(base.moderators),
            })
        }
        None => Ok(CommunityData {
            name: require(name, "name")?,
            description: require(description, "description")?,
            members: require(members, "members")?,
            moderators: require(moderators, "moderators")?,
        }),
    }
}
