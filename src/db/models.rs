use chrono::{DateTime, NaiveDate, Utc};

/// A stored account. The password field only ever holds a bcrypt hash.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub created_date: NaiveDate,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_caretaker: bool,
}

impl Account {
    /// All admins are staff.
    pub fn is_staff(&self) -> bool {
        self.is_admin
    }

    /// Every account holds every permission. No route consults this yet.
    pub fn has_perm(&self, _perm: &str) -> bool {
        true
    }

    pub fn has_module_perms(&self, _app_label: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct GalleryImage {
    pub id: i64,
    pub user: i64,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub user: i64,
    pub status: Option<String>,
    pub bio: String,
    pub avatar: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub user_image: Option<i64>,
    pub is_active: bool,
}

/// Every writable profile column, used for both insert and full update.
#[derive(Debug, Clone)]
pub struct ProfileData {
    pub user: i64,
    pub status: Option<String>,
    pub bio: String,
    pub avatar: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub user_image: Option<i64>,
    pub is_active: bool,
}

impl From<&Profile> for ProfileData {
    fn from(profile: &Profile) -> Self {
        Self {
            user: profile.user,
            status: profile.status.clone(),
            bio: profile.bio.clone(),
            avatar: profile.avatar.clone(),
            date_of_birth: profile.date_of_birth,
            user_image: profile.user_image,
            is_active: profile.is_active,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Community {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub members: Vec<i64>,
    pub moderators: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct CommunityData {
    pub name: String,
    pub description: String,
    pub members: Vec<i64>,
    pub moderators: Vec<i64>,
}

impl From<&Community> for CommunityData {
    fn from(community: &Community) -> Self {
        Self {
            name: community.name.clone(),
            description: community.description.clone(),
            members: community.members.clone(),
            moderators: community.moderators.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Post {
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

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub count_of_views: i64,
    pub count_of_likes: i64,
    pub is_active: bool,
    pub author: i64,
    pub community: i64,
    pub categories: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    pub user: i64,
    pub post: i64,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    pub user: i64,
    pub post: i64,
}
