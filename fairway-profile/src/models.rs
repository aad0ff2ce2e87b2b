use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::profiles;

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub home_course: Option<String>,
    pub city: Option<String>,
    pub handicap: Option<f64>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_banned: bool,
    pub is_verified: bool,
    pub ban_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub home_course: Option<String>,
    pub city: Option<String>,
    pub handicap: Option<f64>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, AsChangeset, Validate)]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    #[validate(length(max = 100))]
    pub home_course: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    pub handicap: Option<f64>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Public projection of a profile: what another golfer's card shows.
/// Email and moderation flags never leave the service through this.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProfileCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub home_course: Option<String>,
    pub city: Option<String>,
    pub handicap: Option<f64>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
}

impl From<Profile> for ProfileCard {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            display_name: p.display_name,
            home_course: p.home_course,
            city: p.city,
            handicap: p.handicap,
            bio: p.bio,
            avatar_url: p.avatar_url,
            is_verified: p.is_verified,
        }
    }
}
