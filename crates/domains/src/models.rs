//! # Domain Models
//!
//! These structs represent the core entities of Meme-Bazaar. Serde renames
//! mirror the camelCase shapes the remote collection and the persisted device
//! blobs already use, so legacy data loads without a migration step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enum-like vocabularies. Stored as free text end to end; the remote
/// collection has no closed enum for either.
pub const MOODS: &[&str] = &["Funny", "Sarcastic", "Relatable", "Risky", "Mysterious"];
pub const TEAMS: &[&str] = &[
    "Engineering",
    "Product",
    "Design",
    "QA",
    "HR",
    "Sales",
    "Marketing",
];

pub const DEFAULT_MOOD: &str = "Funny";
pub const DEFAULT_TEAM: &str = "Engineering";

/// Account role. Anything that is not an admin is a plain user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// A registered (or device-local) identity.
///
/// `email` and `role` default when absent: legacy seed authors carried only
/// an id and a username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Stand-in author used when the remote user record cannot be resolved.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: "Unknown".to_string(),
            email: String::new(),
            role: Role::User,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A moderation report attached to a post. Appended in report order and
/// resolved by positional removal, so the sequence order is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(rename = "userId")]
    pub raised_by: String,
    pub reason: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// The fundamental unit of the feed: a short text meme post.
///
/// Identity is `id`, immutable once created. `likes` carries set semantics
/// (membership matters, order does not). Posts are never physically removed
/// except by an explicit owner hard-delete; moderation uses the `deleted`
/// soft marker instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    pub author: User,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn has_liked(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    /// A post counts as flagged when it carries open flags or the sticky
    /// `flagged` marker.
    pub fn is_flagged(&self) -> bool {
        self.flagged || !self.flags.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Per-device preferences: theme plus the saved/liked post-id sets.
///
/// Device-scoped, not account-scoped. `liked_posts` duplicates information
/// recoverable from the posts themselves; it exists for fast lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub saved_posts: Vec<String>,
    #[serde(default)]
    pub liked_posts: Vec<String>,
}

impl Preferences {
    pub fn is_saved(&self, post_id: &str) -> bool {
        self.saved_posts.iter().any(|id| id == post_id)
    }

    pub fn is_liked(&self, post_id: &str) -> bool {
        self.liked_posts.iter().any(|id| id == post_id)
    }
}

/// An autosaved snapshot of in-progress composer content.
///
/// `target_post_id` is present when the draft shadows an existing post edit
/// and absent for the per-user "new post" slot. Serialized as `id` to match
/// the blobs older clients wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(default, rename = "id", skip_serializing_if = "Option::is_none")]
    pub target_post_id: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub team: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_saved: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// What the auth backend hands back on a successful login or registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}
