//! # Remote Post Collection
//!
//! `PostBackend` over the json-server style REST collection. The remote
//! speaks camelCase with integer-millisecond timestamps; `head` is a legacy
//! alias for `title` and must still be read. The server cannot patch array
//! elements, so the single-field updates replace the whole field.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domains::{AppError, Comment, Flag, Post, PostBackend, Result, User};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub struct HttpPostBackend {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpPostBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            token: RwLock::new(None),
        }
    }

    /// Bearer token attached to every request once a session exists.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock poisoned") = token;
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.token.read().expect("token lock poisoned").as_ref() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path)
            .send()
            .await
            .map_err(backend_err)?
            .error_for_status()
            .map_err(backend_err)?
            .json()
            .await
            .map_err(backend_err)
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<()> {
        self.request(method, path)
            .json(body)
            .send()
            .await
            .map_err(backend_err)?
            .error_for_status()
            .map_err(backend_err)?;
        Ok(())
    }

    async fn patch_post(&self, id: &str, body: serde_json::Value) -> Result<()> {
        self.send_json(Method::PATCH, &format!("/posts/{id}"), &body)
            .await
    }

    async fn fetch_author_index(&self) -> HashMap<String, User> {
        match self.get_json::<Vec<RemoteUserRecord>>("/users").await {
            Ok(records) => records
                .into_iter()
                .map(|record| {
                    let user = record.into_user();
                    (user.id.clone(), user)
                })
                .collect(),
            Err(err) => {
                // Posts still load; authors degrade to placeholders.
                tracing::warn!(%err, "author lookup failed");
                HashMap::new()
            }
        }
    }
}

fn backend_err(err: reqwest::Error) -> AppError {
    AppError::Backend(err.to_string())
}

#[async_trait]
impl PostBackend for HttpPostBackend {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let records: Vec<RemotePostRecord> = self.get_json("/posts").await?;
        let authors = self.fetch_author_index().await;
        Ok(records
            .into_iter()
            .map(|record| record.into_post(&authors))
            .collect())
    }

    async fn create_post(&self, post: &Post) -> Result<()> {
        self.send_json(Method::POST, "/posts", &OutgoingPostRecord::from(post))
            .await
    }

    async fn update_post(&self, post: &Post) -> Result<()> {
        self.send_json(
            Method::PUT,
            &format!("/posts/{}", post.id),
            &OutgoingPostRecord::from(post),
        )
        .await
    }

    async fn delete_post(&self, id: &str) -> Result<()> {
        self.request(Method::DELETE, &format!("/posts/{id}"))
            .send()
            .await
            .map_err(backend_err)?
            .error_for_status()
            .map_err(backend_err)?;
        Ok(())
    }

    async fn replace_likes(&self, id: &str, likes: &[String]) -> Result<()> {
        self.patch_post(id, serde_json::json!({ "likes": likes })).await
    }

    async fn replace_flags(&self, id: &str, flags: &[Flag], flagged: bool) -> Result<()> {
        self.patch_post(id, serde_json::json!({ "flags": flags, "flagged": flagged }))
            .await
    }

    async fn replace_comments(&self, id: &str, comments: &[Comment]) -> Result<()> {
        self.patch_post(id, serde_json::json!({ "comments": comments }))
            .await
    }

    async fn set_deleted(&self, id: &str, deleted: bool) -> Result<()> {
        self.patch_post(id, serde_json::json!({ "deleted": deleted }))
            .await
    }
}

/// json-server data is hand-edited often enough that ids show up as both
/// strings and numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(i64),
}

impl IdRepr {
    fn into_string(self) -> String {
        match self {
            IdRepr::Text(id) => id,
            IdRepr::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteUserRecord {
    id: IdRepr,
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: domains::Role,
}

impl RemoteUserRecord {
    fn into_user(self) -> User {
        User {
            id: self.id.into_string(),
            username: self.username,
            email: self.email,
            role: self.role,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemotePostRecord {
    id: IdRepr,
    /// `head` is the legacy name for the title field.
    #[serde(default, alias = "head")]
    title: Option<String>,
    content: String,
    user_id: IdRepr,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    likes: Option<Vec<IdRepr>>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    flags: Option<Vec<Flag>>,
    #[serde(default)]
    deleted: Option<bool>,
    #[serde(default)]
    flagged: Option<bool>,
    #[serde(default)]
    comments: Option<Vec<Comment>>,
}

impl RemotePostRecord {
    fn into_post(self, authors: &HashMap<String, User>) -> Post {
        let author_id = self.user_id.into_string();
        let author = authors
            .get(&author_id)
            .cloned()
            .unwrap_or_else(|| User::placeholder(author_id));
        Post {
            id: self.id.into_string(),
            title: self.title,
            content: self.content,
            author,
            timestamp: self
                .timestamp
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .unwrap_or_else(Utc::now),
            likes: self
                .likes
                .unwrap_or_default()
                .into_iter()
                .map(IdRepr::into_string)
                .collect(),
            tags: self.tags.unwrap_or_default(),
            mood: self.mood.unwrap_or_default(),
            team: self.team.unwrap_or_default(),
            flags: self.flags.unwrap_or_default(),
            deleted: self.deleted.unwrap_or(false),
            flagged: self.flagged.unwrap_or(false),
            comments: self.comments.unwrap_or_default(),
        }
    }
}

/// Outbound shape: the remote keys posts by `userId`, not by an embedded
/// author record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingPostRecord<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    content: &'a str,
    user_id: &'a str,
    timestamp: i64,
    likes: &'a [String],
    tags: &'a [String],
    mood: &'a str,
    team: &'a str,
    flags: &'a [Flag],
    deleted: bool,
    flagged: bool,
    comments: &'a [Comment],
}

impl<'a> From<&'a Post> for OutgoingPostRecord<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            id: &post.id,
            title: post.title.as_deref(),
            content: &post.content,
            user_id: &post.author.id,
            timestamp: post.timestamp.timestamp_millis(),
            likes: &post.likes,
            tags: &post.tags,
            mood: &post.mood,
            team: &post.team,
            flags: &post.flags,
            deleted: post.deleted,
            flagged: post.flagged,
            comments: &post.comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domains::Role;

    #[test]
    fn legacy_head_field_reads_as_title() {
        let record: RemotePostRecord = serde_json::from_str(
            r#"{"id":7,"head":"Old title","content":"body","userId":"u1"}"#,
        )
        .unwrap();
        let post = record.into_post(&HashMap::new());
        assert_eq!(post.id, "7");
        assert_eq!(post.title.as_deref(), Some("Old title"));
    }

    #[test]
    fn missing_author_record_becomes_a_placeholder() {
        let record: RemotePostRecord = serde_json::from_str(
            r#"{"id":"1","title":"T","content":"body","userId":99,"timestamp":1700000000000}"#,
        )
        .unwrap();
        let post = record.into_post(&HashMap::new());
        assert_eq!(post.author.id, "99");
        assert_eq!(post.author.username, "Unknown");
        assert_eq!(
            post.timestamp,
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
        );
    }

    #[test]
    fn known_author_is_resolved_from_the_index() {
        let record: RemotePostRecord =
            serde_json::from_str(r#"{"id":"1","content":"body","userId":"u1"}"#).unwrap();
        let mut authors = HashMap::new();
        authors.insert(
            "u1".to_string(),
            User {
                id: "u1".to_string(),
                username: "DevOps_Ninja".to_string(),
                email: "ninja@example.com".to_string(),
                role: Role::User,
            },
        );
        let post = record.into_post(&authors);
        assert_eq!(post.author.username, "DevOps_Ninja");
        // Absent optional arrays default to empty, not error.
        assert!(post.likes.is_empty());
        assert!(post.flags.is_empty());
    }

    #[test]
    fn outgoing_record_writes_user_id_and_millisecond_timestamp() {
        let post = Post {
            id: "42".to_string(),
            title: Some("T".to_string()),
            content: "body".to_string(),
            author: User {
                id: "u1".to_string(),
                username: "Memer".to_string(),
                email: String::new(),
                role: Role::User,
            },
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            likes: vec!["u2".to_string()],
            tags: vec![],
            mood: "Funny".to_string(),
            team: "QA".to_string(),
            flags: vec![],
            deleted: false,
            flagged: false,
            comments: vec![],
        };
        let json = serde_json::to_value(OutgoingPostRecord::from(&post)).unwrap();
        assert_eq!(json["userId"], serde_json::json!("u1"));
        assert_eq!(json["timestamp"], serde_json::json!(1_700_000_000_000_i64));
        assert!(json.get("author").is_none());
    }
}
