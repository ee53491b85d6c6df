//! # Local Post Collection
//!
//! Offline implementation of `PostBackend` over device storage: the whole
//! collection lives under one key and every mutation rewrites it, which is
//! exactly what the browser build did with its localStorage array. Seeds a
//! small starter collection on first load and backfills the `team` field on
//! records written before that field existed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use domains::{
    AppError, Comment, DeviceStore, DeviceStoreExt, Flag, Post, PostBackend, Result, Role, User,
    DEFAULT_TEAM,
};

const POSTS_KEY: &str = "memes";

pub struct LocalPostBackend {
    device: Arc<dyn DeviceStore>,
}

impl LocalPostBackend {
    pub fn new(device: Arc<dyn DeviceStore>) -> Self {
        Self { device }
    }

    fn load(&self) -> Vec<Post> {
        self.device.get_json(POSTS_KEY).unwrap_or_default()
    }

    fn persist(&self, posts: &Vec<Post>) -> Result<()> {
        self.device.set_json(POSTS_KEY, posts)
    }

    fn mutate<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Post>) -> Result<()>,
    {
        let mut posts = self.load();
        apply(&mut posts)?;
        self.persist(&posts)
    }

    fn mutate_post<F>(&self, id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Post),
    {
        self.mutate(|posts| {
            let post = posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| AppError::NotFound("Post".to_string(), id.to_string()))?;
            apply(post);
            Ok(())
        })
    }

    fn seed() -> Vec<Post> {
        let author = |id: &str, username: &str| User {
            id: id.to_string(),
            username: username.to_string(),
            email: String::new(),
            role: Role::User,
        };
        let now = Utc::now();
        vec![
            Post {
                id: "1".to_string(),
                title: Some("Deployment Friday".to_string()),
                content: "POV: You deploy to prod on a Friday evening and then turn off your phone."
                    .to_string(),
                author: author("u1", "DevOps_Ninja"),
                timestamp: now - Duration::hours(1),
                likes: vec![],
                tags: vec!["deployment".to_string(), "friday".to_string(), "pov".to_string()],
                mood: "Risky".to_string(),
                team: "Engineering".to_string(),
                flags: vec![],
                deleted: false,
                flagged: false,
                comments: vec![],
            },
            Post {
                id: "2".to_string(),
                title: Some("It works on my machine".to_string()),
                content: "Customer: It is crashing! Me: Works on my machine ¯\\_(ツ)_/¯".to_string(),
                author: author("u2", "BugSquasher"),
                timestamp: now - Duration::days(1),
                likes: vec![],
                tags: vec!["bugs".to_string(), "customer".to_string(), "classic".to_string()],
                mood: "Funny".to_string(),
                team: "QA".to_string(),
                flags: vec![],
                deleted: false,
                flagged: false,
                comments: vec![],
            },
            Post {
                id: "3".to_string(),
                title: Some("Spoiler Alert".to_string()),
                content: "Wait until you see the ending! ||The main character was a loop all along||"
                    .to_string(),
                author: author("u3", "PlotTwist"),
                timestamp: now - Duration::days(2),
                likes: vec![],
                tags: vec!["spoiler".to_string(), "code".to_string()],
                mood: "Mysterious".to_string(),
                team: "Product".to_string(),
                flags: vec![],
                deleted: false,
                flagged: false,
                comments: vec![],
            },
        ]
    }
}

#[async_trait]
impl PostBackend for LocalPostBackend {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let mut posts = self.load();
        let mut dirty = false;

        if posts.is_empty() {
            posts = Self::seed();
            dirty = true;
        }

        // Migration: records written before the team field existed.
        for post in &mut posts {
            if post.team.is_empty() {
                post.team = DEFAULT_TEAM.to_string();
                dirty = true;
            }
        }

        if dirty {
            self.persist(&posts)?;
        }
        Ok(posts)
    }

    async fn create_post(&self, post: &Post) -> Result<()> {
        let post = post.clone();
        self.mutate(|posts| {
            posts.insert(0, post);
            Ok(())
        })
    }

    async fn update_post(&self, post: &Post) -> Result<()> {
        let updated = post.clone();
        self.mutate_post(&post.id, move |slot| *slot = updated)
    }

    async fn delete_post(&self, id: &str) -> Result<()> {
        self.mutate(|posts| {
            posts.retain(|p| p.id != id);
            Ok(())
        })
    }

    async fn replace_likes(&self, id: &str, likes: &[String]) -> Result<()> {
        let likes = likes.to_vec();
        self.mutate_post(id, move |post| post.likes = likes)
    }

    async fn replace_flags(&self, id: &str, flags: &[Flag], flagged: bool) -> Result<()> {
        let flags = flags.to_vec();
        self.mutate_post(id, move |post| {
            post.flags = flags;
            post.flagged = flagged;
        })
    }

    async fn replace_comments(&self, id: &str, comments: &[Comment]) -> Result<()> {
        let comments = comments.to_vec();
        self.mutate_post(id, move |post| post.comments = comments)
    }

    async fn set_deleted(&self, id: &str, deleted: bool) -> Result<()> {
        self.mutate_post(id, move |post| post.deleted = deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::testing::MemoryDeviceStore;

    fn backend() -> (Arc<MemoryDeviceStore>, LocalPostBackend) {
        let device = Arc::new(MemoryDeviceStore::new());
        let backend = LocalPostBackend::new(device.clone() as Arc<dyn DeviceStore>);
        (device, backend)
    }

    #[tokio::test]
    async fn empty_collection_gets_seeded_once() {
        let (_, backend) = backend();
        let first = backend.fetch_posts().await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].title.as_deref(), Some("Deployment Friday"));

        // A second fetch reads the persisted seed, not a fresh one.
        let second = backend.fetch_posts().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_team_is_backfilled_and_persisted() {
        let (device, backend) = backend();
        let mut legacy = LocalPostBackend::seed();
        legacy[1].team = String::new();
        device.set_json(POSTS_KEY, &legacy).unwrap();

        let posts = backend.fetch_posts().await.unwrap();
        assert_eq!(posts[1].team, DEFAULT_TEAM);

        let stored: Vec<Post> = device.get_json(POSTS_KEY).unwrap();
        assert_eq!(stored[1].team, DEFAULT_TEAM);
    }

    #[tokio::test]
    async fn mutations_rewrite_the_stored_collection() {
        let (device, backend) = backend();
        backend.fetch_posts().await.unwrap();

        backend
            .replace_likes("2", &["u9".to_string()])
            .await
            .unwrap();
        backend.set_deleted("3", true).await.unwrap();

        let stored: Vec<Post> = device.get_json(POSTS_KEY).unwrap();
        let by_id = |id: &str| stored.iter().find(|p| p.id == id).unwrap();
        assert_eq!(by_id("2").likes, vec!["u9".to_string()]);
        assert!(by_id("3").deleted);
    }

    #[tokio::test]
    async fn mutating_an_unknown_post_is_not_found() {
        let (_, backend) = backend();
        backend.fetch_posts().await.unwrap();
        let err = backend.set_deleted("nope", true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, _)));
    }
}
