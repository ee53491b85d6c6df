//! # Post Store
//!
//! Owns the authoritative in-memory post list and reconciles it against the
//! remote collection. Like-toggling is optimistic with a verbatim rollback;
//! every other write goes backend-first so a rejected write leaves the local
//! view untouched and the failure in the caller's hands.

use std::sync::Arc;

use chrono::Utc;
use domains::{AppError, Comment, Flag, Post, PostBackend, Result, User};
use uuid::Uuid;

use crate::preferences::PreferencesStore;
use crate::store::Store;

#[derive(Clone)]
pub struct PostStore {
    backend: Arc<dyn PostBackend>,
    preferences: PreferencesStore,
    posts: Store<Vec<Post>>,
}

impl PostStore {
    pub fn new(backend: Arc<dyn PostBackend>, preferences: PreferencesStore) -> Self {
        Self {
            backend,
            preferences,
            posts: Store::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Store<Vec<Post>> {
        &self.posts
    }

    pub fn get(&self) -> Vec<Post> {
        self.posts.get()
    }

    pub fn find(&self, id: &str) -> Option<Post> {
        self.posts.get().into_iter().find(|p| p.id == id)
    }

    /// Reconcile against the remote collection. A failed read leaves the
    /// prior list untouched: stale but consistent.
    pub async fn load(&self) -> Result<()> {
        let fetched = self.backend.fetch_posts().await?;
        self.posts.set(fetched);
        Ok(())
    }

    /// Publish a new post; newest first, as the feed default expects.
    pub async fn add(&self, post: Post) -> Result<()> {
        self.backend.create_post(&post).await?;
        self.posts.update(move |list| list.insert(0, post));
        Ok(())
    }

    pub async fn update(&self, updated: Post) -> Result<()> {
        self.backend.update_post(&updated).await?;
        self.posts.update(move |list| {
            if let Some(slot) = list.iter_mut().find(|p| p.id == updated.id) {
                *slot = updated;
            }
        });
        Ok(())
    }

    /// Mark a post hidden from normal feeds without erasing it.
    pub async fn soft_delete(&self, id: &str) -> Result<()> {
        self.backend.set_deleted(id, true).await?;
        self.apply(id, |post| post.deleted = true);
        Ok(())
    }

    pub async fn restore(&self, id: &str) -> Result<()> {
        self.backend.set_deleted(id, false).await?;
        self.apply(id, |post| post.deleted = false);
        Ok(())
    }

    /// Physically remove a post. Only the author (or an admin) may do this.
    pub async fn hard_delete(&self, user: &User, id: &str) -> Result<()> {
        let post = self
            .find(id)
            .ok_or_else(|| AppError::NotFound("Post".to_string(), id.to_string()))?;
        if post.author.id != user.id && !user.is_admin() {
            return Err(AppError::Forbidden(
                "only the author may remove a post".to_string(),
            ));
        }
        self.backend.delete_post(id).await?;
        let id = id.to_string();
        self.posts.update(move |list| list.retain(|p| p.id != id));
        Ok(())
    }

    /// Optimistic like toggle: local state (post likes + the liked-post
    /// lookup set) mutates before the remote request is dispatched; if the
    /// remote rejects it, the pre-mutation snapshots are restored verbatim
    /// and the error propagates. Returns whether the post is liked after
    /// the toggle.
    pub async fn toggle_like(&self, user: &User, post_id: &str) -> Result<bool> {
        let post = self
            .find(post_id)
            .ok_or_else(|| AppError::NotFound("Post".to_string(), post_id.to_string()))?;

        let prior_likes = post.likes.clone();
        let prior_prefs = self.preferences.get();
        let had_liked = post.has_liked(&user.id);

        let mut next_likes = prior_likes.clone();
        if had_liked {
            next_likes.retain(|id| id != &user.id);
        } else {
            next_likes.push(user.id.clone());
        }

        self.set_likes_local(post_id, next_likes.clone());
        if let Err(err) = self.preferences.set_liked(post_id, !had_liked) {
            self.set_likes_local(post_id, prior_likes);
            return Err(err);
        }

        match self.backend.replace_likes(post_id, &next_likes).await {
            Ok(()) => Ok(!had_liked),
            Err(err) => {
                self.set_likes_local(post_id, prior_likes);
                if let Err(revert_err) = self.preferences.replace(prior_prefs) {
                    tracing::warn!(%revert_err, post_id, "failed to roll back liked set");
                }
                Err(err)
            }
        }
    }

    /// Attach a moderation report and raise the flagged marker.
    pub async fn add_flag(&self, user: &User, post_id: &str, reason: &str) -> Result<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "flag reason must not be empty".to_string(),
            ));
        }
        let mut post = self
            .find(post_id)
            .ok_or_else(|| AppError::NotFound("Post".to_string(), post_id.to_string()))?;
        post.flags.push(Flag {
            raised_by: user.id.clone(),
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });

        self.backend
            .replace_flags(post_id, &post.flags, true)
            .await?;
        let flags = post.flags;
        self.apply(post_id, move |p| {
            p.flags = flags;
            p.flagged = true;
        });
        Ok(())
    }

    /// Dismiss a single flag by its position in the report sequence. The
    /// flagged marker stays as it is; clearing it is the bulk operation's
    /// job.
    pub async fn resolve_flag(&self, post_id: &str, index: usize) -> Result<()> {
        let mut post = self
            .find(post_id)
            .ok_or_else(|| AppError::NotFound("Post".to_string(), post_id.to_string()))?;
        if index >= post.flags.len() {
            return Err(AppError::NotFound(
                "Flag".to_string(),
                format!("{post_id}#{index}"),
            ));
        }
        post.flags.remove(index);

        self.backend
            .replace_flags(post_id, &post.flags, post.flagged)
            .await?;
        let flags = post.flags;
        self.apply(post_id, move |p| p.flags = flags);
        Ok(())
    }

    /// Bulk unflag: clear the report sequence and the flagged marker.
    pub async fn clear_flags(&self, post_id: &str) -> Result<()> {
        self.find(post_id)
            .ok_or_else(|| AppError::NotFound("Post".to_string(), post_id.to_string()))?;
        self.backend.replace_flags(post_id, &[], false).await?;
        self.apply(post_id, |post| {
            post.flags.clear();
            post.flagged = false;
        });
        Ok(())
    }

    pub async fn add_comment(&self, user: &User, post_id: &str, content: &str) -> Result<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation(
                "comment must not be empty".to_string(),
            ));
        }
        let mut post = self
            .find(post_id)
            .ok_or_else(|| AppError::NotFound("Post".to_string(), post_id.to_string()))?;
        let comment = Comment {
            id: Uuid::now_v7().to_string(),
            author_id: user.id.clone(),
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        post.comments.push(comment.clone());

        self.backend
            .replace_comments(post_id, &post.comments)
            .await?;
        let comments = post.comments;
        self.apply(post_id, move |p| p.comments = comments);
        Ok(comment)
    }

    fn set_likes_local(&self, post_id: &str, likes: Vec<String>) {
        self.apply(post_id, move |post| post.likes = likes);
    }

    fn apply<F: FnOnce(&mut Post)>(&self, id: &str, mutate: F) {
        self.posts.update(|list| {
            if let Some(post) = list.iter_mut().find(|p| p.id == id) {
                mutate(post);
            }
        });
    }

    /// Seed the in-memory list directly; test-only shortcut around a backend
    /// round-trip.
    #[cfg(test)]
    pub(crate) fn set_local(&self, posts: Vec<Post>) {
        self.posts.set(posts);
    }
}
