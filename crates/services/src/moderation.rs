//! # Moderation View Model
//!
//! The admin list: post collection filtered by two independent toggles.
//! The flagged restriction applies before the deleted exclusion, so a post
//! that is both deleted and flagged only surfaces when both toggles are on.
//! That interaction order is kept as the product currently behaves; see the
//! open-questions section of DESIGN.md.

use std::sync::Arc;

use domains::{Post, Result};

use crate::posts::PostStore;
use crate::store::{Store, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModerationFilter {
    pub show_deleted: bool,
    pub show_flagged: bool,
}

/// Pure derivation: flagged restriction first, then the deleted exclusion.
pub fn derive_moderation(posts: &[Post], filter: &ModerationFilter) -> Vec<Post> {
    let mut out: Vec<Post> = posts
        .iter()
        .filter(|p| !filter.show_flagged || p.is_flagged())
        .cloned()
        .collect();
    if !filter.show_deleted {
        out.retain(|p| !p.deleted);
    }
    out
}

/// Asks the operator before a destructive action runs; returns false to
/// abort.
pub type ConfirmFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

pub struct ModerationViewModel {
    posts: PostStore,
    filter: Store<ModerationFilter>,
    output: Store<Vec<Post>>,
    confirm: ConfirmFn,
    _upstream: Vec<Subscription>,
}

impl ModerationViewModel {
    pub fn new(posts: &PostStore, confirm: ConfirmFn) -> Self {
        let filter = Store::new(ModerationFilter::default());
        let output = Store::new(Vec::new());

        let recompute: Arc<dyn Fn() + Send + Sync> = {
            let posts = posts.store().clone();
            let filter = filter.clone();
            let output = output.clone();
            Arc::new(move || output.set(derive_moderation(&posts.get(), &filter.get())))
        };

        let upstream = vec![
            posts.store().subscribe({
                let recompute = Arc::clone(&recompute);
                move |_| recompute()
            }),
            filter.subscribe({
                let recompute = Arc::clone(&recompute);
                move |_| recompute()
            }),
        ];
        recompute();

        Self {
            posts: posts.clone(),
            filter,
            output,
            confirm,
            _upstream: upstream,
        }
    }

    pub fn output(&self) -> &Store<Vec<Post>> {
        &self.output
    }

    pub fn posts(&self) -> Vec<Post> {
        self.output.get()
    }

    pub fn set_show_deleted(&self, show: bool) {
        self.filter.update(|f| f.show_deleted = show);
    }

    pub fn set_show_flagged(&self, show: bool) {
        self.filter.update(|f| f.show_flagged = show);
    }

    /// Returns false when the operator declined the confirmation.
    pub async fn soft_delete(&self, post_id: &str) -> Result<bool> {
        if !(self.confirm)("Soft-delete this post?") {
            return Ok(false);
        }
        self.posts.soft_delete(post_id).await?;
        Ok(true)
    }

    pub async fn restore(&self, post_id: &str) -> Result<()> {
        self.posts.restore(post_id).await
    }

    pub async fn resolve_flag(&self, post_id: &str, index: usize) -> Result<()> {
        self.posts.resolve_flag(post_id, index).await
    }

    /// Returns false when the operator declined the confirmation.
    pub async fn clear_flags(&self, post_id: &str) -> Result<bool> {
        if !(self.confirm)("Dismiss all flags on this post?") {
            return Ok(false);
        }
        self.posts.clear_flags(post_id).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domains::{Flag, Role, User};

    fn post(id: &str, deleted: bool, flag_reasons: &[&str]) -> Post {
        Post {
            id: id.to_string(),
            title: None,
            content: "body".to_string(),
            author: User {
                id: "a".to_string(),
                username: "author".to_string(),
                email: String::new(),
                role: Role::User,
            },
            timestamp: Utc.timestamp_millis_opt(0).unwrap(),
            likes: vec![],
            tags: vec![],
            mood: String::new(),
            team: String::new(),
            flags: flag_reasons
                .iter()
                .map(|reason| Flag {
                    raised_by: "u2".to_string(),
                    reason: reason.to_string(),
                    timestamp: Utc.timestamp_millis_opt(0).unwrap(),
                })
                .collect(),
            deleted,
            flagged: false,
            comments: vec![],
        }
    }

    #[test]
    fn flagged_restriction_then_deleted_exclusion() {
        let posts = vec![
            post("1", false, &[]),
            post("2", true, &[]),
            post("3", false, &["spam"]),
        ];
        let filter = ModerationFilter {
            show_deleted: false,
            show_flagged: true,
        };
        let out = derive_moderation(&posts, &filter);
        assert_eq!(out.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), ["3"]);
    }

    #[test]
    fn deleted_and_flagged_post_needs_both_toggles() {
        let posts = vec![post("1", true, &["spam"])];

        let hidden = derive_moderation(
            &posts,
            &ModerationFilter {
                show_deleted: false,
                show_flagged: true,
            },
        );
        assert!(hidden.is_empty());

        let shown = derive_moderation(
            &posts,
            &ModerationFilter {
                show_deleted: true,
                show_flagged: true,
            },
        );
        assert_eq!(shown.len(), 1);
    }

    #[test]
    fn default_toggles_hide_deleted_but_keep_unflagged() {
        let posts = vec![post("1", false, &[]), post("2", true, &[])];
        let out = derive_moderation(&posts, &ModerationFilter::default());
        assert_eq!(out.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), ["1"]);
    }

    #[test]
    fn sticky_marker_counts_as_flagged_without_open_flags() {
        let mut marked = post("1", false, &[]);
        marked.flagged = true;
        let out = derive_moderation(
            &[marked],
            &ModerationFilter {
                show_deleted: false,
                show_flagged: true,
            },
        );
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn declined_confirmation_aborts_destructive_actions() {
        use crate::preferences::PreferencesStore;
        use domains::testing::MemoryDeviceStore;
        use domains::MockPostBackend;

        let prefs = PreferencesStore::new(Arc::new(MemoryDeviceStore::new()));
        // No backend expectations: a declined confirm must not reach it.
        let posts = PostStore::new(Arc::new(MockPostBackend::new()), prefs);
        let never: ConfirmFn = Arc::new(|_| false);
        let moderation = ModerationViewModel::new(&posts, never);

        assert!(!moderation.soft_delete("1").await.unwrap());
        assert!(!moderation.clear_flags("1").await.unwrap());
    }
}
