//! # Composer Drafts
//!
//! Debounced autosave of in-progress post edits. Draft slots are keyed by
//! `(user, target-post-or-new)` in device storage; rescheduling cancels the
//! prior timer outright, so no two saves for the same slot are ever in
//! flight and only the last state of a burst persists.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use domains::{
    AppError, DeviceStore, DeviceStoreExt, Draft, Post, Result, User, DEFAULT_MOOD, DEFAULT_TEAM,
};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::posts::PostStore;

/// Comma-separated tag field: split, trim, drop empties, keep order.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn slot_key(user_id: &str, target_post_id: Option<&str>) -> String {
    match target_post_id {
        Some(post_id) => format!("draft:{user_id}:post:{post_id}"),
        None => format!("draft:{user_id}:new"),
    }
}

pub struct DraftManager {
    device: Arc<dyn DeviceStore>,
    user_id: String,
    quiet_period: Duration,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl DraftManager {
    pub fn new(device: Arc<dyn DeviceStore>, user_id: impl Into<String>, quiet_period: Duration) -> Self {
        Self {
            device,
            user_id: user_id.into(),
            quiet_period,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn get(&self, target_post_id: Option<&str>) -> Option<Draft> {
        self.device.get_json(&slot_key(&self.user_id, target_post_id))
    }

    /// Arm the autosave timer, cancelling any pending one. The draft is
    /// persisted only after the quiet period elapses without another call.
    pub fn schedule(&self, draft: Draft) {
        let mut pending = self.pending.lock().expect("draft timer lock poisoned");
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let device = Arc::clone(&self.device);
        let key = slot_key(&self.user_id, draft.target_post_id.as_deref());
        let quiet_period = self.quiet_period;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            if let Err(err) = device.set_json(&key, &draft) {
                tracing::warn!(key, %err, "draft autosave failed");
            }
        }));
    }

    /// Persist immediately, cancelling the timer. Used on navigation-away.
    pub fn flush(&self, draft: &Draft) -> Result<()> {
        self.cancel_pending();
        self.device
            .set_json(&slot_key(&self.user_id, draft.target_post_id.as_deref()), draft)
    }

    /// True while an autosave timer is armed.
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .expect("draft timer lock poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Drop the slot. Also cancels the timer: a save firing after a
    /// successful publish would resurrect the draft.
    pub fn clear(&self, target_post_id: Option<&str>) -> Result<()> {
        self.cancel_pending();
        self.device.remove(&slot_key(&self.user_id, target_post_id))
    }

    fn cancel_pending(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .expect("draft timer lock poisoned")
            .take()
        {
            handle.abort();
        }
    }
}

/// Editor field state, the shape the form binds to. Tags stay a free-text
/// field until publish.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComposerState {
    pub title: String,
    pub content: String,
    pub tags_input: String,
    pub mood: String,
    pub team: String,
}

impl ComposerState {
    fn from_draft(draft: &Draft) -> Self {
        Self {
            title: draft.title.clone(),
            content: draft.content.clone(),
            tags_input: draft.tags.join(", "),
            mood: draft.mood.clone(),
            team: draft.team.clone(),
        }
    }

    fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone().unwrap_or_default(),
            content: post.content.clone(),
            tags_input: post.tags.join(", "),
            mood: post.mood.clone(),
            team: if post.team.is_empty() {
                DEFAULT_TEAM.to_string()
            } else {
                post.team.clone()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerPhase {
    Hydrating,
    Editing,
    PendingSave,
    Published,
    Discarded,
}

/// One composer instance: hydrates from draft-or-post, autosaves while
/// editing, terminates in `Published` or `Discarded`.
pub struct Composer {
    manager: DraftManager,
    author: User,
    target: Option<Post>,
    state: ComposerState,
    phase: ComposerPhase,
}

impl Composer {
    pub fn new(
        device: Arc<dyn DeviceStore>,
        author: User,
        target: Option<Post>,
        quiet_period: Duration,
    ) -> Self {
        let manager = DraftManager::new(device, author.id.clone(), quiet_period);
        let mut composer = Self {
            manager,
            author,
            target,
            state: ComposerState::default(),
            phase: ComposerPhase::Hydrating,
        };
        composer.hydrate();
        composer
    }

    /// Draft takes precedence over committed content: an interrupted edit
    /// resumes where it left off.
    fn hydrate(&mut self) {
        let slot = self.target.as_ref().map(|p| p.id.clone());
        if let Some(draft) = self.manager.get(slot.as_deref()) {
            self.state = ComposerState::from_draft(&draft);
        } else if let Some(post) = &self.target {
            self.state = ComposerState::from_post(post);
        }
        self.phase = ComposerPhase::Editing;
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    pub fn phase(&self) -> ComposerPhase {
        match self.phase {
            ComposerPhase::Editing if self.manager.has_pending() => ComposerPhase::PendingSave,
            phase => phase,
        }
    }

    /// Apply a field edit and rearm the autosave timer.
    pub fn edit<F: FnOnce(&mut ComposerState)>(&mut self, apply: F) {
        apply(&mut self.state);
        self.manager.schedule(self.draft());
    }

    fn draft(&self) -> Draft {
        Draft {
            target_post_id: self.target.as_ref().map(|p| p.id.clone()),
            title: self.state.title.clone(),
            content: self.state.content.clone(),
            tags: parse_tags(&self.state.tags_input),
            mood: self.state.mood.clone(),
            team: self.state.team.clone(),
            last_saved: Utc::now(),
        }
    }

    /// Commit the editor state: update the target post or publish a new one,
    /// then drop the draft slot that was in use.
    pub async fn publish(&mut self, posts: &PostStore) -> Result<Post> {
        if self.state.content.trim().is_empty() {
            return Err(AppError::Validation(
                "post content must not be empty".to_string(),
            ));
        }

        let title = match self.state.title.trim() {
            "" => None,
            trimmed => Some(trimmed.to_string()),
        };
        let tags = parse_tags(&self.state.tags_input);
        let mood = if self.state.mood.is_empty() {
            DEFAULT_MOOD.to_string()
        } else {
            self.state.mood.clone()
        };
        let team = if self.state.team.is_empty() {
            DEFAULT_TEAM.to_string()
        } else {
            self.state.team.clone()
        };

        let published = match &self.target {
            Some(existing) => {
                let updated = Post {
                    title,
                    content: self.state.content.clone(),
                    tags,
                    mood,
                    team,
                    ..existing.clone()
                };
                posts.update(updated.clone()).await?;
                updated
            }
            None => {
                let post = Post {
                    id: Uuid::now_v7().to_string(),
                    title,
                    content: self.state.content.clone(),
                    author: self.author.clone(),
                    timestamp: Utc::now(),
                    likes: vec![],
                    tags,
                    mood,
                    team,
                    flags: vec![],
                    deleted: false,
                    flagged: false,
                    comments: vec![],
                };
                posts.add(post.clone()).await?;
                post
            }
        };

        self.manager
            .clear(self.target.as_ref().map(|p| p.id.as_str()))?;
        self.phase = ComposerPhase::Published;
        Ok(published)
    }

    /// Leave the composer. The draft slot is kept (that is what makes
    /// resuming possible), but the latest state is flushed first so the
    /// burst in progress is not lost. Returns false when the operator
    /// declined the confirmation.
    pub fn discard(&mut self, confirm: &dyn Fn(&str) -> bool) -> bool {
        if !confirm("Leave the composer? Your draft is saved.") {
            return false;
        }
        if let Err(err) = self.manager.flush(&self.draft()) {
            tracing::warn!(%err, "failed to flush draft on discard");
        }
        self.phase = ComposerPhase::Discarded;
        true
    }
}
