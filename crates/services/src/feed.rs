//! # Feed View Model
//!
//! Combines the post list, the preference sets and six independent filter
//! inputs into one derived, always-current display list. Every input change
//! recomputes the whole output synchronously; readers never see a partially
//! filtered list.

use std::sync::Arc;

use domains::{Post, Preferences};

use crate::posts::PostStore;
use crate::preferences::PreferencesStore;
use crate::store::{Store, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedFilter {
    pub search: String,
    pub mood: String,
    pub team: String,
    pub saved_only: bool,
    pub liked_only: bool,
    pub sort: SortOrder,
}

/// Pure derivation: soft-deleted posts are excluded outright, the remaining
/// predicates apply conjunctively, and the result is ordered by timestamp.
/// `saved_only` and `liked_only` may both be active; the intersection is
/// what survives.
pub fn derive_feed(posts: &[Post], prefs: &Preferences, filter: &FeedFilter) -> Vec<Post> {
    let search = filter.search.trim().to_lowercase();
    let mut out: Vec<Post> = posts
        .iter()
        .filter(|p| !p.deleted)
        .filter(|p| filter.team.is_empty() || p.team == filter.team)
        .filter(|p| filter.mood.is_empty() || p.mood == filter.mood)
        .filter(|p| {
            search.is_empty()
                || p.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&search))
                || p.content.to_lowercase().contains(&search)
        })
        .filter(|p| !filter.saved_only || prefs.is_saved(&p.id))
        .filter(|p| !filter.liked_only || prefs.is_liked(&p.id))
        .cloned()
        .collect();

    out.sort_by(|a, b| match filter.sort {
        SortOrder::Newest => b.timestamp.cmp(&a.timestamp),
        SortOrder::Oldest => a.timestamp.cmp(&b.timestamp),
    });
    out
}

pub struct FeedViewModel {
    filter: Store<FeedFilter>,
    output: Store<Vec<Post>>,
    _upstream: Vec<Subscription>,
}

impl FeedViewModel {
    pub fn new(posts: &PostStore, preferences: &PreferencesStore) -> Self {
        let filter = Store::new(FeedFilter::default());
        let output = Store::new(Vec::new());

        let recompute: Arc<dyn Fn() + Send + Sync> = {
            let posts = posts.store().clone();
            let prefs = preferences.store().clone();
            let filter = filter.clone();
            let output = output.clone();
            Arc::new(move || output.set(derive_feed(&posts.get(), &prefs.get(), &filter.get())))
        };

        let upstream = vec![
            posts.store().subscribe({
                let recompute = Arc::clone(&recompute);
                move |_| recompute()
            }),
            preferences.store().subscribe({
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
            filter,
            output,
            _upstream: upstream,
        }
    }

    pub fn output(&self) -> &Store<Vec<Post>> {
        &self.output
    }

    pub fn posts(&self) -> Vec<Post> {
        self.output.get()
    }

    pub fn filter(&self) -> FeedFilter {
        self.filter.get()
    }

    pub fn set_search(&self, term: impl Into<String>) {
        let term = term.into();
        self.filter.update(|f| f.search = term);
    }

    pub fn set_mood(&self, mood: impl Into<String>) {
        let mood = mood.into();
        self.filter.update(|f| f.mood = mood);
    }

    pub fn set_team(&self, team: impl Into<String>) {
        let team = team.into();
        self.filter.update(|f| f.team = team);
    }

    pub fn set_sort(&self, sort: SortOrder) {
        self.filter.update(|f| f.sort = sort);
    }

    /// Saved-only and liked-only are mutually exclusive at this level:
    /// activating one deactivates the other. The derivation itself tolerates
    /// both, this is purely an input convention.
    pub fn toggle_saved_filter(&self) {
        self.filter.update(|f| {
            if f.liked_only && !f.saved_only {
                f.liked_only = false;
            }
            f.saved_only = !f.saved_only;
        });
    }

    pub fn toggle_liked_filter(&self) {
        self.filter.update(|f| {
            if f.saved_only && !f.liked_only {
                f.saved_only = false;
            }
            f.liked_only = !f.liked_only;
        });
    }
}
