//! Profile tabs: the user's saved and liked post lists, derived from the
//! post collection and the preference sets.

use std::sync::Arc;

use domains::{Post, Preferences};

use crate::posts::PostStore;
use crate::preferences::PreferencesStore;
use crate::store::{Store, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTab {
    Saved,
    Liked,
}

pub fn derive_profile(posts: &[Post], prefs: &Preferences, tab: ProfileTab) -> Vec<Post> {
    posts
        .iter()
        .filter(|p| match tab {
            ProfileTab::Saved => prefs.is_saved(&p.id),
            ProfileTab::Liked => prefs.is_liked(&p.id),
        })
        .cloned()
        .collect()
}

pub struct ProfileViewModel {
    output: Store<Vec<Post>>,
    _upstream: Vec<Subscription>,
}

impl ProfileViewModel {
    pub fn new(posts: &PostStore, preferences: &PreferencesStore, tab: ProfileTab) -> Self {
        let output = Store::new(Vec::new());

        let recompute: Arc<dyn Fn() + Send + Sync> = {
            let posts = posts.store().clone();
            let prefs = preferences.store().clone();
            let output = output.clone();
            Arc::new(move || output.set(derive_profile(&posts.get(), &prefs.get(), tab)))
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
        ];
        recompute();

        Self {
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
}
