//! End-to-end feed derivation: seeded collection, composer publish, like
//! toggle and filter interplay, all observed through the derived output.

use std::sync::Arc;
use std::time::Duration;

use domains::testing::MemoryDeviceStore;
use domains::DeviceStore;
use integration_tests::fixtures;
use services::{Composer, FeedViewModel, PostStore, PreferencesStore, SortOrder};
use storage_adapters::LocalPostBackend;

struct Harness {
    device: Arc<dyn DeviceStore>,
    preferences: PreferencesStore,
    posts: PostStore,
}

async fn harness() -> Harness {
    let device: Arc<dyn DeviceStore> = Arc::new(MemoryDeviceStore::new());
    let preferences = PreferencesStore::new(Arc::clone(&device));
    let posts = PostStore::new(
        Arc::new(LocalPostBackend::new(Arc::clone(&device))),
        preferences.clone(),
    );
    posts.load().await.expect("seeded load");
    Harness {
        device,
        preferences,
        posts,
    }
}

fn ids(posts: &[domains::Post]) -> Vec<String> {
    posts.iter().map(|p| p.id.clone()).collect()
}

#[tokio::test]
async fn seeded_feed_sorts_newest_first_and_flips_on_request() {
    let h = harness().await;
    let feed = FeedViewModel::new(&h.posts, &h.preferences);

    assert_eq!(ids(&feed.posts()), ["1", "2", "3"]);
    feed.set_sort(SortOrder::Oldest);
    assert_eq!(ids(&feed.posts()), ["3", "2", "1"]);
}

#[tokio::test]
async fn published_post_surfaces_at_the_top_of_the_feed() {
    let h = harness().await;
    let feed = FeedViewModel::new(&h.posts, &h.preferences);
    let author = fixtures::user("u7", "FreshMemer");

    let mut composer = Composer::new(
        Arc::clone(&h.device),
        author,
        None,
        Duration::from_millis(10),
    );
    composer.edit(|state| {
        state.content = "Fresh ||spoiler|| content".to_string();
        state.mood = "Sarcastic".to_string();
        state.team = "Design".to_string();
        state.tags_input = "new, hot".to_string();
    });
    let published = composer.publish(&h.posts).await.expect("publish");

    let current = feed.posts();
    assert_eq!(current.len(), 4);
    assert_eq!(current[0].id, published.id);
    assert_eq!(current[0].tags, vec!["new".to_string(), "hot".to_string()]);

    // The new post answers a conjunctive mood+search filter.
    feed.set_mood("Sarcastic");
    feed.set_search("FRESH");
    assert_eq!(ids(&feed.posts()), [published.id.clone()]);
    feed.set_search("no such meme");
    assert!(feed.posts().is_empty());
}

#[tokio::test]
async fn like_toggle_feeds_the_liked_only_filter() {
    let h = harness().await;
    let feed = FeedViewModel::new(&h.posts, &h.preferences);
    let liker = fixtures::user("u9", "Liker");

    assert!(h.posts.toggle_like(&liker, "2").await.expect("like"));
    feed.toggle_liked_filter();
    assert_eq!(ids(&feed.posts()), ["2"]);

    // The involution clears both the post set and the filter result.
    assert!(!h.posts.toggle_like(&liker, "2").await.expect("unlike"));
    assert!(feed.posts().is_empty());
}

#[tokio::test]
async fn saved_filter_tracks_preferences_and_soft_delete_wins() {
    let h = harness().await;
    let feed = FeedViewModel::new(&h.posts, &h.preferences);

    h.preferences.toggle_saved("3").expect("save");
    feed.toggle_saved_filter();
    assert_eq!(ids(&feed.posts()), ["3"]);

    // A soft-deleted post leaves every feed view immediately, saved or not.
    h.posts.soft_delete("3").await.expect("soft delete");
    assert!(feed.posts().is_empty());
}
