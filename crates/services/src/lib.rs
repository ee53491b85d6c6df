//! meme-bazaar/crates/services/src/lib.rs
//!
//! Client-core services: the reactive stores, the derived view models, the
//! composer draft machinery and the spoiler parser. Everything here talks to
//! the outside world exclusively through the `domains` ports.

pub mod drafts;
pub mod feed;
pub mod moderation;
pub mod posts;
pub mod preferences;
pub mod profile;
pub mod routes;
pub mod session;
pub mod spoiler;
pub mod store;
pub mod text;

pub use drafts::{parse_tags, Composer, ComposerPhase, ComposerState, DraftManager};
pub use feed::{derive_feed, FeedFilter, FeedViewModel, SortOrder};
pub use moderation::{derive_moderation, ConfirmFn, ModerationFilter, ModerationViewModel};
pub use posts::PostStore;
pub use preferences::PreferencesStore;
pub use profile::{derive_profile, ProfileTab, ProfileViewModel};
pub use routes::{check_access, Access, Route};
pub use session::SessionStore;
pub use spoiler::{parse as parse_spoilers, reassemble, Segment, SpoilerView};
pub use store::{Store, Subscription};
