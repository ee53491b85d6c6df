//! # View States and Guards
//!
//! Navigable routes as abstract view states. Gating is a pure predicate over
//! the current session: failures resolve to a silent redirect, never an
//! error surface.

use domains::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Feed,
    Login,
    Register,
    PostDetail(String),
    Compose,
    Edit(String),
    ProfileSaved,
    ProfileLiked,
    AdminModeration,
}

impl Default for Route {
    fn default() -> Self {
        Route::Feed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(Route),
}

/// Resolve whether `user` may enter `route`.
///
/// Everything except the auth screens requires a session; the moderation
/// dashboard additionally requires the admin role and falls back to the
/// feed rather than the login screen.
pub fn check_access(route: &Route, user: Option<&User>) -> Access {
    match route {
        Route::Login | Route::Register => Access::Granted,
        Route::AdminModeration => match user {
            None => Access::Redirect(Route::Login),
            Some(user) if user.is_admin() => Access::Granted,
            Some(_) => Access::Redirect(Route::Feed),
        },
        _ => match user {
            Some(_) => Access::Granted,
            None => Access::Redirect(Route::Login),
        },
    }
}
