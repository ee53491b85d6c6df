//! Shared fixtures for the cross-crate test suite.

pub mod fixtures {
    use chrono::{TimeZone, Utc};
    use domains::{Post, Role, User};

    pub fn user(id: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{}@example.com", username.to_lowercase()),
            role: Role::User,
        }
    }

    pub fn admin(id: &str, username: &str) -> User {
        User {
            role: Role::Admin,
            ..user(id, username)
        }
    }

    pub fn post(id: &str, author: &User, content: &str, ts_ms: i64) -> Post {
        Post {
            id: id.to_string(),
            title: None,
            content: content.to_string(),
            author: author.clone(),
            timestamp: Utc.timestamp_millis_opt(ts_ms).unwrap(),
            likes: vec![],
            tags: vec![],
            mood: "Funny".to_string(),
            team: "Engineering".to_string(),
            flags: vec![],
            deleted: false,
            flagged: false,
            comments: vec![],
        }
    }
}
