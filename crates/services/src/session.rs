//! # Session Store
//!
//! Holds the current authenticated identity, hydrated from the persisted
//! token + user blobs. A device with a token but an unreadable user blob is
//! treated as unauthenticated.

use std::sync::Arc;

use domains::{
    AuthBackend, AuthResponse, Credentials, DeviceStore, DeviceStoreExt, Registration, Result,
    User,
};

use crate::routes::Route;
use crate::store::Store;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

#[derive(Clone)]
pub struct SessionStore {
    device: Arc<dyn DeviceStore>,
    backend: Arc<dyn AuthBackend>,
    current: Store<Option<User>>,
}

impl SessionStore {
    pub fn new(device: Arc<dyn DeviceStore>, backend: Arc<dyn AuthBackend>) -> Self {
        // Both blobs must be present for a restored session.
        let user = match device.get_raw(TOKEN_KEY) {
            Some(_) => device.get_json::<User>(USER_KEY),
            None => None,
        };
        Self {
            device,
            backend,
            current: Store::new(user),
        }
    }

    pub fn current(&self) -> &Store<Option<User>> {
        &self.current
    }

    pub fn current_user(&self) -> Option<User> {
        self.current.get()
    }

    pub fn token(&self) -> Option<String> {
        self.device.get_raw(TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.current.get().is_some()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let response = self.backend.login(credentials).await?;
        self.set_session(&response)?;
        Ok(response.user)
    }

    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let response = self.backend.register(registration).await?;
        self.set_session(&response)?;
        Ok(response.user)
    }

    fn set_session(&self, response: &AuthResponse) -> Result<()> {
        self.device.set_raw(TOKEN_KEY, &response.access_token)?;
        self.device.set_json(USER_KEY, &response.user)?;
        self.current.set(Some(response.user.clone()));
        Ok(())
    }

    /// Clear the session and hand back the route the shell should land on.
    /// Device cleanup failures are logged; the in-memory session ends
    /// regardless.
    pub fn logout(&self) -> Route {
        if let Err(err) = self.device.remove(TOKEN_KEY) {
            tracing::warn!(%err, "failed to clear persisted token");
        }
        if let Err(err) = self.device.remove(USER_KEY) {
            tracing::warn!(%err, "failed to clear persisted user");
        }
        self.current.set(None);
        Route::Login
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::testing::MemoryDeviceStore;
    use domains::{MockAuthBackend, Role};

    fn admin_blob() -> &'static str {
        r#"{"id":"u9","username":"Mod","email":"mod@example.com","role":"admin"}"#
    }

    #[test]
    fn hydrates_only_when_token_and_user_are_both_present() {
        let backend = Arc::new(MockAuthBackend::new());

        let device = Arc::new(
            MemoryDeviceStore::new()
                .with_entry(TOKEN_KEY, "tok")
                .with_entry(USER_KEY, admin_blob()),
        );
        let session = SessionStore::new(device, backend.clone());
        assert!(session.is_authenticated());
        assert_eq!(session.current_user().unwrap().role, Role::Admin);

        let device = Arc::new(MemoryDeviceStore::new().with_entry(USER_KEY, admin_blob()));
        let session = SessionStore::new(device, backend.clone());
        assert!(!session.is_authenticated());

        // Token present but user blob corrupt: treated as absent.
        let device = Arc::new(
            MemoryDeviceStore::new()
                .with_entry(TOKEN_KEY, "tok")
                .with_entry(USER_KEY, "{not json"),
        );
        let session = SessionStore::new(device, backend);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn login_persists_session_and_logout_clears_it() {
        let mut backend = MockAuthBackend::new();
        backend.expect_login().returning(|credentials| {
            Ok(AuthResponse {
                access_token: "fake-jwt-token-u1".to_string(),
                user: User {
                    id: "u1".to_string(),
                    username: "Memer".to_string(),
                    email: credentials.email.clone(),
                    role: Role::User,
                },
            })
        });

        let device = Arc::new(MemoryDeviceStore::new());
        let session = SessionStore::new(device.clone(), Arc::new(backend));

        let user = session
            .login(&Credentials {
                email: "memer@example.com".to_string(),
                password: "hunter2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.id, "u1");
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("fake-jwt-token-u1"));

        assert_eq!(session.logout(), Route::Login);
        assert!(!session.is_authenticated());
        assert!(device.get_raw(TOKEN_KEY).is_none());
    }
}
