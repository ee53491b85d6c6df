//! # Local Auth Backend
//!
//! Offline identity: fabricates a device-local user on first use and keeps
//! handing it back, the way the storage-only build auto-named its
//! `Memer_<n>` account. No credential check at all.

use std::sync::Arc;

use async_trait::async_trait;
use domains::{
    AuthBackend, AuthResponse, Credentials, DeviceStore, DeviceStoreExt, Registration, Result,
    Role, User,
};
use uuid::Uuid;

const LOCAL_USER_KEY: &str = "currentUser";
const LOCAL_TOKEN: &str = "local-device-token";

pub struct LocalAuthBackend {
    device: Arc<dyn DeviceStore>,
}

impl LocalAuthBackend {
    pub fn new(device: Arc<dyn DeviceStore>) -> Self {
        Self { device }
    }

    fn device_user(&self) -> User {
        if let Some(user) = self.device.get_json::<User>(LOCAL_USER_KEY) {
            return user;
        }
        let nonce = Uuid::new_v4();
        let user = User {
            id: format!("user_{}", nonce.simple()),
            username: format!("Memer_{}", nonce.as_u128() % 1000),
            email: String::new(),
            role: Role::User,
        };
        if let Err(err) = self.device.set_json(LOCAL_USER_KEY, &user) {
            tracing::warn!(%err, "failed to persist device user");
        }
        user
    }
}

#[async_trait]
impl AuthBackend for LocalAuthBackend {
    /// Credentials are ignored offline; the device identity wins.
    async fn login(&self, _credentials: &Credentials) -> Result<AuthResponse> {
        Ok(AuthResponse {
            access_token: LOCAL_TOKEN.to_string(),
            user: self.device_user(),
        })
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        let user = User {
            id: format!("user_{}", Uuid::new_v4().simple()),
            username: registration.username.clone(),
            email: registration.email.clone(),
            role: Role::User,
        };
        self.device.set_json(LOCAL_USER_KEY, &user)?;
        Ok(AuthResponse {
            access_token: LOCAL_TOKEN.to_string(),
            user,
        })
    }
}
