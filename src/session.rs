use leptos::logging::warn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::ClientError;
use crate::model::User;
use crate::store::AuthState;

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the signed-in user as JSON.
pub const USER_KEY: &str = "user";

/// String key/value persistence the session is kept in.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&self, key: &str);
}

/// The browser's `localStorage`. Only usable once running in the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        use gloo_storage::Storage;
        gloo_storage::LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        use gloo_storage::Storage;
        gloo_storage::LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| ClientError::Storage(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) {
        use gloo_storage::Storage;
        gloo_storage::LocalStorage::delete(key);
    }
}

/// Process-local storage, used on the server and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries
            .lock()
            .map_err(|e| ClientError::Storage(e.to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// The signed-in user's credentials. Handed to whatever needs them through context rather than
/// read from global storage.
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}

impl Session {
    pub fn new(storage: impl KeyValueStore + 'static) -> Self {
        Session {
            storage: Arc::new(storage),
        }
    }

    pub fn browser() -> Self {
        Session::new(BrowserStorage)
    }

    pub fn in_memory() -> Self {
        Session::new(MemoryStorage::default())
    }

    /// Restores the auth state saved by a previous visit. A user record that no longer parses is
    /// removed.
    pub fn load(&self) -> AuthState {
        let token = self.token();
        let user = self.storage.get(USER_KEY).and_then(|raw| {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Discarding stored user record: {}", e);
                    self.storage.remove(USER_KEY);
                    None
                }
            }
        });
        AuthState {
            user,
            token,
            ..AuthState::default()
        }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Stores a freshly issued token and, when known, the user it belongs to.
    pub fn persist(&self, token: &str, user: Option<&User>) -> Result<(), ClientError> {
        self.storage.set(TOKEN_KEY, token)?;
        match user {
            Some(user) => {
                let json =
                    serde_json::to_string(user).map_err(|e| ClientError::Storage(e.to_string()))?;
                self.storage.set(USER_KEY, &json)?;
            }
            None => self.storage.remove(USER_KEY),
        }
        Ok(())
    }

    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> User {
        User {
            id: "u1".to_string(),
            username: "ada".to_string(),
            email: Some("ada@example.com".to_string()),
            role: "user".to_string(),
            ..User::default()
        }
    }

    #[test]
    fn test_load_empty() {
        let session = Session::in_memory();
        let state = session.load();
        assert!(!state.is_authenticated());
        assert!(state.user.is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_persist_then_load() {
        let session = Session::in_memory();
        session.persist("tok-123", Some(&ada())).unwrap();

        let state = session.load();
        assert!(state.is_authenticated());
        assert_eq!(state.token.as_deref(), Some("tok-123"));
        assert_eq!(state.user, Some(ada()));
    }

    #[test]
    fn test_clear() {
        let session = Session::in_memory();
        session.persist("tok-123", Some(&ada())).unwrap();
        session.clear();
        assert!(session.token().is_none());
        assert!(session.load().user.is_none());
    }

    #[test]
    fn test_clones_share_storage() {
        let session = Session::in_memory();
        let other = session.clone();
        session.persist("tok-9", None).unwrap();
        assert_eq!(other.token().as_deref(), Some("tok-9"));
        other.clear();
        assert!(session.token().is_none());
    }

    #[test]
    fn test_corrupt_user_is_dropped() {
        let storage = MemoryStorage::default();
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();
        let session = Session::new(storage);

        let state = session.load();
        assert_eq!(state.token.as_deref(), Some("tok"));
        assert!(state.user.is_none());
        // The bad record is gone for the next load as well.
        assert!(session.storage.get(USER_KEY).is_none());
    }

    #[test]
    fn test_empty_token_is_no_token() {
        let storage = MemoryStorage::default();
        storage.set(TOKEN_KEY, "").unwrap();
        assert!(Session::new(storage).token().is_none());
    }
}
