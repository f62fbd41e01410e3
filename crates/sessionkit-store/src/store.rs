//! The typed session store: token, profile and remember-me keys on top of
//! a [`Storage`] backend.

use std::sync::Arc;

use sessionkit_protocol::{Codec, JsonCodec, Token, UserProfile};

use crate::{Storage, StorageOp, StoreError};

/// Key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the JSON-serialized [`UserProfile`].
pub const USER_KEY: &str = "user";
/// Key holding `"true"` when the user asked to be remembered.
pub const REMEMBER_ME_KEY: &str = "rememberMe";
/// Key holding the remembered username.
pub const SAVED_USERNAME_KEY: &str = "savedUsername";

/// Durable mirror of the current session.
///
/// Cheap to clone: clones share the same backend, so the session state,
/// the transport and the refresh task all see the same data.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    codec: JsonCodec,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: impl Storage) -> Self {
        Self::from_arc(Arc::new(storage))
    }

    pub fn from_arc(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            codec: JsonCodec,
        }
    }

    /// Persists a token and profile together, in one batch.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the profile can't be encoded or the
    /// backend can't persist the batch.
    pub fn save(&self, token: &Token, user: &UserProfile) -> Result<(), StoreError> {
        self.storage.apply(&[
            StorageOp::set(TOKEN_KEY, token.as_str()),
            StorageOp::set(USER_KEY, self.encode_user(user)?),
        ])
    }

    /// Writes the token, or removes it when `None` (or empty).
    pub fn set_token(&self, token: Option<&Token>) -> Result<(), StoreError> {
        let op = match token.filter(|t| !t.is_empty()) {
            Some(token) => StorageOp::set(TOKEN_KEY, token.as_str()),
            None => StorageOp::remove(TOKEN_KEY),
        };
        self.storage.apply(&[op])
    }

    /// Writes the profile, or removes it when `None`.
    pub fn set_user(&self, user: Option<&UserProfile>) -> Result<(), StoreError> {
        let op = match user {
            Some(user) => StorageOp::set(USER_KEY, self.encode_user(user)?),
            None => StorageOp::remove(USER_KEY),
        };
        self.storage.apply(&[op])
    }

    /// Removes token and profile. Remember-me keys are left alone.
    ///
    /// This is what the transport does on a 401: the session is dead, but
    /// the login form may still pre-fill the remembered username.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage
            .apply(&[StorageOp::remove(TOKEN_KEY), StorageOp::remove(USER_KEY)])
    }

    /// Removes every session-related key, remember-me included, atomically.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.storage.apply(&[
            StorageOp::remove(TOKEN_KEY),
            StorageOp::remove(USER_KEY),
            StorageOp::remove(REMEMBER_ME_KEY),
            StorageOp::remove(SAVED_USERNAME_KEY),
        ])
    }

    /// Reads the stored token. An empty stored string counts as no token.
    pub fn load_token(&self) -> Result<Option<Token>, StoreError> {
        Ok(self
            .storage
            .get(TOKEN_KEY)?
            .filter(|raw| !raw.is_empty())
            .map(Token::new))
    }

    /// Reads the stored profile.
    ///
    /// Lenient: a value that doesn't decode as a profile yields `Ok(None)`.
    pub fn load_user(&self) -> Result<Option<UserProfile>, StoreError> {
        let Some(raw) = self.storage.get(USER_KEY)? else {
            return Ok(None);
        };
        match self.codec.decode::<UserProfile>(raw.as_bytes()) {
            Ok(user) => Ok(Some(user)),
            Err(error) => {
                tracing::debug!(%error, "stored user profile is unreadable, ignoring");
                Ok(None)
            }
        }
    }

    /// Records (or forgets, with `None`) the username to pre-fill on the
    /// next login.
    pub fn remember_username(&self, username: Option<&str>) -> Result<(), StoreError> {
        match username {
            Some(name) => self.storage.apply(&[
                StorageOp::set(REMEMBER_ME_KEY, "true"),
                StorageOp::set(SAVED_USERNAME_KEY, name),
            ]),
            None => self.storage.apply(&[
                StorageOp::remove(REMEMBER_ME_KEY),
                StorageOp::remove(SAVED_USERNAME_KEY),
            ]),
        }
    }

    /// The remembered username, if remember-me is on.
    pub fn saved_username(&self) -> Result<Option<String>, StoreError> {
        if self.storage.get(REMEMBER_ME_KEY)?.as_deref() != Some("true") {
            return Ok(None);
        }
        self.storage.get(SAVED_USERNAME_KEY)
    }

    fn encode_user(&self, user: &UserProfile) -> Result<String, StoreError> {
        let bytes = self.codec.encode(user).map_err(StoreError::Encode)?;
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    fn alice() -> UserProfile {
        UserProfile {
            id: 1,
            username: "alice".into(),
            admin: 1,
            ..UserProfile::default()
        }
    }

    fn store_with(storage: Arc<MemoryStorage>) -> SessionStore {
        SessionStore::from_arc(storage)
    }

    #[test]
    fn test_save_then_load_returns_same_session() {
        let store = SessionStore::new(MemoryStorage::new());

        store.save(&Token::new("tok"), &alice()).unwrap();

        assert_eq!(store.load_token().unwrap(), Some(Token::new("tok")));
        assert_eq!(store.load_user().unwrap(), Some(alice()));
    }

    #[test]
    fn test_load_user_corrupt_value_returns_none() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .apply(&[StorageOp::set(USER_KEY, "{\"id\": oops")])
            .unwrap();
        let store = store_with(storage);

        assert_eq!(store.load_user().unwrap(), None);
    }

    #[test]
    fn test_set_token_empty_removes_key() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage.clone());
        store.set_token(Some(&Token::new("t"))).unwrap();

        store.set_token(Some(&Token::new(""))).unwrap();

        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_load_token_ignores_empty_string() {
        let storage = Arc::new(MemoryStorage::new());
        storage.apply(&[StorageOp::set(TOKEN_KEY, "")]).unwrap();

        assert_eq!(store_with(storage).load_token().unwrap(), None);
    }

    #[test]
    fn test_clear_keeps_remembered_username() {
        let store = SessionStore::new(MemoryStorage::new());
        store.save(&Token::new("t"), &alice()).unwrap();
        store.remember_username(Some("alice")).unwrap();

        store.clear().unwrap();

        assert_eq!(store.load_token().unwrap(), None);
        assert_eq!(store.load_user().unwrap(), None);
        assert_eq!(store.saved_username().unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn test_clear_all_removes_every_key() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage.clone());
        store.save(&Token::new("t"), &alice()).unwrap();
        store.remember_username(Some("alice")).unwrap();

        store.clear_all().unwrap();

        assert!(storage.is_empty());
    }

    #[test]
    fn test_saved_username_requires_remember_flag() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .apply(&[StorageOp::set(SAVED_USERNAME_KEY, "bob")])
            .unwrap();

        assert_eq!(store_with(storage).saved_username().unwrap(), None);
    }

    #[test]
    fn test_remember_username_none_forgets() {
        let store = SessionStore::new(MemoryStorage::new());
        store.remember_username(Some("bob")).unwrap();

        store.remember_username(None).unwrap();

        assert_eq!(store.saved_username().unwrap(), None);
    }
}
