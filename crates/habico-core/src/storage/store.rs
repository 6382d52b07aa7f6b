//! The storage seam: a key/value store of JSON documents.

use std::collections::HashMap;
use std::sync::Mutex;

use super::database::Database;
use crate::error::StorageError;

/// Logical documents the app persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    HabitData,
    User,
    OnboardingComplete,
    ChatDisclaimerSeen,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::HabitData,
        StorageKey::User,
        StorageKey::OnboardingComplete,
        StorageKey::ChatDisclaimerSeen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::HabitData => "habicoData",
            StorageKey::User => "habico-user",
            StorageKey::OnboardingComplete => "habico-onboarding-complete",
            StorageKey::ChatDisclaimerSeen => "habico-chat-disclaimer-seen",
        }
    }
}

/// Whole-document reads and writes by key.
pub trait StateStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

impl StateStore for Database {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.kv_get(key.as_str())?)
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        Ok(self.kv_set(key.as_str(), value)?)
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        Ok(self.kv_delete(key.as_str())?)
    }
}

/// Process-local store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<StorageKey, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::QueryFailed("memory store poisoned".into()))
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.lock()?.remove(&key);
        Ok(())
    }
}
