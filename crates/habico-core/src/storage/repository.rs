//! Typed load/save boundary over a [`StateStore`].
//!
//! Storage failures never reach the engine: reads fall back to defaults
//! and writes report `false`, both with a warning in the log.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::store::{StateStore, StorageKey};
use crate::account::User;
use crate::error::StorageError;
use crate::habit::HabitState;

pub struct HabitRepository<S: StateStore> {
    store: S,
}

impl<S: StateStore> HabitRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.as_str().to_string(),
                message: e.to_string(),
            })
    }

    fn write<T: Serialize>(&self, key: StorageKey, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(|e| StorageError::Corrupt {
                key: key.as_str().to_string(),
                message: e.to_string(),
            })
            .and_then(|json| self.store.set(key, &json));
        match result {
            Ok(()) => {
                debug!(key = key.as_str(), "saved");
                true
            }
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "failed to save");
                false
            }
        }
    }

    fn remove(&self, key: StorageKey) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "failed to remove");
                false
            }
        }
    }

    /// Load the habit state, or a fresh one when nothing usable is stored.
    pub fn load_habit(&self, now_ms: i64) -> HabitState {
        match self.read::<HabitState>(StorageKey::HabitData) {
            Ok(Some(state)) => state.normalized(now_ms),
            Ok(None) => HabitState::new(now_ms),
            Err(e) => {
                warn!(error = %e, "failed to load habit data; starting fresh");
                HabitState::new(now_ms)
            }
        }
    }

    pub fn save_habit(&self, state: &HabitState) -> bool {
        self.write(StorageKey::HabitData, state)
    }

    /// Load the profile; a missing one is created with defaults and saved.
    pub fn load_user(&self) -> User {
        match self.read::<User>(StorageKey::User) {
            Ok(Some(user)) => user,
            Ok(None) => {
                let user = User::default();
                self.write(StorageKey::User, &user);
                user
            }
            Err(e) => {
                warn!(error = %e, "failed to load user; using default profile");
                User::default()
            }
        }
    }

    pub fn save_user(&self, user: &User) -> bool {
        self.write(StorageKey::User, user)
    }

    pub fn flag(&self, key: StorageKey) -> bool {
        match self.read::<bool>(key) {
            Ok(value) => value.unwrap_or(false),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "failed to read flag");
                false
            }
        }
    }

    pub fn set_flag(&self, key: StorageKey, value: bool) -> bool {
        self.write(key, &value)
    }

    /// Logout / delete account: drop profile, habit data and onboarding flag.
    pub fn clear_account(&self) -> bool {
        [
            StorageKey::User,
            StorageKey::HabitData,
            StorageKey::OnboardingComplete,
        ]
        .into_iter()
        .map(|key| self.remove(key))
        .fold(true, |ok, removed| ok && removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Plan;
    use crate::storage::MemoryStore;

    struct BrokenStore;

    impl StateStore for BrokenStore {
        fn get(&self, _key: StorageKey) -> Result<Option<String>, StorageError> {
            Err(StorageError::Locked)
        }

        fn set(&self, _key: StorageKey, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }

        fn remove(&self, _key: StorageKey) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }
    }

    #[test]
    fn habit_roundtrip() {
        let repo = HabitRepository::new(MemoryStore::new());
        let mut state = repo.load_habit(10);
        state.day = 7;
        state.habit_type = Some("Vaping".into());
        assert!(repo.save_habit(&state));
        assert_eq!(repo.load_habit(20), state);
    }

    #[test]
    fn corrupt_document_falls_back_to_fresh_state() {
        let store = MemoryStore::new();
        store.set(StorageKey::HabitData, "{not json").unwrap();
        let repo = HabitRepository::new(store);
        assert_eq!(repo.load_habit(5), HabitState::new(5));
    }

    #[test]
    fn broken_store_is_swallowed() {
        let repo = HabitRepository::new(BrokenStore);
        assert_eq!(repo.load_habit(1), HabitState::new(1));
        assert!(!repo.save_habit(&HabitState::default()));
        assert_eq!(repo.load_user(), User::default());
        assert!(!repo.flag(StorageKey::OnboardingComplete));
        assert!(!repo.clear_account());
    }

    #[test]
    fn missing_user_is_created() {
        let repo = HabitRepository::new(MemoryStore::new());
        let user = repo.load_user();
        assert_eq!(user.name, "Friend");
        assert!(repo.store().get(StorageKey::User).unwrap().is_some());
    }

    #[test]
    fn clear_account_keeps_disclaimer_flag() {
        let repo = HabitRepository::new(MemoryStore::new());
        repo.save_user(&User {
            plan: Plan::Lifetime,
            ..User::default()
        });
        repo.save_habit(&HabitState::new(0));
        repo.set_flag(StorageKey::OnboardingComplete, true);
        repo.set_flag(StorageKey::ChatDisclaimerSeen, true);

        assert!(repo.clear_account());
        assert!(!repo.flag(StorageKey::OnboardingComplete));
        assert!(repo.flag(StorageKey::ChatDisclaimerSeen));
        assert!(repo.store().get(StorageKey::HabitData).unwrap().is_none());
        assert_eq!(repo.load_user().plan, Plan::Free);
    }
}
