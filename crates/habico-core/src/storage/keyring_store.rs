//! Thin wrapper around the OS keyring for the AI service key.

use crate::error::AiError;

const SERVICE: &str = "habico";
const API_KEY_ENTRY: &str = "gemini_api_key";

/// Environment variables checked, in order, before the keyring.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

pub fn get(key: &str) -> Result<Option<String>, AiError> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    match entry.get_password() {
        Ok(pw) => Ok(Some(pw)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set(key: &str, value: &str) -> Result<(), AiError> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    entry.set_password(value)?;
    Ok(())
}

pub fn delete(key: &str) -> Result<(), AiError> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub fn store_api_key(value: &str) -> Result<(), AiError> {
    set(API_KEY_ENTRY, value.trim())
}

pub fn forget_api_key() -> Result<(), AiError> {
    delete(API_KEY_ENTRY)
}

/// First non-empty key from the environment, then the keyring.
pub fn resolve_api_key() -> Result<String, AiError> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .map(Ok)
        .unwrap_or_else(|| get(API_KEY_ENTRY)?.ok_or(AiError::MissingApiKey))
}
