use clap::Subcommand;
use habico_core::storage::keyring_store;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the Gemini API key in the OS keyring
    SetKey {
        /// API key
        key: String,
    },
    /// Remove the stored API key
    ForgetKey,
    /// Report where the API key comes from
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::SetKey { key } => {
            if key.trim().is_empty() {
                return Err("API key must not be empty".into());
            }
            keyring_store::store_api_key(&key)?;
            println!("API key stored");
        }
        AuthAction::ForgetKey => {
            keyring_store::forget_api_key()?;
            println!("API key removed");
        }
        AuthAction::Status => {
            let from_env = keyring_store::API_KEY_ENV_VARS
                .iter()
                .find(|var| std::env::var(var).is_ok_and(|v| !v.trim().is_empty()));
            match from_env {
                Some(var) => println!("API key: from ${var}"),
                None => match keyring_store::resolve_api_key() {
                    Ok(_) => println!("API key: stored in keyring"),
                    Err(e) => println!("API key: not configured ({e})"),
                },
            }
        }
    }
    Ok(())
}
