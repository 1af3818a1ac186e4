//! Keypair loading helpers.
//!
//! Key management is the caller's concern; these helpers only cover the two
//! common cases of getting a [`Keypair`] into the process: a Solana CLI
//! id.json file (a JSON array of 64 bytes) and an environment variable
//! holding either that JSON array or a base58-encoded keypair.

use solana_keypair::Keypair;
use std::path::{Path, PathBuf};

/// Environment variable consulted by [`load_keypair_from_env`].
pub const DEFAULT_KEYPAIR_ENV_VAR: &str = "SOLANA_PRIVATE_KEY";

/// Errors that can occur while loading a keypair.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Keypair file not found or unreadable: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key material was not a JSON array of exactly 64 bytes, nor a
    /// base58 string of the same.
    #[error("Invalid keypair format: {0}")]
    InvalidFormat(String),
    #[error("Environment variable {0} not set")]
    EnvVar(String),
}

/// Loads a keypair from a Solana CLI id.json file.
///
/// A leading `~` is expanded against `$HOME`.
///
/// # Example
///
/// ```rust,ignore
/// use tetto_client::wallet::load_keypair_from_file;
///
/// let keypair = load_keypair_from_file("~/.config/solana/id.json")?;
/// ```
pub fn load_keypair_from_file<P: AsRef<Path>>(path: P) -> Result<Keypair, WalletError> {
    let path = expand_home(path.as_ref());
    let contents = std::fs::read_to_string(&path).map_err(|source| WalletError::Io {
        path: path.clone(),
        source,
    })?;
    keypair_from_str(contents.trim())
}

/// Loads a keypair from the [`DEFAULT_KEYPAIR_ENV_VAR`] environment variable.
pub fn load_keypair_from_env() -> Result<Keypair, WalletError> {
    load_keypair_from_env_var(DEFAULT_KEYPAIR_ENV_VAR)
}

/// Loads a keypair from the given environment variable.
///
/// The variable may hold a JSON byte array (the id.json format) or a
/// base58-encoded keypair string.
pub fn load_keypair_from_env_var(var: &str) -> Result<Keypair, WalletError> {
    let value = std::env::var(var).map_err(|_| WalletError::EnvVar(var.to_string()))?;
    keypair_from_str(value.trim())
}

/// Generates a new random keypair.
pub fn generate_keypair() -> Keypair {
    Keypair::new()
}

fn keypair_from_str(s: &str) -> Result<Keypair, WalletError> {
    let bytes: Vec<u8> = if s.starts_with('[') {
        serde_json::from_str(s)
            .map_err(|e| WalletError::InvalidFormat(format!("not a JSON byte array: {e}")))?
    } else {
        bs58::decode(s)
            .into_vec()
            .map_err(|e| WalletError::InvalidFormat(format!("not valid base58: {e}")))?
    };
    if bytes.len() != 64 {
        return Err(WalletError::InvalidFormat(format!(
            "expected 64 bytes, got {}",
            bytes.len()
        )));
    }
    // The public half must match the secret half; reject corrupted key
    // material instead of panicking on it.
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| WalletError::InvalidFormat(format!("inconsistent keypair bytes: {e}")))
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
