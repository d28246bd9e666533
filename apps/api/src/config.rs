use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Sessions live at most a year.
const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// bcrypt hash guarding the editor. `None` disables the password gate.
    pub edit_password_hash: Option<String>,
    pub session_ttl_secs: i64,
    /// Directory holding `document.json` and `ai_credentials.json`.
    pub data_dir: PathBuf,
    /// Optional JSON Resume file imported as the initial document.
    pub document_seed_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            edit_password_hash: optional_env("EDIT_PASSWORD_HASH"),
            session_ttl_secs: parse_session_ttl(
                &std::env::var("SESSION_TTL_SECS").unwrap_or_else(|_| "86400".to_string()),
            )?,
            data_dir: PathBuf::from(
                std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            ),
            document_seed_path: optional_env("DOCUMENT_SEED_PATH").map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join("document.json")
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join("ai_credentials.json")
    }
}

fn parse_session_ttl(raw: &str) -> Result<i64> {
    let secs = raw
        .trim()
        .parse::<i64>()
        .context("SESSION_TTL_SECS must be a whole number of seconds")?;
    if !(1..=MAX_SESSION_TTL_SECS).contains(&secs) {
        bail!("SESSION_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS}, got {secs}");
    }
    Ok(secs)
}

/// Blank values count as unset so `EDIT_PASSWORD_HASH=` in a .env file disables the gate.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ttl_accepts_range() {
        assert_eq!(parse_session_ttl("86400").unwrap(), 86400);
        assert_eq!(parse_session_ttl(" 1 ").unwrap(), 1);
        assert_eq!(parse_session_ttl("31536000").unwrap(), MAX_SESSION_TTL_SECS);
    }

    #[test]
    fn test_session_ttl_rejects_out_of_range() {
        assert!(parse_session_ttl("0").is_err());
        assert!(parse_session_ttl("-60").is_err());
        assert!(parse_session_ttl("31536001").is_err());
        assert!(parse_session_ttl("9223372036854775807").is_err());
        assert!(parse_session_ttl("a day").is_err());
    }
}
