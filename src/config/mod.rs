//! Runtime settings for the conference backend.
//!
//! Read once at startup from `CONFERENCE_*` variables, with a `.env` file
//! honored in development.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Settings for one server process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key the identity gateway sends with every `/api` request; unset
    /// means caller headers are accepted from anyone
    pub api_psk: Option<String>,
    /// SQLite file holding profiles and conferences
    pub db_path: PathBuf,
    /// Listen address of the HTTP server
    pub bind_addr: SocketAddr,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Config {
    /// Read settings from the environment. A blank PSK counts as unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("CONFERENCE_API_PSK")
            .ok()
            .filter(|psk| !psk.is_empty());

        let db_path = env::var("CONFERENCE_DB_PATH")
            .unwrap_or_else(|_| "./data/conference.sqlite".to_string())
            .into();

        let bind_addr = env::var("CONFERENCE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid CONFERENCE_BIND_ADDR format");

        let log_level = env::var("CONFERENCE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("CONFERENCE_API_PSK");
        env::remove_var("CONFERENCE_DB_PATH");
        env::remove_var("CONFERENCE_BIND_ADDR");
        env::remove_var("CONFERENCE_LOG_LEVEL");

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/conference.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");

        // Overrides, and a blank PSK left unset
        env::set_var("CONFERENCE_API_PSK", "");
        env::set_var("CONFERENCE_DB_PATH", "/tmp/conf.sqlite");
        env::set_var("CONFERENCE_BIND_ADDR", "0.0.0.0:9000");

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("/tmp/conf.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:9000");

        env::remove_var("CONFERENCE_API_PSK");
        env::remove_var("CONFERENCE_DB_PATH");
        env::remove_var("CONFERENCE_BIND_ADDR");
    }
}
