//! Server configuration from the environment.
//!
//! One required secret (the provider API key); everything else has a
//! default. Loaded once at startup.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use log::{info, warn};

pub struct Config {
    pub port: u16,
    /// Provider API key — the only required setting.
    pub api_key: String,
    /// Provider base URL; overridable so tests can point at a mock.
    pub api_base: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("ROOTLENS_PORT", "8080"),
            api_key: require("OPENAI_API_KEY"),
            api_base: try_load("OPENAI_API_BASE", "https://api.openai.com"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| warn!("invalid {key} value: {e}"))
        .expect("environment misconfigured")
}

fn require(key: &str) -> String {
    env::var(key)
        .map_err(|_| warn!("required environment variable {key} is missing"))
        .expect("secrets misconfigured")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let port: u16 = try_load("ROOTLENS_TEST_UNSET_PORT", "1234");
        assert_eq!(port, 1234);
    }

    #[test]
    fn set_values_win() {
        env::set_var("ROOTLENS_TEST_SET_PORT", "4321");
        let port: u16 = try_load("ROOTLENS_TEST_SET_PORT", "1234");
        assert_eq!(port, 4321);
        env::remove_var("ROOTLENS_TEST_SET_PORT");
    }
}
