// SPDX-License-Identifier: MIT

//! Environment-driven settings for the server and the HTTP clients
//!
//! Values come from the process environment (after `dotenv` has loaded any
//! `.env` file); CLI flags override them.

use crate::adk::error::{Result, StageflowError};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SEQUENCES_DIR: &str = "sequences";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_RUNTIME_URL: &str = "http://localhost:2024";

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub sequences_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sequences_dir: PathBuf::from(DEFAULT_SEQUENCES_DIR),
        }
    }
}

impl ServerConfig {
    /// Read `STAGEFLOW_HOST`, `STAGEFLOW_PORT` and `STAGEFLOW_SEQUENCES_DIR`
    pub fn from_env() -> Result<Self> {
        let port = match env::var("STAGEFLOW_PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|e| {
                StageflowError::config(format!("STAGEFLOW_PORT '{}': {}", raw, e))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            host: var_or("STAGEFLOW_HOST", DEFAULT_HOST),
            port,
            sequences_dir: PathBuf::from(var_or("STAGEFLOW_SEQUENCES_DIR", DEFAULT_SEQUENCES_DIR)),
        })
    }

    /// `host:port`, suitable for `TcpListener::bind`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of a running stageflow server
    pub api_url: String,
    /// Base URL of the assistant runtime
    pub runtime_url: String,
    pub runtime_api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            runtime_url: DEFAULT_RUNTIME_URL.to_string(),
            runtime_api_key: None,
        }
    }
}

impl ClientConfig {
    /// Read `STAGEFLOW_API_URL`, `RUNTIME_URL` and `RUNTIME_API_KEY`
    pub fn from_env() -> Self {
        Self {
            api_url: var_or("STAGEFLOW_API_URL", DEFAULT_API_URL),
            runtime_url: var_or("RUNTIME_URL", DEFAULT_RUNTIME_URL),
            runtime_api_key: env::var("RUNTIME_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.sequences_dir, PathBuf::from("sequences"));

        let client = ClientConfig::default();
        assert_eq!(client.api_url, "http://localhost:8000");
        assert!(client.runtime_api_key.is_none());
    }

    // the only test touching STAGEFLOW_PORT
    #[test]
    fn test_port_from_env() {
        env::set_var("STAGEFLOW_PORT", "9100");
        assert_eq!(ServerConfig::from_env().unwrap().port, 9100);

        env::set_var("STAGEFLOW_PORT", "eighty");
        let err = ServerConfig::from_env().unwrap_err();
        env::remove_var("STAGEFLOW_PORT");

        assert!(matches!(err, StageflowError::Config(_)));
        assert!(err.to_string().contains("STAGEFLOW_PORT 'eighty'"));
    }
}
