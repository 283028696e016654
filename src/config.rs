use std::path::{Path, PathBuf};

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

const SUBSCRIPTIONS_FILE: &str = "subscriptions.json";
const VAPID_PRIVATE_KEY_FILE: &str = "vapid_private_key.pem";
const VAPID_PUBLIC_KEY_FILE: &str = "vapid_public_key.pem";

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    #[serde(default = "default_vapid_subject")]
    pub vapid_subject: String,

    #[serde(default = "default_push_ttl_seconds")]
    pub push_ttl_seconds: u32,

    #[serde(default = "default_server_host")]
    pub server_host: String,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_vapid_subject() -> String {
    "mailto:admin@example.com".to_string()
}

fn default_push_ttl_seconds() -> u32 {
    0
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    /// Builds the config from `KEY=value` pairs named like the environment variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Self>(vars)
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    /// Defaults for every field, rooted at the given directories.
    pub fn with_dirs(data_dir: impl AsRef<Path>, static_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            static_dir: static_dir.as_ref().to_path_buf(),
            vapid_subject: default_vapid_subject(),
            push_ttl_seconds: default_push_ttl_seconds(),
            server_host: default_server_host(),
            server_port: default_server_port(),
        }
    }

    pub fn subscriptions_file(&self) -> PathBuf {
        self.data_dir.join(SUBSCRIPTIONS_FILE)
    }

    pub fn vapid_private_key_file(&self) -> PathBuf {
        self.data_dir.join(VAPID_PRIVATE_KEY_FILE)
    }

    pub fn vapid_public_key_file(&self) -> PathBuf {
        self.data_dir.join(VAPID_PUBLIC_KEY_FILE)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
