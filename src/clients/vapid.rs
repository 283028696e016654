use std::path::{Path, PathBuf};

use anyhow::{Error, Result, anyhow};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use p256::{
    SecretKey,
    elliptic_curve::sec1::ToEncodedPoint,
    pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding},
};
use rand_core::OsRng;
use tokio::{fs, sync::RwLock};
use tracing::{info, warn};

use crate::config::Config;

/// Application server key pair used to sign VAPID tokens.
#[derive(Clone)]
pub struct VapidKeys {
    pub private_pem: String,
    pub public_key: String,
}

impl VapidKeys {
    pub fn generate() -> Result<Self, Error> {
        let secret = SecretKey::random(&mut OsRng);
        let private_pem = secret
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| anyhow!("Failed to encode VAPID private key: {}", e))?
            .trim_end()
            .to_string();

        Ok(Self {
            public_key: encode_public_key(&secret),
            private_pem,
        })
    }

    pub fn from_private_pem(pem: &str) -> Result<Self, Error> {
        let secret = parse_private_key(pem)?;

        Ok(Self {
            private_pem: pem.to_string(),
            public_key: encode_public_key(&secret),
        })
    }
}

pub fn parse_private_key(pem: &str) -> Result<SecretKey, Error> {
    SecretKey::from_pkcs8_pem(pem).map_err(|e| anyhow!("Invalid VAPID private key: {}", e))
}

/// Uncompressed P-256 point, base64url without padding, as expected by
/// `PushManager.subscribe({ applicationServerKey })`.
pub fn encode_public_key(secret: &SecretKey) -> String {
    let point = secret.public_key().to_encoded_point(false);
    URL_SAFE_NO_PAD.encode(point.as_bytes())
}

pub struct VapidKeyManager {
    private_key_file: PathBuf,
    public_key_file: PathBuf,
    keys: RwLock<VapidKeys>,
}

impl VapidKeyManager {
    /// Reuses the stored key pair when it is valid, generating a new one otherwise.
    pub async fn load_or_generate(config: &Config) -> Result<Self, Error> {
        let private_key_file = config.vapid_private_key_file();
        let public_key_file = config.vapid_public_key_file();

        let keys = Self::load_or_generate_keys(&private_key_file, &public_key_file).await?;

        Ok(Self {
            private_key_file,
            public_key_file,
            keys: RwLock::new(keys),
        })
    }

    async fn load_or_generate_keys(
        private_key_file: &Path,
        public_key_file: &Path,
    ) -> Result<VapidKeys, Error> {
        if fs::metadata(private_key_file)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            let existing = fs::read_to_string(private_key_file).await?;
            let existing = existing.trim();

            if !existing.is_empty() {
                match VapidKeys::from_private_pem(existing) {
                    Ok(keys) => {
                        info!(
                            path = %private_key_file.display(),
                            len = existing.len(),
                            "Loaded existing VAPID private key"
                        );
                        return Ok(keys);
                    }
                    Err(e) => {
                        warn!(error = %e, "Existing VAPID key invalid, will regenerate");
                    }
                }
            }
        }

        if fs::metadata(private_key_file)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            warn!(
                path = %private_key_file.display(),
                "VAPID private key path is a directory, removing it"
            );
            fs::remove_dir_all(private_key_file).await?;
        }

        info!("Generating new VAPID keys");
        let keys = VapidKeys::generate()?;

        if let Some(parent) = private_key_file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(private_key_file, &keys.private_pem).await?;
        fs::write(public_key_file, &keys.public_key).await?;

        info!(
            path = %private_key_file.display(),
            public_key = %keys.public_key,
            "Generated new VAPID keys"
        );

        Ok(keys)
    }

    /// Re-validates the in-memory key and regenerates the pair if it no longer parses.
    pub async fn ensure_valid(&self) -> Result<VapidKeys, Error> {
        {
            let keys = self.keys.read().await;
            match parse_private_key(&keys.private_pem) {
                Ok(_) => {
                    info!(
                        path = %self.private_key_file.display(),
                        len = keys.private_pem.len(),
                        "Using VAPID private key"
                    );
                    return Ok(keys.clone());
                }
                Err(e) => warn!(error = %e, "VAPID key invalid at runtime; regenerating"),
            }
        }

        let mut keys = self.keys.write().await;
        *keys = Self::load_or_generate_keys(&self.private_key_file, &self.public_key_file).await?;

        Ok(keys.clone())
    }

    pub async fn current(&self) -> VapidKeys {
        self.keys.read().await.clone()
    }

    /// Replaces the in-memory key without touching disk.
    pub async fn replace(&self, keys: VapidKeys) {
        *self.keys.write().await = keys;
    }

    /// Public key as stored on disk, `None` when the file is missing or empty.
    pub async fn public_key(&self) -> Option<String> {
        let key = fs::read_to_string(&self.public_key_file).await.ok()?;
        let key = key.trim();

        if key.is_empty() {
            return None;
        }

        info!(
            prefix = %key.chars().take(12).collect::<String>(),
            len = key.len(),
            "Serving VAPID public key"
        );
        Some(key.to_string())
    }
}
