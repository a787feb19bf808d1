//! Wallet file loading.

use anyhow::{Context, Result, bail};
use proteus_execution::prelude::RollConfig;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Name of the wallet file in the user's home directory.
pub const WALLET_FILE: &str = ".wallet";

/// Contents of the wallet file.
#[derive(Deserialize)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the Arbitrum node.
    pub arbitrum: String,
    /// Hex-encoded signing key.
    pub key: Zeroizing<String>,
    /// Overrides the default pool identities and tolerances.
    #[serde(default)]
    pub roll: Option<RollConfig>,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("arbitrum", &self.arbitrum)
            .field("key", &"<redacted>")
            .field("roll", &self.roll)
            .finish()
    }
}

/// Path of the wallet file for the current user.
pub fn default_path() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(WALLET_FILE))
}

impl WalletConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "config file missing, please place it at: {}",
                path.display()
            );
        }
        let raw = Zeroizing::new(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        );
        serde_json::from_str(&raw).with_context(|| format!("Invalid wallet file {}", path.display()))
    }

    /// Roll configuration: the file's override, or the Arbitrum gOHM/WETH pool.
    pub fn roll_config(&self) -> Result<RollConfig> {
        let config = match &self.roll {
            Some(config) => config.clone(),
            None => RollConfig::sushi_gohm_arbitrum()?,
        };
        config.validate().context("Invalid roll configuration")?;
        Ok(config)
    }
}
