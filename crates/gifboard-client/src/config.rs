//! Configuration structures for gifboard-client.
//!
//! Configuration is an explicit object built once at process start and passed
//! by reference into the gateway and wallet. The library never reads
//! environment variables; a binary may load a TOML file and layer flags on top.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use url::Url;

use crate::constants::default_program_id;
use crate::error::{BoardError, BoardResult};

/// Global configuration container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub cluster: Cluster,
    /// Overrides the cluster's public endpoint when set.
    pub rpc_url: Option<String>,
    pub program_id: Pubkey,
    /// Keypair file of the board account.
    pub board_keypair: PathBuf,
    pub commitment: Commitment,
    pub wallet: WalletConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::Devnet,
            rpc_url: None,
            program_id: default_program_id(),
            board_keypair: PathBuf::from("keypair.json"),
            commitment: Commitment::Processed,
            wallet: WalletConfig::default(),
        }
    }
}

impl ClientConfig {
    /// RPC endpoint the client talks to.
    pub fn endpoint(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.cluster.url().to_string())
    }

    /// Layer values from a config file over the current values.
    pub fn merge_file(&mut self, file: FileConfig) -> BoardResult<()> {
        if let Some(cluster) = file.cluster {
            self.cluster = cluster;
        }
        if let Some(url) = file.rpc_url {
            self.rpc_url = Some(url);
        }
        if let Some(id) = file.program_id {
            self.program_id = parse_pubkey("program_id", &id)?;
        }
        if let Some(path) = file.board_keypair {
            self.board_keypair = path;
        }
        if let Some(commitment) = file.commitment {
            self.commitment = commitment;
        }
        if let Some(wallet) = file.wallet {
            if let Some(path) = wallet.keypair {
                self.wallet.keypair = path;
            }
            if let Some(trusted) = wallet.trusted {
                self.wallet.trusted = trusted;
            }
        }
        Ok(())
    }
}

/// Wallet-related configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Solana CLI keypair file of the user's signer.
    pub keypair: PathBuf,
    /// Whether the wallet may be reconnected without prompting.
    pub trusted: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair: default_wallet_path(),
            trusted: false,
        }
    }
}

/// `~/.config/solana/id.json`, the Solana CLI default.
pub fn default_wallet_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("solana")
        .join("id.json")
}

/// Supported clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
}

impl Cluster {
    pub fn url(&self) -> &'static str {
        match self {
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Localnet => "http://127.0.0.1:8899",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::MainnetBeta => "mainnet-beta",
            Self::Localnet => "localnet",
        }
    }

    pub fn parse(s: &str) -> BoardResult<Self> {
        match s {
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            "localnet" | "localhost" => Ok(Self::Localnet),
            _ => Err(BoardError::config(format!("unknown cluster: {s}"))),
        }
    }
}

/// Commitment level used for reads and confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn config(&self) -> CommitmentConfig {
        match self {
            Self::Processed => CommitmentConfig::processed(),
            Self::Confirmed => CommitmentConfig::confirmed(),
            Self::Finalized => CommitmentConfig::finalized(),
        }
    }
}

/// On-disk configuration. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub cluster: Option<Cluster>,
    pub rpc_url: Option<String>,
    pub program_id: Option<String>,
    pub board_keypair: Option<PathBuf>,
    pub commitment: Option<Commitment>,
    pub wallet: Option<FileWalletConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileWalletConfig {
    pub keypair: Option<PathBuf>,
    pub trusted: Option<bool>,
}

impl FileConfig {
    pub fn parse(raw: &str) -> BoardResult<Self> {
        toml::from_str(raw).map_err(|e| BoardError::config(format!("invalid config file: {e}")))
    }

    pub fn load(path: &Path) -> BoardResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| BoardError::config(format!("read {}: {e}", path.display())))?;
        Self::parse(&raw)
    }
}

pub fn parse_pubkey(field: &str, value: &str) -> BoardResult<Pubkey> {
    value
        .trim()
        .parse()
        .map_err(|_| BoardError::config(format!("{field} is not a valid base58 address: {value}")))
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &ClientConfig) -> BoardResult<()> {
    if let Some(url) = &cfg.rpc_url {
        let parsed = Url::parse(url).map_err(|e| BoardError::config(format!("rpc_url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BoardError::config("rpc_url must use http or https"));
        }
    }

    if cfg.program_id == Pubkey::default() || cfg.program_id == default_program_id() {
        return Err(BoardError::config("program_id must be set to the deployed board program"));
    }

    if cfg.board_keypair.as_os_str().is_empty() {
        return Err(BoardError::config("board_keypair path must not be empty"));
    }

    Ok(())
}
