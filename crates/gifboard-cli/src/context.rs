use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use gifboard_client::config::parse_pubkey;
use gifboard_client::constants::DEFAULT_CONFIG_FILE;
use gifboard_client::keypair::load_keypair;
use gifboard_client::rpc::{connect_rpc, RpcBoardReader};
use gifboard_client::{
    validate_config, Approver, AutoApprove, ClientConfig, Cluster, FileConfig, IntentController,
    KeypairWallet, RemoteGateway, WalletSession,
};
use indicatif::ProgressBar;
use tracing::debug;

use crate::args::Cli;
use crate::output;
use crate::prompt::StdinApprover;

/// Defaults, then the config file, then flags.
pub fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut cfg = ClientConfig::default();

    let file = match &cli.config {
        Some(path) => Some(path.clone()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };
    if let Some(path) = file {
        debug!(path = %path.display(), "loading config file");
        cfg.merge_file(FileConfig::load(&path)?)?;
    }

    if let Some(cluster) = &cli.cluster {
        cfg.cluster = Cluster::parse(cluster)?;
    }
    if let Some(url) = &cli.rpc_url {
        cfg.rpc_url = Some(url.clone());
    }
    if let Some(id) = &cli.program_id {
        cfg.program_id = parse_pubkey("program_id", id)?;
    }
    if let Some(path) = &cli.board_keypair {
        cfg.board_keypair = path.clone();
    }
    if let Some(path) = &cli.wallet {
        cfg.wallet.keypair = path.clone();
    }
    if cli.yes {
        cfg.wallet.trusted = true;
    }

    validate_config(&cfg)?;
    Ok(cfg)
}

/// A wired controller plus how the terminal is being used.
pub struct Ctx {
    pub controller: Arc<IntentController>,
    /// Wallet prompts read stdin; spinners would draw over them.
    interactive: bool,
}

impl Ctx {
    pub fn new(cli: &Cli) -> Result<Self> {
        let cfg = build_config(cli)?;
        let board = load_keypair(&cfg.board_keypair)
            .map(Arc::new)
            .with_context(|| format!("board keypair {}", cfg.board_keypair.display()))?;
        let rpc = connect_rpc(&cfg);

        let approver: Arc<dyn Approver> = if cli.yes {
            Arc::new(AutoApprove)
        } else {
            Arc::new(StdinApprover)
        };
        let wallet = Arc::new(KeypairWallet::new(&cfg.wallet, approver, rpc.clone()));
        let reader = Arc::new(RpcBoardReader::new(rpc));

        let gateway = RemoteGateway::new(&cfg, board, wallet.clone(), reader);
        debug!(
            endpoint = %cfg.endpoint(),
            program_id = %cfg.program_id,
            board = %gateway.board_address(),
            "controller ready"
        );

        Ok(Self {
            controller: Arc::new(IntentController::new(WalletSession::new(wallet), gateway)),
            interactive: !cli.yes,
        })
    }

    pub fn spinner(&self, msg: &'static str) -> ProgressBar {
        if self.interactive {
            return ProgressBar::hidden();
        }
        output::spinner(msg)
    }

    /// Silent restore first; prompt only if that did not yield a signer.
    pub async fn ensure_connected(&self) -> Result<()> {
        if self.controller.restore().await.is_some() {
            return Ok(());
        }
        let pb = self.spinner("connecting wallet");
        let result = self.controller.connect().await;
        pb.finish_and_clear();
        result?;
        Ok(())
    }
}
