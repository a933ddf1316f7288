use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "gifboard", version, about = "gifboard CLI")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./gifboard.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Cluster: devnet|testnet|mainnet-beta|localnet
    #[arg(long, global = true)]
    pub cluster: Option<String>,

    /// RPC endpoint, overrides the cluster's public endpoint.
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Board program id (base58).
    #[arg(long, global = true)]
    pub program_id: Option<String>,

    /// Keypair file of the board account.
    #[arg(long, global = true)]
    pub board_keypair: Option<PathBuf>,

    /// Wallet keypair file (default: ~/.config/solana/id.json)
    #[arg(long, global = true)]
    pub wallet: Option<PathBuf>,

    /// Trust the wallet and approve every prompt.
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Connect and print the board.
    Show,

    /// One-time creation of the board account.
    Init,

    /// Append a link to the board.
    Submit {
        link: String,
    },

    /// Add one vote to the entry at INDEX.
    Upvote {
        index: usize,
    },

    /// Remove one vote from the entry at INDEX.
    Downvote {
        index: usize,
    },

    /// Keep one session open and read intents from stdin.
    Shell,
}
