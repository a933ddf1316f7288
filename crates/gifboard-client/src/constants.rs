//! Constants shared between the on-chain program and clients.
//!
//! Keep these stable because they affect instruction and account discriminators.

use solana_program::pubkey::Pubkey;

/// Instruction that creates the board account.
pub const IX_INITIALIZE: &str = "start_stuff_off";

/// Instruction that appends an entry.
pub const IX_ADD_ENTRY: &str = "add_gif";

/// Instruction that increments an entry's score.
pub const IX_UPVOTE: &str = "upvote_item";

/// Instruction that decrements an entry's score.
pub const IX_DOWNVOTE: &str = "downvote_item";

/// Account type name of the board.
pub const BOARD_ACCOUNT_NAME: &str = "BaseAccount";

/// Namespace prefix for instruction discriminators.
pub const IX_NAMESPACE: &str = "global";

/// Namespace prefix for account discriminators.
pub const ACCOUNT_NAMESPACE: &str = "account";

/// Discriminator length in bytes.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Default program id (placeholder).
///
/// Replace this with the deployed program id, or set `program_id` in the config file.
pub const DEFAULT_PROGRAM_ID: &str = "GifBoard11111111111111111111111111111111111";

pub fn default_program_id() -> Pubkey {
    DEFAULT_PROGRAM_ID.parse().unwrap_or_else(|_| Pubkey::default())
}

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "gifboard.toml";
