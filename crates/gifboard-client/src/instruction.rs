//! Instruction encoding for the board program.
//!
//! Layout: an 8-byte discriminator followed by the borsh-encoded arguments.
//! `decode` is the exact inverse of `data` so call descriptors can be
//! inspected after they are built.

use borsh::BorshDeserialize;
use serde::{Deserialize, Serialize};
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;

use crate::constants::{DISCRIMINATOR_LEN, IX_ADD_ENTRY, IX_DOWNVOTE, IX_INITIALIZE, IX_UPVOTE};
use crate::discriminator;
use crate::error::{BoardError, BoardResult};

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDelta {
    Up,
    Down,
}

impl VoteDelta {
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "upvote",
            Self::Down => "downvote",
        }
    }
}

/// A board program instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardInstruction {
    Initialize,
    AddEntry { link: String },
    Vote { index: u64, delta: VoteDelta },
}

impl BoardInstruction {
    /// On-chain instruction name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => IX_INITIALIZE,
            Self::AddEntry { .. } => IX_ADD_ENTRY,
            Self::Vote { delta: VoteDelta::Up, .. } => IX_UPVOTE,
            Self::Vote { delta: VoteDelta::Down, .. } => IX_DOWNVOTE,
        }
    }

    /// Encode instruction data.
    pub fn data(&self) -> BoardResult<Vec<u8>> {
        let mut out = discriminator::instruction(self.name()).to_vec();
        let args = match self {
            Self::Initialize => Ok(Vec::new()),
            Self::AddEntry { link } => borsh::to_vec(link),
            Self::Vote { index, .. } => borsh::to_vec(index),
        }
        .map_err(|e| BoardError::Decode(format!("serialize {}: {e}", self.name())))?;
        out.extend_from_slice(&args);
        Ok(out)
    }

    /// Decode instruction data produced by [`BoardInstruction::data`].
    pub fn decode(data: &[u8]) -> BoardResult<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(BoardError::Decode(
                "instruction data shorter than discriminator".to_string(),
            ));
        }
        let (tag, mut args) = data.split_at(DISCRIMINATOR_LEN);

        let name = discriminator::all_instructions()
            .into_iter()
            .find(|(_, d)| d[..] == *tag)
            .map(|(name, _)| name)
            .ok_or_else(|| BoardError::Decode("unknown instruction discriminator".to_string()))?;

        let decode_err = |e: std::io::Error| BoardError::Decode(format!("{name} args: {e}"));
        let ix = match name {
            IX_INITIALIZE => Self::Initialize,
            IX_ADD_ENTRY => Self::AddEntry {
                link: <String as BorshDeserialize>::deserialize(&mut args).map_err(decode_err)?,
            },
            IX_UPVOTE => Self::Vote {
                index: <u64 as BorshDeserialize>::deserialize(&mut args).map_err(decode_err)?,
                delta: VoteDelta::Up,
            },
            _ => Self::Vote {
                index: <u64 as BorshDeserialize>::deserialize(&mut args).map_err(decode_err)?,
                delta: VoteDelta::Down,
            },
        };
        if !args.is_empty() {
            return Err(BoardError::Decode(format!("{name}: trailing instruction bytes")));
        }
        Ok(ix)
    }

    /// Build the full instruction against `board`, signed by `user`.
    pub fn build(
        &self,
        program_id: Pubkey,
        board: Pubkey,
        user: Pubkey,
    ) -> BoardResult<Instruction> {
        let accounts = match self {
            Self::Initialize => vec![
                AccountMeta::new(board, true),
                AccountMeta::new(user, true),
                AccountMeta::new_readonly(solana_program::system_program::id(), false),
            ],
            Self::AddEntry { .. } | Self::Vote { .. } => vec![
                AccountMeta::new(board, false),
                AccountMeta::new(user, true),
            ],
        };

        Ok(Instruction {
            program_id,
            accounts,
            data: self.data()?,
        })
    }
}
