//! Remote gateway for the board program.
//!
//! The gateway can:
//! - build the four board instructions against the configured board account
//! - hand them to the signing capability as single-shot calls
//! - read and decode the board account
//!
//! Nothing here retries. Every failure comes back as a `BoardError` for the
//! intent controller to act on.

use std::sync::Arc;

use async_trait::async_trait;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};

use crate::account::{BoardAccount, RemoteAccount};
use crate::config::ClientConfig;
use crate::error::{BoardError, BoardResult};
use crate::instruction::{BoardInstruction, VoteDelta};
use crate::wallet::{CallDescriptor, SigningCapability};

/// Read access to ledger accounts.
#[async_trait]
pub trait BoardReader: Send + Sync {
    /// Fetch raw account data. `Ok(None)` when the account does not exist.
    async fn account(&self, address: &Pubkey) -> BoardResult<Option<RemoteAccount>>;
}

/// Result of a board read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The board account exists (the list may be empty).
    Found(BoardAccount),
    /// The board account has not been created yet.
    NotFound,
}

pub struct RemoteGateway {
    program_id: Pubkey,
    board: Arc<Keypair>,
    capability: Arc<dyn SigningCapability>,
    reader: Arc<dyn BoardReader>,
}

impl RemoteGateway {
    /// `board` is the board account keypair; it co-signs initialization.
    pub fn new(
        config: &ClientConfig,
        board: Arc<Keypair>,
        capability: Arc<dyn SigningCapability>,
        reader: Arc<dyn BoardReader>,
    ) -> Self {
        Self {
            program_id: config.program_id,
            board,
            capability,
            reader,
        }
    }

    pub fn board_address(&self) -> Pubkey {
        self.board.pubkey()
    }

    /// Create the board account. Not idempotent: a second call is rejected remotely.
    pub async fn initialize_board(&self, signer: Pubkey) -> BoardResult<Signature> {
        let ix = BoardInstruction::Initialize.build(self.program_id, self.board_address(), signer)?;
        let call =
            CallDescriptor::new("initialize board", vec![ix]).with_co_signer(self.board.clone());
        self.capability.sign_and_send(call).await
    }

    /// Append an entry. Empty links are rejected without a remote call.
    pub async fn submit_entry(&self, signer: Pubkey, link: &str) -> BoardResult<Signature> {
        if link.trim().is_empty() {
            return Err(BoardError::EmptyLink);
        }
        let ix = BoardInstruction::AddEntry { link: link.to_string() }.build(
            self.program_id,
            self.board_address(),
            signer,
        )?;
        self.capability
            .sign_and_send(CallDescriptor::new("submit entry", vec![ix]))
            .await
    }

    /// Apply `delta` to the entry at `index`. Bounds are the caller's concern.
    pub async fn adjust_vote(
        &self,
        signer: Pubkey,
        index: usize,
        delta: VoteDelta,
    ) -> BoardResult<Signature> {
        let ix = BoardInstruction::Vote { index: index as u64, delta }.build(
            self.program_id,
            self.board_address(),
            signer,
        )?;
        let label = match delta {
            VoteDelta::Up => "upvote entry",
            VoteDelta::Down => "downvote entry",
        };
        self.capability.sign_and_send(CallDescriptor::new(label, vec![ix])).await
    }

    /// Read the whole board.
    pub async fn fetch_snapshot(&self) -> BoardResult<FetchOutcome> {
        match self.reader.account(&self.board_address()).await? {
            None => Ok(FetchOutcome::NotFound),
            Some(account) => {
                let board = BoardAccount::decode(&self.program_id, &account)?;
                Ok(FetchOutcome::Found(board))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, usize, Vec<Pubkey>)>>,
    }

    #[async_trait]
    impl SigningCapability for Recorder {
        async fn probe(&self) -> BoardResult<Pubkey> {
            Err(BoardError::UserRejected)
        }

        async fn request_connect(&self) -> BoardResult<Pubkey> {
            Err(BoardError::UserRejected)
        }

        async fn sign_and_send(&self, call: CallDescriptor) -> BoardResult<Signature> {
            self.calls.lock().push((
                call.label.to_string(),
                call.instructions.len(),
                call.co_signers.iter().map(|k| k.pubkey()).collect(),
            ));
            Ok(Signature::default())
        }
    }

    struct Missing;

    #[async_trait]
    impl BoardReader for Missing {
        async fn account(&self, _address: &Pubkey) -> BoardResult<Option<RemoteAccount>> {
            Ok(None)
        }
    }

    fn gateway(recorder: Arc<Recorder>) -> (RemoteGateway, Pubkey) {
        let cfg = ClientConfig {
            program_id: Pubkey::new_unique(),
            ..ClientConfig::default()
        };
        let board = Arc::new(Keypair::new());
        let address = board.pubkey();
        (RemoteGateway::new(&cfg, board, recorder, Arc::new(Missing)), address)
    }

    #[tokio::test]
    async fn initialize_is_co_signed_by_board() {
        let recorder = Arc::new(Recorder::default());
        let (gw, board) = gateway(recorder.clone());

        gw.initialize_board(Pubkey::new_unique()).await.unwrap();
        let calls = recorder.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].2, vec![board]);
    }

    #[tokio::test]
    async fn empty_link_never_reaches_capability() {
        let recorder = Arc::new(Recorder::default());
        let (gw, _) = gateway(recorder.clone());

        let err = gw.submit_entry(Pubkey::new_unique(), "   ").await.unwrap_err();
        assert_eq!(err, BoardError::EmptyLink);
        assert!(recorder.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let (gw, _) = gateway(Arc::new(Recorder::default()));
        assert_eq!(gw.fetch_snapshot().await.unwrap(), FetchOutcome::NotFound);
    }
}
