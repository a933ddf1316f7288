//! Keypair-file signing capability.
//!
//! Stands in for a browser wallet extension: the key lives in a Solana CLI
//! keypair file, and an `Approver` plays the role of the extension's prompt.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::WalletConfig;
use crate::error::{BoardError, BoardResult};
use crate::keypair::load_keypair;
use crate::rpc::classify_client_error;
use crate::wallet::{CallDescriptor, SigningCapability};

/// What the user is asked to approve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalRequest<'a> {
    Connect { address: Pubkey },
    Sign { label: &'a str, payer: Pubkey },
}

/// The user's answer to a wallet prompt.
pub trait Approver: Send + Sync {
    fn approve(&self, request: ApprovalRequest<'_>) -> bool;
}

/// Approves everything. Used for `--yes` and trusted sessions.
pub struct AutoApprove;

impl Approver for AutoApprove {
    fn approve(&self, _request: ApprovalRequest<'_>) -> bool {
        true
    }
}

pub struct KeypairWallet {
    path: PathBuf,
    trusted: bool,
    approver: Arc<dyn Approver>,
    rpc: Arc<RpcClient>,
    keypair: OnceCell<Arc<Keypair>>,
}

impl KeypairWallet {
    pub fn new(config: &WalletConfig, approver: Arc<dyn Approver>, rpc: Arc<RpcClient>) -> Self {
        Self {
            path: config.keypair.clone(),
            trusted: config.trusted,
            approver,
            rpc,
            keypair: OnceCell::new(),
        }
    }

    async fn keypair(&self) -> BoardResult<Arc<Keypair>> {
        self.keypair
            .get_or_try_init(|| async {
                load_keypair(&self.path)
                    .map(Arc::new)
                    .map_err(|e| BoardError::CapabilityUnavailable(e.to_string()))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl SigningCapability for KeypairWallet {
    async fn probe(&self) -> BoardResult<Pubkey> {
        if !self.trusted {
            return Err(BoardError::UserRejected);
        }
        Ok(self.keypair().await?.pubkey())
    }

    async fn request_connect(&self) -> BoardResult<Pubkey> {
        let address = self.keypair().await?.pubkey();
        if !self.approver.approve(ApprovalRequest::Connect { address }) {
            return Err(BoardError::UserRejected);
        }
        Ok(address)
    }

    async fn sign_and_send(&self, call: CallDescriptor) -> BoardResult<Signature> {
        let keypair = self.keypair().await?;
        let payer = keypair.pubkey();
        if !self.approver.approve(ApprovalRequest::Sign { label: call.label, payer }) {
            return Err(BoardError::UserRejected);
        }

        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| classify_client_error(call.label, e))?;

        let mut signers: Vec<&(dyn Signer + Sync)> = vec![keypair.as_ref()];
        signers.extend(call.co_signers.iter().map(|k| k.as_ref() as &(dyn Signer + Sync)));

        let mut tx = Transaction::new_with_payer(&call.instructions, Some(&payer));
        tx.try_sign(&signers, blockhash)
            .map_err(|e| {
                BoardError::CapabilityUnavailable(format!("signing {} failed: {e}", call.label))
            })?;

        debug!(label = call.label, %payer, "sending transaction");
        self.rpc
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(|e| classify_client_error(call.label, e))
    }
}
