//! Wallet session.
//!
//! `SigningCapability` is the seam to whatever holds the user's key (a keypair
//! file, a hardware wallet, a test double). `WalletSession` owns the connection
//! lifecycle on top of it and records the current signer address.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use tracing::{debug, info};

use crate::error::BoardResult;

/// A signed remote call waiting to be sent.
pub struct CallDescriptor {
    /// Short human-readable label (shown in approval prompts and logs).
    pub label: &'static str,
    pub instructions: Vec<Instruction>,
    /// Keypairs that must sign in addition to the wallet.
    pub co_signers: Vec<Arc<Keypair>>,
}

impl CallDescriptor {
    pub fn new(label: &'static str, instructions: Vec<Instruction>) -> Self {
        Self {
            label,
            instructions,
            co_signers: Vec::new(),
        }
    }

    pub fn with_co_signer(mut self, signer: Arc<Keypair>) -> Self {
        self.co_signers.push(signer);
        self
    }
}

impl fmt::Debug for CallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDescriptor")
            .field("label", &self.label)
            .field("instructions", &self.instructions.len())
            .field(
                "co_signers",
                &self.co_signers.iter().map(|k| k.pubkey()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// External signing capability.
#[async_trait]
pub trait SigningCapability: Send + Sync {
    /// Trust-scoped connect. Must never prompt the user.
    async fn probe(&self) -> BoardResult<Pubkey>;

    /// User-initiated connect. May prompt.
    async fn request_connect(&self) -> BoardResult<Pubkey>;

    /// Sign `call` with the connected key (plus its co-signers) and submit it.
    async fn sign_and_send(&self, call: CallDescriptor) -> BoardResult<Signature>;
}

/// The single session of a client instance.
pub struct WalletSession {
    capability: Arc<dyn SigningCapability>,
    signer: RwLock<Option<Pubkey>>,
}

impl WalletSession {
    pub fn new(capability: Arc<dyn SigningCapability>) -> Self {
        Self {
            capability,
            signer: RwLock::new(None),
        }
    }

    /// Current signer address, if connected.
    pub fn signer(&self) -> Option<Pubkey> {
        *self.signer.read()
    }

    /// Silent reconnect probe. Failure leaves the session empty and is only
    /// logged at debug level.
    pub(crate) async fn try_restore(&self) -> Option<Pubkey> {
        match self.capability.probe().await {
            Ok(address) => {
                info!(%address, "wallet session restored");
                *self.signer.write() = Some(address);
                Some(address)
            }
            Err(e) => {
                debug!(error = %e, "silent wallet restore unavailable");
                *self.signer.write() = None;
                None
            }
        }
    }

    /// Prompting connect. On failure the session stays empty.
    pub(crate) async fn connect(&self) -> BoardResult<Pubkey> {
        match self.capability.request_connect().await {
            Ok(address) => {
                info!(%address, "wallet connected");
                *self.signer.write() = Some(address);
                Ok(address)
            }
            Err(e) => {
                *self.signer.write() = None;
                Err(e)
            }
        }
    }

    pub(crate) fn disconnect(&self) {
        if let Some(address) = self.signer.write().take() {
            info!(%address, "wallet disconnected");
        }
    }
}
