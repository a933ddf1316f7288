//! Intent controller.
//!
//! Turns user intents into gateway calls and keeps the board store in step
//! with the remote program:
//! - a successful mutation is followed by exactly one refresh
//! - a failed mutation changes nothing and triggers no refresh
//! - operations run one at a time; concurrent callers queue in arrival order
//!
//! This is the only place that changes session or board state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tokio::sync::{watch, Mutex as OpLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{BoardError, BoardResult};
use crate::gateway::RemoteGateway;
use crate::instruction::VoteDelta;
use crate::store::{BoardSnapshot, BoardStatus, BoardStore, EntryRef};
use crate::wallet::WalletSession;

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "board", rename_all = "snake_case")]
pub enum ControllerState {
    Disconnected,
    Connecting,
    Connected(BoardStatus),
    Refreshing,
}

/// A user intent, as raised by a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Connect,
    Initialize,
    Submit { link: String },
    Vote { index: usize, delta: VoteDelta },
    Refresh,
}

/// A confirmed mutation and the snapshot fetched right after it.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub signature: Signature,
    pub snapshot: Arc<BoardSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Connecting,
    Refreshing,
}

struct PhaseGuard<'a> {
    phase: &'a Mutex<Phase>,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.phase.lock() = Phase::Idle;
    }
}

pub struct IntentController {
    session: WalletSession,
    gateway: RemoteGateway,
    store: BoardStore,
    phase: Mutex<Phase>,
    ops: OpLock<()>,
    restore_attempted: AtomicBool,
}

impl IntentController {
    pub fn new(session: WalletSession, gateway: RemoteGateway) -> Self {
        Self {
            session,
            gateway,
            store: BoardStore::new(),
            phase: Mutex::new(Phase::Idle),
            ops: OpLock::new(()),
            restore_attempted: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ControllerState {
        let phase = *self.phase.lock();
        match (self.session.signer(), phase) {
            (None, Phase::Connecting) => ControllerState::Connecting,
            (None, _) => ControllerState::Disconnected,
            (Some(_), Phase::Refreshing) => ControllerState::Refreshing,
            (Some(_), _) => ControllerState::Connected(self.store.status()),
        }
    }

    pub fn signer(&self) -> Option<Pubkey> {
        self.session.signer()
    }

    pub fn board_address(&self) -> Pubkey {
        self.gateway.board_address()
    }

    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        self.store.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardSnapshot>> {
        self.store.subscribe()
    }

    /// Launch the silent restore probe as a background task.
    pub fn spawn_restore(self: &Arc<Self>) -> JoinHandle<Option<Pubkey>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.restore().await })
    }

    /// Silent reconnect. Runs at most once per controller; later calls return
    /// the current signer without probing.
    pub async fn restore(&self) -> Option<Pubkey> {
        if self.restore_attempted.swap(true, Ordering::SeqCst) {
            return self.session.signer();
        }

        let _op = self.ops.lock().await;
        if let Some(address) = self.session.signer() {
            return Some(address);
        }

        let address = self.session.try_restore().await?;
        self.refresh_locked().await;
        Some(address)
    }

    /// Prompting connect. Already connected sessions are returned as is.
    pub async fn connect(&self) -> BoardResult<Pubkey> {
        let _op = self.ops.lock().await;
        if let Some(address) = self.session.signer() {
            return Ok(address);
        }

        let result = {
            let _phase = self.enter(Phase::Connecting);
            self.session.connect().await
        };

        match result {
            Ok(address) => {
                self.refresh_locked().await;
                Ok(address)
            }
            Err(e) => {
                warn!(error = %e, "wallet connect failed");
                Err(e)
            }
        }
    }

    /// Clear the session and drop board data.
    pub async fn disconnect(&self) {
        let _op = self.ops.lock().await;
        self.session.disconnect();
        self.store.reset();
    }

    /// Re-read the board without mutating it.
    pub async fn refresh(&self) -> BoardResult<Arc<BoardSnapshot>> {
        let _op = self.ops.lock().await;
        self.require_signer()?;
        Ok(self.refresh_locked().await)
    }

    pub async fn initialize_board(&self) -> BoardResult<MutationOutcome> {
        let _op = self.ops.lock().await;
        let signer = self.require_signer()?;
        let sent = self.gateway.initialize_board(signer).await;
        self.settle("initialize board", sent).await
    }

    pub async fn submit_entry(&self, link: &str) -> BoardResult<MutationOutcome> {
        let _op = self.ops.lock().await;
        let signer = self.require_signer()?;
        let sent = self.gateway.submit_entry(signer, link).await;
        self.settle("submit entry", sent).await
    }

    pub async fn upvote(&self, index: usize) -> BoardResult<MutationOutcome> {
        self.vote(index, VoteDelta::Up).await
    }

    pub async fn downvote(&self, index: usize) -> BoardResult<MutationOutcome> {
        self.vote(index, VoteDelta::Down).await
    }

    /// Vote on the entry at `index` of the snapshot current when the call
    /// gets its turn.
    pub async fn vote(&self, index: usize, delta: VoteDelta) -> BoardResult<MutationOutcome> {
        let _op = self.ops.lock().await;
        let signer = self.require_signer()?;
        self.vote_locked(signer, index, delta).await
    }

    /// Vote on an entry of a specific snapshot. Rejected locally if that
    /// snapshot has been replaced since the reference was taken.
    pub async fn vote_at(
        &self,
        target: EntryRef,
        delta: VoteDelta,
    ) -> BoardResult<MutationOutcome> {
        let _op = self.ops.lock().await;
        let signer = self.require_signer()?;
        let current = self.store.current().epoch;
        if target.epoch != current {
            debug!(given = target.epoch, current, "vote rejected: stale snapshot");
            return Err(BoardError::StaleSnapshot { given: target.epoch, current });
        }
        self.vote_locked(signer, target.index, delta).await
    }

    /// Apply an intent and return the resulting snapshot.
    pub async fn dispatch(&self, intent: Intent) -> BoardResult<Arc<BoardSnapshot>> {
        match intent {
            Intent::Connect => self.connect().await.map(|_| self.snapshot()),
            Intent::Initialize => self.initialize_board().await.map(|o| o.snapshot),
            Intent::Submit { link } => self.submit_entry(&link).await.map(|o| o.snapshot),
            Intent::Vote { index, delta } => self.vote(index, delta).await.map(|o| o.snapshot),
            Intent::Refresh => self.refresh().await,
        }
    }

    async fn vote_locked(
        &self,
        signer: Pubkey,
        index: usize,
        delta: VoteDelta,
    ) -> BoardResult<MutationOutcome> {
        let len = self.store.current().entries().len();
        if index >= len {
            debug!(index, len, "vote rejected: index out of bounds");
            return Err(BoardError::StaleIndex { index, len });
        }
        let sent = self.gateway.adjust_vote(signer, index, delta).await;
        self.settle(delta.as_str(), sent).await
    }

    async fn settle(
        &self,
        operation: &'static str,
        sent: BoardResult<Signature>,
    ) -> BoardResult<MutationOutcome> {
        match sent {
            Ok(signature) => {
                info!(operation, %signature, "mutation confirmed");
                let snapshot = self.refresh_locked().await;
                Ok(MutationOutcome { signature, snapshot })
            }
            Err(e) if e.is_local() => Err(e),
            Err(e) => {
                warn!(operation, error = %e, "mutation failed");
                Err(e)
            }
        }
    }

    /// Caller must hold the operation lock.
    async fn refresh_locked(&self) -> Arc<BoardSnapshot> {
        let _phase = self.enter(Phase::Refreshing);
        let result = self.gateway.fetch_snapshot().await;
        if let Err(e) = &result {
            warn!(error = %e, "board refresh failed");
        }
        let snapshot = self.store.replace(&result);
        debug!(epoch = snapshot.epoch, status = ?snapshot.status(), "board snapshot replaced");
        snapshot
    }

    fn require_signer(&self) -> BoardResult<Pubkey> {
        self.session.signer().ok_or(BoardError::NotConnected)
    }

    fn enter(&self, phase: Phase) -> PhaseGuard<'_> {
        *self.phase.lock() = phase;
        PhaseGuard { phase: &self.phase }
    }
}
