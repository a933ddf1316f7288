//! Local read-model of the board.
//!
//! A snapshot is only ever replaced as a whole. Readers hold an
//! `Arc<BoardSnapshot>` and never observe a mix of two fetches.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::account::Entry;
use crate::error::BoardResult;
use crate::gateway::FetchOutcome;

/// What the last fetch said about the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BoardView {
    /// Nothing fetched yet in this session.
    Unfetched,
    /// The board account does not exist.
    Uninitialized,
    Populated { total_entries: u64, entries: Vec<Entry> },
    /// The last fetch failed; no entries are kept.
    Error { message: String },
}

/// Status tag of a view, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardStatus {
    Unfetched,
    Uninitialized,
    Populated,
    Error,
}

/// Position of an entry within one particular snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryRef {
    pub epoch: u64,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    /// Incremented on every replacement.
    pub epoch: u64,
    #[serde(flatten)]
    pub view: BoardView,
}

impl BoardSnapshot {
    pub fn status(&self) -> BoardStatus {
        match self.view {
            BoardView::Unfetched => BoardStatus::Unfetched,
            BoardView::Uninitialized => BoardStatus::Uninitialized,
            BoardView::Populated { .. } => BoardStatus::Populated,
            BoardView::Error { .. } => BoardStatus::Error,
        }
    }

    /// Entries of a populated board; empty otherwise.
    pub fn entries(&self) -> &[Entry] {
        match &self.view {
            BoardView::Populated { entries, .. } => entries,
            _ => &[],
        }
    }

    /// Whether a UI should offer the one-time initialization.
    pub fn can_initialize(&self) -> bool {
        self.status() == BoardStatus::Uninitialized
    }

    /// Reference to the entry at `index`, if this snapshot holds it.
    pub fn entry_ref(&self, index: usize) -> Option<EntryRef> {
        (index < self.entries().len()).then_some(EntryRef { epoch: self.epoch, index })
    }
}

pub struct BoardStore {
    tx: watch::Sender<Arc<BoardSnapshot>>,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(BoardSnapshot {
            epoch: 0,
            view: BoardView::Unfetched,
        }));
        Self { tx }
    }

    pub fn current(&self) -> Arc<BoardSnapshot> {
        self.tx.borrow().clone()
    }

    pub fn status(&self) -> BoardStatus {
        self.tx.borrow().status()
    }

    /// Receiver that sees every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardSnapshot>> {
        self.tx.subscribe()
    }

    /// Replace the snapshot with the outcome of a fetch.
    pub(crate) fn replace(&self, result: &BoardResult<FetchOutcome>) -> Arc<BoardSnapshot> {
        let view = match result {
            Ok(FetchOutcome::Found(account)) => BoardView::Populated {
                total_entries: account.total_entries,
                entries: account.entries.clone(),
            },
            Ok(FetchOutcome::NotFound) => BoardView::Uninitialized,
            Err(e) => BoardView::Error { message: e.to_string() },
        };
        self.publish(view)
    }

    /// Drop all board data, as on disconnect.
    pub(crate) fn reset(&self) -> Arc<BoardSnapshot> {
        self.publish(BoardView::Unfetched)
    }

    fn publish(&self, view: BoardView) -> Arc<BoardSnapshot> {
        let epoch = self.tx.borrow().epoch + 1;
        let snapshot = Arc::new(BoardSnapshot { epoch, view });
        self.tx.send_replace(snapshot.clone());
        snapshot
    }
}
