//! session_flow.rs
//!
//! Drives the intent controller against an in-memory board program that
//! implements both the signing capability and the board reader. Every remote
//! interaction is recorded so ordering properties can be asserted.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use parking_lot::Mutex;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};

use gifboard_client::{
    BoardAccount, BoardError, BoardInstruction, BoardReader, BoardResult, BoardStatus, BoardView,
    CallDescriptor, ClientConfig, ControllerState, Entry, Intent, IntentController, RemoteAccount,
    RemoteGateway, SigningCapability, VoteDelta, WalletSession,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum ConnectBehavior {
    Approve,
    Reject,
    Absent,
}

struct FakeProgram {
    program_id: Pubkey,
    board: Pubkey,
    wallet: Pubkey,
    probe_ok: bool,
    connect: ConnectBehavior,
    state: Mutex<Option<BoardAccount>>,
    fail_next_send: Mutex<Option<BoardError>>,
    fail_next_fetch: Mutex<Option<BoardError>>,
    log: Mutex<Vec<String>>,
}

impl FakeProgram {
    fn new(board: Pubkey) -> Self {
        Self {
            program_id: Pubkey::new_unique(),
            board,
            wallet: Pubkey::new_unique(),
            probe_ok: false,
            connect: ConnectBehavior::Approve,
            state: Mutex::new(None),
            fail_next_send: Mutex::new(None),
            fail_next_fetch: Mutex::new(None),
            log: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, event: impl Into<String>) {
        self.log.lock().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.log.lock().iter().filter(|e| e.starts_with(prefix)).count()
    }

    fn apply(&self, ix: BoardInstruction, user: Pubkey, call: &CallDescriptor) -> BoardResult<()> {
        let mut state = self.state.lock();
        match ix {
            BoardInstruction::Initialize => {
                if state.is_some() {
                    return Err(BoardError::remote_rejected(call.label, "account already in use"));
                }
                if !call.co_signers.iter().any(|k| k.pubkey() == self.board) {
                    return Err(BoardError::remote_rejected(call.label, "missing board signature"));
                }
                *state = Some(BoardAccount::default());
            }
            BoardInstruction::AddEntry { link } => {
                let board = state.as_mut().ok_or_else(|| {
                    BoardError::remote_rejected(call.label, "account not initialized")
                })?;
                board.entries.push(Entry { link, submitter: user, score: 0 });
                board.total_entries += 1;
            }
            BoardInstruction::Vote { index, delta } => {
                let board = state.as_mut().ok_or_else(|| {
                    BoardError::remote_rejected(call.label, "account not initialized")
                })?;
                let entry = board
                    .entries
                    .get_mut(index as usize)
                    .ok_or_else(|| BoardError::remote_rejected(call.label, "index out of bounds"))?;
                entry.score += delta.as_i64();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SigningCapability for FakeProgram {
    async fn probe(&self) -> BoardResult<Pubkey> {
        self.record("probe");
        if self.probe_ok {
            Ok(self.wallet)
        } else {
            Err(BoardError::UserRejected)
        }
    }

    async fn request_connect(&self) -> BoardResult<Pubkey> {
        self.record("connect");
        match self.connect {
            ConnectBehavior::Approve => Ok(self.wallet),
            ConnectBehavior::Reject => Err(BoardError::UserRejected),
            ConnectBehavior::Absent => {
                Err(BoardError::CapabilityUnavailable("no wallet".to_string()))
            }
        }
    }

    async fn sign_and_send(&self, call: CallDescriptor) -> BoardResult<Signature> {
        tokio::task::yield_now().await;
        if let Some(err) = self.fail_next_send.lock().take() {
            self.record(format!("send:{}:failed", call.label));
            return Err(err);
        }
        for ix in &call.instructions {
            assert_eq!(ix.program_id, self.program_id);
            assert_eq!(ix.accounts[0].pubkey, self.board);
            let user = ix.accounts[1].pubkey;
            assert_eq!(user, self.wallet);

            let decoded = BoardInstruction::decode(&ix.data)?;
            self.record(format!("send:{}", decoded.name()));
            self.apply(decoded, user, &call)?;
        }
        Ok(Signature::new_unique())
    }
}

#[async_trait]
impl BoardReader for FakeProgram {
    async fn account(&self, address: &Pubkey) -> BoardResult<Option<RemoteAccount>> {
        tokio::task::yield_now().await;
        self.record("fetch");
        assert_eq!(*address, self.board);
        if let Some(err) = self.fail_next_fetch.lock().take() {
            return Err(err);
        }
        match self.state.lock().as_ref() {
            None => Ok(None),
            Some(board) => Ok(Some(RemoteAccount {
                owner: self.program_id,
                data: board.encode()?,
            })),
        }
    }
}

fn harness(configure: impl FnOnce(&mut FakeProgram)) -> (Arc<FakeProgram>, Arc<IntentController>) {
    let board = Arc::new(Keypair::new());
    let mut fake = FakeProgram::new(board.pubkey());
    configure(&mut fake);
    let fake = Arc::new(fake);

    let cfg = ClientConfig {
        program_id: fake.program_id,
        ..ClientConfig::default()
    };
    let session = WalletSession::new(fake.clone());
    let gateway = RemoteGateway::new(&cfg, board, fake.clone(), fake.clone());
    (fake, Arc::new(IntentController::new(session, gateway)))
}

async fn connected_with_entries(links: &[&str]) -> (Arc<FakeProgram>, Arc<IntentController>) {
    let (fake, ctl) = harness(|_| {});
    ctl.connect().await.unwrap();
    ctl.initialize_board().await.unwrap();
    for link in links {
        ctl.submit_entry(link).await.unwrap();
    }
    (fake, ctl)
}

#[tokio::test]
async fn failed_restore_leaves_session_empty() {
    let (fake, ctl) = harness(|_| {});

    assert_eq!(ctl.restore().await, None);
    assert_eq!(ctl.signer(), None);
    assert_eq!(ctl.state(), ControllerState::Disconnected);
    assert_eq!(fake.count("fetch"), 0);
}

#[tokio::test]
async fn restore_probes_once_and_refreshes() {
    let (fake, ctl) = harness(|f| f.probe_ok = true);

    let handle = ctl.spawn_restore();
    assert_eq!(handle.await.unwrap(), Some(fake.wallet));
    assert_eq!(ctl.state(), ControllerState::Connected(BoardStatus::Uninitialized));

    assert_eq!(ctl.restore().await, Some(fake.wallet));
    assert_eq!(fake.count("probe"), 1);
    assert_eq!(fake.count("fetch"), 1);
    assert_eq!(fake.count("connect"), 0);
}

#[tokio::test]
async fn connect_then_missing_board_is_uninitialized() {
    let (fake, ctl) = harness(|_| {});

    assert_eq!(ctl.connect().await.unwrap(), fake.wallet);
    assert_eq!(ctl.state(), ControllerState::Connected(BoardStatus::Uninitialized));
    assert!(ctl.snapshot().can_initialize());
    assert_eq!(fake.events(), vec!["connect", "fetch"]);
}

#[tokio::test]
async fn connect_when_connected_does_not_prompt_again() {
    let (fake, ctl) = harness(|_| {});
    ctl.connect().await.unwrap();
    ctl.connect().await.unwrap();
    assert_eq!(fake.count("connect"), 1);
}

#[tokio::test]
async fn rejected_connect_stays_disconnected() {
    let (fake, ctl) = harness(|f| f.connect = ConnectBehavior::Reject);

    assert_eq!(ctl.connect().await.unwrap_err(), BoardError::UserRejected);
    assert_eq!(ctl.state(), ControllerState::Disconnected);
    assert_eq!(ctl.signer(), None);
    assert_eq!(fake.count("fetch"), 0);
}

#[tokio::test]
async fn absent_capability_is_reported() {
    let (_fake, ctl) = harness(|f| f.connect = ConnectBehavior::Absent);

    assert_matches!(ctl.connect().await, Err(BoardError::CapabilityUnavailable(_)));
    assert_eq!(ctl.state(), ControllerState::Disconnected);
}

#[tokio::test]
async fn initialize_then_empty_board() {
    let (fake, ctl) = harness(|_| {});
    ctl.connect().await.unwrap();

    let outcome = ctl.initialize_board().await.unwrap();
    assert_eq!(outcome.snapshot.status(), BoardStatus::Populated);
    assert!(outcome.snapshot.entries().is_empty());
    assert_eq!(ctl.state(), ControllerState::Connected(BoardStatus::Populated));
    assert_eq!(fake.events(), vec!["connect", "fetch", "send:start_stuff_off", "fetch"]);
}

#[tokio::test]
async fn second_initialize_is_rejected_remotely_without_refresh() {
    let (fake, ctl) = connected_with_entries(&[]).await;
    let before = ctl.snapshot();
    let fetches = fake.count("fetch");

    assert_matches!(ctl.initialize_board().await, Err(BoardError::RemoteRejected { .. }));
    assert_eq!(fake.count("fetch"), fetches);
    assert!(Arc::ptr_eq(&before, &ctl.snapshot()));
}

#[tokio::test]
async fn submitted_entry_appears_after_refresh() {
    let (fake, ctl) = connected_with_entries(&[]).await;

    let outcome = ctl.submit_entry("http://x/g.gif").await.unwrap();
    assert_eq!(
        outcome.snapshot.entries(),
        &[Entry { link: "http://x/g.gif".to_string(), submitter: fake.wallet, score: 0 }]
    );
    assert_matches!(
        &outcome.snapshot.view,
        BoardView::Populated { total_entries: 1, .. }
    );
}

#[tokio::test]
async fn empty_link_is_rejected_locally() {
    let (fake, ctl) = connected_with_entries(&[]).await;
    let events = fake.events();

    assert_eq!(ctl.submit_entry("").await.unwrap_err(), BoardError::EmptyLink);
    assert_eq!(fake.events(), events);
}

#[tokio::test]
async fn scores_move_both_ways_without_floor() {
    let (_fake, ctl) = connected_with_entries(&["http://x/g.gif"]).await;

    let up = ctl.upvote(0).await.unwrap();
    assert_eq!(up.snapshot.entries()[0].score, 1);

    ctl.downvote(0).await.unwrap();
    let last = ctl.downvote(0).await.unwrap();
    assert_eq!(last.snapshot.entries()[0].score, -1);
}

#[tokio::test]
async fn out_of_bounds_vote_is_rejected_locally() {
    let (fake, ctl) = connected_with_entries(&["http://x/g.gif"]).await;
    let before = ctl.snapshot();
    let events = fake.events();

    assert_eq!(
        ctl.upvote(5).await.unwrap_err(),
        BoardError::StaleIndex { index: 5, len: 1 }
    );
    assert_eq!(fake.events(), events);
    assert!(Arc::ptr_eq(&before, &ctl.snapshot()));
}

#[tokio::test]
async fn vote_before_any_board_is_rejected_locally() {
    let (fake, ctl) = harness(|_| {});
    ctl.connect().await.unwrap();

    assert_matches!(ctl.upvote(0).await, Err(BoardError::StaleIndex { index: 0, len: 0 }));
    assert_eq!(fake.count("send"), 0);
}

#[tokio::test]
async fn failed_mutation_triggers_no_refresh() {
    let (fake, ctl) = connected_with_entries(&["a"]).await;
    let before = ctl.snapshot();
    let fetches = fake.count("fetch");

    *fake.fail_next_send.lock() = Some(BoardError::transient("upvote entry", "connection reset"));
    assert_matches!(ctl.upvote(0).await, Err(BoardError::TransientFailure { .. }));

    *fake.fail_next_send.lock() = Some(BoardError::UserRejected);
    assert_eq!(ctl.submit_entry("b").await.unwrap_err(), BoardError::UserRejected);

    assert_eq!(fake.count("fetch"), fetches);
    assert!(Arc::ptr_eq(&before, &ctl.snapshot()));
    assert_eq!(ctl.state(), ControllerState::Connected(BoardStatus::Populated));
}

#[tokio::test]
async fn failed_refresh_drops_entries() {
    let (fake, ctl) = connected_with_entries(&["a", "b"]).await;

    *fake.fail_next_fetch.lock() = Some(BoardError::transient("fetch board", "timeout"));
    let outcome = ctl.upvote(1).await.unwrap();

    assert_eq!(outcome.snapshot.status(), BoardStatus::Error);
    assert!(outcome.snapshot.entries().is_empty());
    assert_eq!(ctl.state(), ControllerState::Connected(BoardStatus::Error));

    let recovered = ctl.refresh().await.unwrap();
    assert_eq!(recovered.entries()[1].score, 1);
}

#[tokio::test]
async fn stale_entry_ref_is_rejected_locally() {
    let (fake, ctl) = connected_with_entries(&["a"]).await;
    let target = ctl.snapshot().entry_ref(0).unwrap();

    ctl.submit_entry("b").await.unwrap();
    let sends = fake.count("send");

    assert_matches!(
        ctl.vote_at(target, VoteDelta::Up).await,
        Err(BoardError::StaleSnapshot { .. })
    );
    assert_eq!(fake.count("send"), sends);

    let fresh = ctl.snapshot().entry_ref(0).unwrap();
    let outcome = ctl.vote_at(fresh, VoteDelta::Up).await.unwrap();
    assert_eq!(outcome.snapshot.entries()[0].score, 1);
}

#[tokio::test]
async fn every_successful_mutation_is_followed_by_one_fetch() {
    let (fake, ctl) = connected_with_entries(&["a"]).await;

    let a = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.submit_entry("b").await })
    };
    let b = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.upvote(0).await })
    };
    let c = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.submit_entry("c").await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();
    c.await.unwrap().unwrap();

    let remote: Vec<String> = fake
        .events()
        .into_iter()
        .filter(|e| e.starts_with("send") || e == "fetch")
        .skip_while(|e| e != "send:start_stuff_off")
        .collect();
    for pair in remote.chunks(2) {
        assert!(pair[0].starts_with("send:"), "unexpected order: {remote:?}");
        assert_eq!(pair[1], "fetch", "unexpected order: {remote:?}");
    }

    let snap = ctl.snapshot();
    assert_eq!(snap.entries().len(), 3);
    assert_eq!(snap.entries()[0].score, 1);
}

#[tokio::test]
async fn mutations_require_a_session() {
    let (fake, ctl) = harness(|_| {});

    assert_eq!(ctl.initialize_board().await.unwrap_err(), BoardError::NotConnected);
    assert_eq!(ctl.submit_entry("a").await.unwrap_err(), BoardError::NotConnected);
    assert_eq!(ctl.refresh().await.unwrap_err(), BoardError::NotConnected);
    assert!(fake.events().is_empty());
}

#[tokio::test]
async fn dispatch_routes_intents() {
    let (_fake, ctl) = harness(|_| {});

    let snap = ctl.dispatch(Intent::Connect).await.unwrap();
    assert_eq!(snap.status(), BoardStatus::Uninitialized);

    ctl.dispatch(Intent::Initialize).await.unwrap();
    ctl.dispatch(Intent::Submit { link: "http://x/g.gif".to_string() }).await.unwrap();
    let snap = ctl
        .dispatch(Intent::Vote { index: 0, delta: VoteDelta::Down })
        .await
        .unwrap();
    assert_eq!(snap.entries()[0].score, -1);
}

#[tokio::test]
async fn disconnect_clears_session_and_board() {
    let (_fake, ctl) = connected_with_entries(&["a"]).await;

    ctl.disconnect().await;
    assert_eq!(ctl.state(), ControllerState::Disconnected);
    assert_eq!(ctl.snapshot().status(), BoardStatus::Unfetched);
    assert_eq!(ctl.submit_entry("b").await.unwrap_err(), BoardError::NotConnected);
}

#[tokio::test]
async fn observers_see_each_replacement_whole() {
    let (_fake, ctl) = harness(|_| {});
    let mut rx = ctl.subscribe();

    ctl.connect().await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().status(), BoardStatus::Uninitialized);

    ctl.initialize_board().await.unwrap();
    ctl.submit_entry("a").await.unwrap();
    rx.changed().await.unwrap();
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.entries().len(), 1);
    assert_eq!(seen.epoch, ctl.snapshot().epoch);
}
