//! gifboard-client
//!
//! Session and synchronization layer for the gifboard on-chain program: a
//! shared, append-only list of links with vote counters.
//!
//! It includes:
//! - a wallet session over a pluggable signing capability
//! - a remote gateway that encodes the four board instructions and reads the board account
//! - a board store holding the latest snapshot, replaced atomically
//! - an intent controller that serializes user intents and refreshes after every mutation
//!
//! The program id and board keypair are supplied through [`ClientConfig`];
//! nothing here is global state.

pub mod account;
pub mod config;
pub mod constants;
pub mod controller;
pub mod discriminator;
pub mod error;
pub mod gateway;
pub mod instruction;
pub mod keypair;
pub mod keypair_wallet;
pub mod rpc;
pub mod store;
pub mod wallet;

pub use account::{BoardAccount, Entry, RemoteAccount};
pub use config::{validate_config, ClientConfig, Cluster, Commitment, FileConfig, WalletConfig};
pub use controller::{ControllerState, Intent, IntentController, MutationOutcome};
pub use error::{BoardError, BoardResult};
pub use gateway::{BoardReader, FetchOutcome, RemoteGateway};
pub use instruction::{BoardInstruction, VoteDelta};
pub use keypair_wallet::{ApprovalRequest, Approver, AutoApprove, KeypairWallet};
pub use store::{BoardSnapshot, BoardStatus, BoardStore, BoardView, EntryRef};
pub use wallet::{CallDescriptor, SigningCapability, WalletSession};
