//! JSON-RPC adapters.
//!
//! `RpcBoardReader` implements `BoardReader` on top of the nonblocking Solana
//! RPC client. `classify_client_error` maps RPC failures onto the board error
//! taxonomy: the remote refused the call, or the transport failed.

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_program::pubkey::Pubkey;

use crate::account::RemoteAccount;
use crate::config::ClientConfig;
use crate::error::{BoardError, BoardResult};
use crate::gateway::BoardReader;

/// Build an RPC client for the configured endpoint and commitment.
pub fn connect_rpc(config: &ClientConfig) -> Arc<RpcClient> {
    Arc::new(RpcClient::new_with_commitment(
        config.endpoint(),
        config.commitment.config(),
    ))
}

pub struct RpcBoardReader {
    rpc: Arc<RpcClient>,
}

impl RpcBoardReader {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl BoardReader for RpcBoardReader {
    async fn account(&self, address: &Pubkey) -> BoardResult<Option<RemoteAccount>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await
            .map_err(|e| classify_client_error("fetch board", e))?;

        Ok(response.value.map(|account| RemoteAccount {
            owner: account.owner,
            data: account.data,
        }))
    }
}

/// Map an RPC client error onto `RemoteRejected` or `TransientFailure`.
pub fn classify_client_error(operation: &str, err: ClientError) -> BoardError {
    let reason = err.to_string();
    match err.kind() {
        ClientErrorKind::TransactionError(_) => BoardError::remote_rejected(operation, reason),
        ClientErrorKind::RpcError(RpcError::RpcResponseError { data, .. }) => match data {
            RpcResponseErrorData::SendTransactionPreflightFailure(_) => {
                BoardError::remote_rejected(operation, reason)
            }
            _ => BoardError::transient(operation, reason),
        },
        _ => BoardError::transient(operation, reason),
    }
}
