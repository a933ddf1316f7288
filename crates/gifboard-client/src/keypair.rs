//! Keypair file loading.
//!
//! Accepted formats:
//! - Solana CLI: a JSON array of 64 bytes
//! - web3.js export: `{"_keypair": {"secretKey": {"0": n, "1": n, ...}}}`
//! - a base58-encoded 64-byte secret key (wallet exports)

use std::fs;
use std::path::Path;

use serde_json::Value;
use solana_sdk::signature::Keypair;

use crate::error::{BoardError, BoardResult};

const SECRET_KEY_LEN: usize = 64;

/// Load a keypair from `path` in any accepted format.
pub fn load_keypair(path: &Path) -> BoardResult<Keypair> {
    let raw = fs::read_to_string(path)
        .map_err(|e| BoardError::config(format!("read keypair {}: {e}", path.display())))?;
    parse_keypair(&raw).map_err(|e| match e {
        BoardError::Config(msg) => BoardError::config(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Parse keypair file contents.
pub fn parse_keypair(raw: &str) -> BoardResult<Keypair> {
    let trimmed = raw.trim();
    let bytes = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let v: Value = serde_json::from_str(trimmed)
            .map_err(|e| BoardError::config(format!("invalid keypair json: {e}")))?;
        json_secret_bytes(&v)?
    } else {
        bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| BoardError::config(format!("invalid base58 secret key: {e}")))?
    };

    if bytes.len() != SECRET_KEY_LEN {
        return Err(BoardError::config(format!(
            "secret key must be {SECRET_KEY_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Keypair::from_bytes(&bytes).map_err(|e| BoardError::config(format!("invalid secret key: {e}")))
}

fn json_secret_bytes(v: &Value) -> BoardResult<Vec<u8>> {
    match v {
        Value::Array(items) => items.iter().map(json_byte).collect(),
        Value::Object(_) => {
            let secret = v
                .pointer("/_keypair/secretKey")
                .ok_or_else(|| BoardError::config("keypair object has no _keypair.secretKey"))?;
            match secret {
                Value::Array(items) => items.iter().map(json_byte).collect(),
                Value::Object(map) => indexed_secret_bytes(map),
                _ => Err(BoardError::config("secretKey must be an array or object")),
            }
        }
        _ => Err(BoardError::config("keypair json must be an array or object")),
    }
}

/// web3.js serializes `Uint8Array` as `{"0": n, "1": n, ...}`.
fn indexed_secret_bytes(map: &serde_json::Map<String, Value>) -> BoardResult<Vec<u8>> {
    // Keys are stringified indices; order by numeric value, not text.
    let mut indexed = map
        .iter()
        .map(|(k, b)| {
            let idx = k
                .parse::<usize>()
                .map_err(|_| BoardError::config(format!("secretKey index is not a number: {k}")))?;
            Ok((idx, json_byte(b)?))
        })
        .collect::<BoardResult<Vec<(usize, u8)>>>()?;
    indexed.sort_by_key(|(idx, _)| *idx);
    if indexed.iter().enumerate().any(|(pos, (idx, _))| pos != *idx) {
        return Err(BoardError::config("secretKey indices are not contiguous"));
    }
    Ok(indexed.into_iter().map(|(_, b)| b).collect())
}

fn json_byte(v: &Value) -> BoardResult<u8> {
    v.as_u64()
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| BoardError::config(format!("secret key byte out of range: {v}")))
}
