//! Board account layout.
//!
//! The account is an 8-byte discriminator followed by the borsh encoding of
//! `{ total_gifs: u64, gif_list: Vec<Item> }`. The program allocates a fixed
//! amount of space, so decoding ignores trailing bytes.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Serialize, Serializer};
use solana_program::pubkey::Pubkey;

use crate::constants::DISCRIMINATOR_LEN;
use crate::discriminator;
use crate::error::{BoardError, BoardResult};

/// One submitted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub link: String,
    #[serde(serialize_with = "pubkey_as_string")]
    pub submitter: Pubkey,
    pub score: i64,
}

/// Decoded board account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardAccount {
    /// Counter kept by the program alongside the list.
    pub total_entries: u64,
    pub entries: Vec<Entry>,
}

/// Raw account data as fetched from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAccount {
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawItem {
    gif_link: String,
    user_address: [u8; 32],
    votes: i64,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawBoard {
    total_gifs: u64,
    gif_list: Vec<RawItem>,
}

impl BoardAccount {
    /// Decode account data owned by `program_id`.
    pub fn decode(program_id: &Pubkey, account: &RemoteAccount) -> BoardResult<Self> {
        if account.owner != *program_id {
            return Err(BoardError::Decode(format!(
                "account owned by {}, expected {program_id}",
                account.owner
            )));
        }
        if account.data.len() < DISCRIMINATOR_LEN {
            return Err(BoardError::Decode("account data shorter than discriminator".to_string()));
        }

        let (tag, mut body) = account.data.split_at(DISCRIMINATOR_LEN);
        if tag != &discriminator::board_account()[..] {
            return Err(BoardError::Decode("account discriminator mismatch".to_string()));
        }

        let raw = RawBoard::deserialize(&mut body).map_err(|e| BoardError::Decode(e.to_string()))?;
        Ok(Self {
            total_entries: raw.total_gifs,
            entries: raw
                .gif_list
                .into_iter()
                .map(|item| Entry {
                    link: item.gif_link,
                    submitter: Pubkey::new_from_array(item.user_address),
                    score: item.votes,
                })
                .collect(),
        })
    }

    /// Encode into account data, discriminator included.
    pub fn encode(&self) -> BoardResult<Vec<u8>> {
        let raw = RawBoard {
            total_gifs: self.total_entries,
            gif_list: self
                .entries
                .iter()
                .map(|e| RawItem {
                    gif_link: e.link.clone(),
                    user_address: e.submitter.to_bytes(),
                    votes: e.score,
                })
                .collect(),
        };

        let mut out = discriminator::board_account().to_vec();
        let body = borsh::to_vec(&raw).map_err(|e| BoardError::Decode(e.to_string()))?;
        out.extend_from_slice(&body);
        Ok(out)
    }
}

fn pubkey_as_string<S: Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BoardAccount {
        BoardAccount {
            total_entries: 2,
            entries: vec![
                Entry {
                    link: "http://x/g.gif".to_string(),
                    submitter: Pubkey::new_unique(),
                    score: 0,
                },
                Entry {
                    link: "http://x/h.gif".to_string(),
                    submitter: Pubkey::new_unique(),
                    score: -3,
                },
            ],
        }
    }

    #[test]
    fn decode_ignores_allocation_padding() {
        let program = Pubkey::new_unique();
        let board = sample();
        let mut data = board.encode().unwrap();
        data.extend_from_slice(&[0u8; 256]);

        let account = RemoteAccount { owner: program, data };
        let decoded = BoardAccount::decode(&program, &account).unwrap();
        assert_eq!(decoded, board);
    }

    #[test]
    fn foreign_owner_rejected() {
        let program = Pubkey::new_unique();
        let data = sample().encode().unwrap();
        let account = RemoteAccount { owner: Pubkey::new_unique(), data };
        let err = BoardAccount::decode(&program, &account).unwrap_err();
        assert!(matches!(err, BoardError::Decode(_)));
    }

    #[test]
    fn wrong_discriminator_rejected() {
        let program = Pubkey::new_unique();
        let mut data = sample().encode().unwrap();
        data[0] ^= 0xff;
        let account = RemoteAccount { owner: program, data };
        let err = BoardAccount::decode(&program, &account).unwrap_err();
        assert!(err.to_string().contains("discriminator"));
    }

    #[test]
    fn truncated_body_rejected() {
        let program = Pubkey::new_unique();
        let mut data = sample().encode().unwrap();
        data.truncate(20);
        assert!(BoardAccount::decode(&program, &RemoteAccount { owner: program, data }).is_err());
    }

    #[test]
    fn entry_serializes_submitter_as_base58() {
        let key = Pubkey::new_unique();
        let entry = Entry { link: "l".to_string(), submitter: key, score: 1 };
        let v = serde_json::to_value(entry).unwrap();
        assert_eq!(v["submitter"], key.to_string());
    }
}
