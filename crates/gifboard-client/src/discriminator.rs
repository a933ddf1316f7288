//! Discriminator derivation for the board program.
//!
//! Every instruction and account is prefixed with the first eight bytes of
//! `sha256("<namespace>:<name>")`. These helpers must match the on-chain
//! program byte for byte.

use sha2::{Digest, Sha256};

use crate::constants::{
    ACCOUNT_NAMESPACE, BOARD_ACCOUNT_NAME, DISCRIMINATOR_LEN, IX_ADD_ENTRY, IX_DOWNVOTE,
    IX_INITIALIZE, IX_NAMESPACE, IX_UPVOTE,
};

pub type Discriminator = [u8; DISCRIMINATOR_LEN];

/// Derive a discriminator for `namespace:name`.
pub fn derive(namespace: &str, name: &str) -> Discriminator {
    let mut h = Sha256::new();
    h.update(namespace.as_bytes());
    h.update(b":");
    h.update(name.as_bytes());
    let digest = h.finalize();

    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

/// Discriminator of an instruction by its snake_case name.
pub fn instruction(name: &str) -> Discriminator {
    derive(IX_NAMESPACE, name)
}

/// Discriminator of the board account.
pub fn board_account() -> Discriminator {
    derive(ACCOUNT_NAMESPACE, BOARD_ACCOUNT_NAME)
}

/// Discriminators of every board instruction, keyed by name.
pub fn all_instructions() -> [(&'static str, Discriminator); 4] {
    [
        (IX_INITIALIZE, instruction(IX_INITIALIZE)),
        (IX_ADD_ENTRY, instruction(IX_ADD_ENTRY)),
        (IX_UPVOTE, instruction(IX_UPVOTE)),
        (IX_DOWNVOTE, instruction(IX_DOWNVOTE)),
    ]
}
