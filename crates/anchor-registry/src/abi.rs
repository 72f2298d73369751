//! Solidity ABI encoding for the registry's `bytes32[]` arguments
//!
//! The registry takes exactly one dynamic argument in both its constructor
//! and `addAssets`, so only that shape is encoded here: a head word holding
//! the offset, a length word, then one word per identifier.

use anchor_asset::{keccak256, IdentifierSet};

/// Width of an ABI word
pub const WORD: usize = 32;

/// Signature of the registry's append method
pub const ADD_ASSETS_SIGNATURE: &str = "addAssets(bytes32[])";

/// First four bytes of the Keccak-256 of a function signature
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest.as_bytes()[..4]);
    out
}

fn uint_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

/// Encode a single `bytes32[]` argument
#[must_use]
pub fn encode_bytes32_array(ids: &IdentifierSet) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD * (2 + ids.len()));
    out.extend_from_slice(&uint_word(WORD));
    out.extend_from_slice(&uint_word(ids.len()));
    for id in ids {
        out.extend_from_slice(id.as_bytes());
    }
    out
}

/// Calldata for `addAssets(bytes32[])`
#[must_use]
pub fn encode_add_assets(ids: &IdentifierSet) -> Vec<u8> {
    let mut out = selector(ADD_ASSETS_SIGNATURE).to_vec();
    out.extend(encode_bytes32_array(ids));
    out
}

/// Creation code followed by constructor arguments
#[must_use]
pub fn encode_deployment(bytecode: &[u8], args: Option<&IdentifierSet>) -> Vec<u8> {
    let mut out = bytecode.to_vec();
    if let Some(ids) = args {
        out.extend(encode_bytes32_array(ids));
    }
    out
}
