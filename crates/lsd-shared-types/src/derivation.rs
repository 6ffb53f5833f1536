//! # Address Derivation
//!
//! Pure functions computing where a deployer's contracts land.
//! Deterministic and side-effect free.

use crate::value_objects::{Address, Hash};
use sha3::{Digest, Keccak256};

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Hash::new(out)
}

/// Keccak-256 over the concatenation of `parts`.
#[must_use]
pub fn keccak256_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Hash::new(out)
}

/// Computes the address for a CREATE-style deployment.
///
/// Address = keccak256(rlp(\[sender, nonce\]))\[12:\]
#[must_use]
pub fn compute_contract_address(sender: Address, nonce: u64) -> Address {
    let mut content = Vec::with_capacity(32);

    // 20-byte string header: 0x80 + 20
    content.push(0x94);
    content.extend_from_slice(sender.as_bytes());

    if nonce == 0 {
        content.push(0x80);
    } else if nonce < 128 {
        content.push(nonce as u8);
    } else {
        let nonce_bytes = trimmed_be_bytes(nonce);
        content.push(0x80 + nonce_bytes.len() as u8);
        content.extend_from_slice(&nonce_bytes);
    }

    // content is at most 30 bytes, so the short list header always applies
    let mut rlp_data = Vec::with_capacity(content.len() + 1);
    rlp_data.push(0xc0 + content.len() as u8);
    rlp_data.extend_from_slice(&content);

    tail_address(&keccak256(&rlp_data))
}

/// Computes the address for a CREATE2-style deployment.
///
/// Address = keccak256(0xff ++ sender ++ salt ++ keccak256(init_code))\[12:\]
#[must_use]
pub fn compute_contract_address_create2(sender: Address, salt: Hash, init_code: &[u8]) -> Address {
    let code_hash = keccak256(init_code);
    let prefix: &[u8] = &[0xff];
    let hash = keccak256_concat(&[
        prefix,
        sender.as_bytes().as_slice(),
        salt.as_bytes().as_slice(),
        code_hash.as_bytes().as_slice(),
    ]);
    tail_address(&hash)
}

fn tail_address(hash: &Hash) -> Address {
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.as_bytes()[12..32]);
    Address::new(addr)
}

fn trimmed_be_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[start..].to_vec()
}
