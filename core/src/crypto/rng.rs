//! crypto/rng.rs
//! Fresh per-envelope randomness. OS CSPRNG only.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::constants::{IV_LEN, SALT_LEN};

#[inline]
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut out = [0u8; N];
    OsRng.fill_bytes(&mut out);
    out
}

/// 16-byte PBKDF2 salt.
pub fn random_salt() -> [u8; SALT_LEN] {
    random_bytes::<SALT_LEN>()
}

/// 12-byte GCM IV. Must never repeat under one key.
pub fn random_iv() -> [u8; IV_LEN] {
    random_bytes::<IV_LEN>()
}
