//! Salted password hashing and verification.
//!
//! An account's credentials are a pair of 32-byte values: a random salt and
//! the SHA-256 digest of `password || salt`. The salt is unique per account,
//! so a leaked table forces an attacker to brute-force each row separately.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::VaxError;

/// Size in bytes of both the digest and the salt.
pub const DIGEST_SIZE: usize = 32;

/// Stored credential material for one account.
///
/// Replaced wholesale on password change, never patched field-by-field.
/// Deliberately carries no `Debug` or `PartialEq` impl: digest bytes must
/// never reach log output, and comparisons go through [`Credentials::verify`].
#[derive(Clone)]
pub struct Credentials {
    pub hash: [u8; DIGEST_SIZE],
    pub salt: [u8; DIGEST_SIZE],
}

fn generate_salt() -> Result<[u8; DIGEST_SIZE], VaxError> {
    let mut salt = [0u8; DIGEST_SIZE];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|_| VaxError::Randomness)?;
    Ok(salt)
}

fn derive(password: &str, salt: &[u8; DIGEST_SIZE]) -> [u8; DIGEST_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    hasher.finalize().into()
}

impl Credentials {
    /// Issue fresh credentials for `password`: a new random salt plus the
    /// derived digest. Fails with [`VaxError::Randomness`] when the random
    /// source under-delivers.
    pub fn issue(password: &str) -> Result<Self, VaxError> {
        let salt = generate_salt()?;
        let hash = derive(password, &salt);
        Ok(Self { hash, salt })
    }

    /// Recompute the digest with the stored salt and compare in constant time.
    pub fn verify(&self, password: &str) -> bool {
        let candidate = derive(password, &self.salt);
        bool::from(candidate.as_slice().ct_eq(self.hash.as_slice()))
    }

    /// Rehydrate credentials from stored blobs. `None` when either blob is
    /// not exactly [`DIGEST_SIZE`] bytes.
    pub fn from_parts(hash: &[u8], salt: &[u8]) -> Option<Self> {
        Some(Self {
            hash: hash.try_into().ok()?,
            salt: salt.try_into().ok()?,
        })
    }
}
