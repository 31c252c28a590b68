//! Salted, iterated password derivation (PBKDF2-HMAC).
//!
//! Pure and stateless: no I/O, no shared mutable state.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

pub const DEFAULT_ITERATIONS: u32 = 120_000;
pub const MIN_ITERATIONS: u32 = 100_000;
pub const DEFAULT_DIGEST: &str = "sha512";
pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 64;

/// Parameters a hash was derived with, stored next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    pub iterations: u32,
    /// Digest name, e.g. `"sha512"`.
    pub digest: String,
}

/// Stored password credential, owned 1:1 by a principal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub salt: Vec<u8>,
    pub hash: Vec<u8>,
    pub params: HashParams,
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential")
            .field("salt", &"<redacted>")
            .field("hash", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Digest {
    Sha256,
    Sha512,
}

impl Digest {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sha256" => Some(Digest::Sha256),
            "sha512" => Some(Digest::Sha512),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Digest::Sha256 => "sha256",
            Digest::Sha512 => "sha512",
        }
    }

    fn derive(self, secret: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
        match self {
            Digest::Sha256 => pbkdf2_hmac::<Sha256>(secret, salt, iterations, out),
            Digest::Sha512 => pbkdf2_hmac::<Sha512>(secret, salt, iterations, out),
        }
    }
}

/// Derives and verifies password credentials.
///
/// New credentials always use the current defaults; verification always uses
/// the parameters stored with the credential, so older hashes keep working
/// after the defaults change.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    iterations: u32,
    digest: Digest,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            digest: Digest::Sha512,
        }
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a credential with a fresh random salt.
    pub fn derive(&self, secret: &str) -> Credential {
        let mut salt = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let mut hash = vec![0u8; KEY_LEN];
        self.digest.derive(secret.as_bytes(), &salt, self.iterations, &mut hash);

        Credential {
            salt,
            hash,
            params: HashParams {
                iterations: self.iterations,
                digest: self.digest.name().to_string(),
            },
        }
    }

    /// Check `secret` against a stored credential.
    ///
    /// Returns `false` (never errors) for incomplete or unreadable credentials.
    pub fn verify(secret: &str, credential: &Credential) -> bool {
        if credential.salt.is_empty() || credential.hash.is_empty() {
            return false;
        }
        if credential.params.iterations == 0 {
            return false;
        }
        let Some(digest) = Digest::from_name(&credential.params.digest) else {
            return false;
        };

        let mut candidate = vec![0u8; credential.hash.len()];
        digest.derive(
            secret.as_bytes(),
            &credential.salt,
            credential.params.iterations,
            &mut candidate,
        );

        candidate.ct_eq(&credential.hash).into()
    }
}
