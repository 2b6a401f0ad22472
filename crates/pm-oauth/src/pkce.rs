//! PKCE (Proof Key for Code Exchange) utilities for the authorization-code
//! flow
//!
//! The challenge is the hex-encoded SHA-256 digest of the verifier; the
//! platforms integrated here verify against that form. The method label sent
//! alongside is still `S256`.

use pm_types::{AppError, AppResult};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 32 random bytes, hex-encoded to 64 characters
const VERIFIER_BYTES: usize = 32;
const STATE_BYTES: usize = 32;

/// PKCE challenge containing code verifier and challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkceChallenge {
    /// Code verifier, kept server-side until the token exchange
    pub code_verifier: String,

    /// Code challenge sent in the authorization URL
    pub code_challenge: String,

    /// Challenge method label ("S256")
    pub code_challenge_method: String,
}

fn random_hex(byte_len: usize) -> AppResult<String> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; byte_len];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal("Failed to generate random bytes".to_string()))?;
    Ok(hex::encode(bytes))
}

/// Generate a PKCE challenge for an authorization attempt
///
/// The verifier is 64 hex characters drawn from the system CSPRNG (256 bits
/// of randomness); the challenge is derived from it deterministically.
pub fn generate_pkce_challenge() -> AppResult<PkceChallenge> {
    let code_verifier = random_hex(VERIFIER_BYTES)?;
    let code_challenge = hex::encode(Sha256::digest(code_verifier.as_bytes()));

    Ok(PkceChallenge {
        code_verifier,
        code_challenge,
        code_challenge_method: "S256".to_string(),
    })
}

/// Generate a random state token for CSRF protection
///
/// Same entropy as the code verifier. The state is stored with the pending
/// session before the redirect is issued and must round-trip unchanged
/// through the provider callback.
pub fn generate_state() -> AppResult<String> {
    random_hex(STATE_BYTES)
}
