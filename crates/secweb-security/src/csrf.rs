//! CSRF protection with signed double-submit tokens
//!
//! A token is `hex(nonce).hex(hmac_sha256(key, nonce))`. The same token is
//! sent as a readable cookie and echoed back in the `_csrf` form field; a
//! request passes when both copies are present, equal, and correctly signed.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const NONCE_BYTES: usize = 16;
const GENERATED_KEY_BYTES: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrfError {
    #[error("CSRF token missing")]
    Missing,
    #[error("CSRF token mismatch")]
    Mismatch,
    #[error("CSRF token signature invalid")]
    InvalidSignature,
    #[error("CSRF key rejected: {0}")]
    InvalidKey(String),
}

#[derive(Clone)]
pub struct CsrfTokens {
    mac: HmacSha256,
}

impl CsrfTokens {
    /// Keys the signer with `secret`, or with random bytes when it is empty.
    pub fn new(secret: &str) -> Result<Self, CsrfError> {
        let key = if secret.is_empty() {
            let mut key = vec![0u8; GENERATED_KEY_BYTES];
            rand::rng().fill_bytes(&mut key);
            key
        } else {
            secret.as_bytes().to_vec()
        };
        let mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| CsrfError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    pub fn issue(&self) -> String {
        let mut nonce = [0u8; NONCE_BYTES];
        rand::rng().fill_bytes(&mut nonce);
        let mut mac = self.mac.clone();
        mac.update(&nonce);
        format!("{}.{}", hex::encode(nonce), hex::encode(mac.finalize().into_bytes()))
    }

    pub fn is_valid(&self, token: &str) -> bool {
        let Some((nonce_hex, sig_hex)) = token.split_once('.') else {
            return false;
        };
        let (Ok(nonce), Ok(sig)) = (hex::decode(nonce_hex), hex::decode(sig_hex)) else {
            return false;
        };
        if nonce.len() != NONCE_BYTES {
            return false;
        }
        let mut mac = self.mac.clone();
        mac.update(&nonce);
        mac.verify_slice(&sig).is_ok()
    }

    /// Checks the cookie copy against the submitted copy.
    pub fn verify(&self, cookie: Option<&str>, submitted: Option<&str>) -> Result<(), CsrfError> {
        let cookie = cookie.filter(|c| !c.is_empty()).ok_or(CsrfError::Missing)?;
        let submitted = submitted.filter(|s| !s.is_empty()).ok_or(CsrfError::Missing)?;
        if !constant_time_eq(cookie.as_bytes(), submitted.as_bytes()) {
            return Err(CsrfError::Mismatch);
        }
        if !self.is_valid(submitted) {
            return Err(CsrfError::InvalidSignature);
        }
        Ok(())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
