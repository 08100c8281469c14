// ── Credential sealing ──
//
// AES-256-GCM under a fixed application key, random nonce per seal,
// stored as base64(nonce ‖ ciphertext). This keeps the credential pair
// unreadable to casual inspection of the settings file; it is not a
// substitute for OS-level secret storage and the threat model does not
// pretend otherwise.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

/// Fixed 32-byte application key.
const KEY: &[u8; 32] = b"fleetsync-settings-at-rest-key-1";

/// GCM nonce length in bytes.
const NONCE_LENGTH: usize = 12;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed: {0}")]
    Decrypt(String),

    #[error("malformed sealed value: {0}")]
    Encoding(String),
}

fn cipher() -> Aes256Gcm {
    // 32-byte key, so construction cannot fail.
    Aes256Gcm::new(KEY.into())
}

/// Seal a plaintext value for storage.
pub fn seal(plaintext: &str) -> Result<String, SecretError> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher()
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| SecretError::Encrypt)?;

    let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    sealed.extend_from_slice(nonce.as_slice());
    sealed.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(sealed))
}

/// Recover a plaintext value sealed by [`seal`].
pub fn open(sealed: &str) -> Result<String, SecretError> {
    let raw = BASE64
        .decode(sealed)
        .map_err(|e| SecretError::Encoding(e.to_string()))?;
    if raw.len() <= NONCE_LENGTH {
        return Err(SecretError::Encoding("sealed value too short".into()));
    }
    let (nonce, ciphertext) = raw.split_at(NONCE_LENGTH);

    let plaintext = cipher()
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| SecretError::Decrypt(e.to_string()))?;
    String::from_utf8(plaintext).map_err(|e| SecretError::Decrypt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let sealed = seal("11111111-2222-3333-4444-555555555555").expect("seal");
        assert_ne!(sealed, "11111111-2222-3333-4444-555555555555");
        let opened = open(&sealed).expect("open");
        assert_eq!(opened, "11111111-2222-3333-4444-555555555555");
    }

    #[test]
    fn nonces_differ_between_seals() {
        let a = seal("same").expect("seal");
        let b = seal("same").expect("seal");
        assert_ne!(a, b);
        assert_eq!(open(&a).expect("open"), open(&b).expect("open"));
    }

    #[test]
    fn tampered_values_are_rejected() {
        let sealed = seal("secret").expect("seal");
        let mut raw = BASE64.decode(&sealed).expect("decode");
        let last = raw.len() - 1;
        raw[last] ^= 0xFF;
        let tampered = BASE64.encode(raw);
        assert!(open(&tampered).is_err());
    }

    #[test]
    fn garbage_is_an_encoding_error() {
        assert!(matches!(open("not base64!!"), Err(SecretError::Encoding(_))));
        assert!(matches!(open("QUJD"), Err(SecretError::Encoding(_))));
    }
}
