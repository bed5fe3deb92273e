//! Encryption of the canonical payload.
//!
//! The gateway decrypts requests with an authenticated AES-256-CBC envelope:
//!
//! 1. The plaintext is framed as a serialized string, `s:<byte length>:"<text>";`.
//! 2. It is encrypted with AES-256-CBC (PKCS#7 padding). The merchant key is
//!    zero-padded or truncated to 32 bytes.
//! 3. The IV, ciphertext and an HMAC-SHA256 over `base64(iv) ‖ base64(ciphertext)`
//!    are placed in a JSON object `{"iv", "value", "mac"}`.
//! 4. The JSON text is base64 encoded.
//!
//! The IV is the first 16 bytes of HMAC-SHA256(key, framed plaintext), so the same
//! key and plaintext always produce the same envelope.

use std::fmt::Display;

use base64::{Engine, prelude::BASE64_STANDARD};
use hmac::{Hmac, Mac};
use openssl::symm::{Cipher, decrypt, encrypt};
use secrecy::{ExposeSecret, SecretVec};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::errors::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const AES_256_KEY_LENGTH: usize = 32;
const IV_LENGTH: usize = 16;

/// An encrypted, base64-encoded request, ready to be placed in a form field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedPayload(pub String);

impl EncodedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EncodedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The JSON object inside an [`EncodedPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64 IV.
    pub iv: String,
    /// Base64 ciphertext.
    pub value: String,
    /// Lowercase hex HMAC-SHA256 of `iv` followed by `value`.
    pub mac: String,
}

impl TryFrom<&EncodedPayload> for Envelope {
    type Error = Error;

    fn try_from(value: &EncodedPayload) -> Result<Self> {
        let decoded_bytes = BASE64_STANDARD.decode(&value.0)?;
        let json_str = String::from_utf8(decoded_bytes)?;
        let envelope = serde_json::from_str(&json_str)?;
        Ok(envelope)
    }
}

impl TryFrom<&Envelope> for EncodedPayload {
    type Error = Error;

    fn try_from(value: &Envelope) -> Result<Self> {
        let json = serde_json::to_string(value)?;
        Ok(EncodedPayload(BASE64_STANDARD.encode(json)))
    }
}

/// Encrypts and decrypts payloads under one merchant key.
pub struct CryptoCodec {
    key: SecretVec<u8>,
}

// `secrecy` 0.8 does not implement `DebugSecret` for `u8`, so `Debug` cannot be derived.
impl std::fmt::Debug for CryptoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoCodec")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl CryptoCodec {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: SecretVec::new(key.as_ref().to_vec()),
        }
    }

    fn cipher_key(&self) -> [u8; AES_256_KEY_LENGTH] {
        let key = self.key.expose_secret();
        let mut cipher_key = [0u8; AES_256_KEY_LENGTH];
        let len = key.len().min(AES_256_KEY_LENGTH);
        cipher_key[..len].copy_from_slice(&key[..len]);
        cipher_key
    }

    fn mac(&self, parts: &[&[u8]]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.key.expose_secret())
            .map_err(|_| Error::MalformedEnvelope("unusable MAC key".to_string()))?;
        for part in parts {
            mac.update(part);
        }
        Ok(mac)
    }

    fn derive_iv(&self, framed: &[u8]) -> Result<[u8; IV_LENGTH]> {
        let digest = self.mac(&[framed])?.finalize().into_bytes();
        let mut iv = [0u8; IV_LENGTH];
        iv.copy_from_slice(&digest[..IV_LENGTH]);
        Ok(iv)
    }

    /// Encrypts `plaintext` into the envelope the gateway expects.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncodedPayload> {
        let framed = frame(plaintext);
        let iv = self.derive_iv(framed.as_bytes())?;
        let ciphertext = encrypt(
            Cipher::aes_256_cbc(),
            &self.cipher_key(),
            Some(iv.as_slice()),
            framed.as_bytes(),
        )?;

        let iv = BASE64_STANDARD.encode(iv);
        let value = BASE64_STANDARD.encode(ciphertext);
        let mac = hex::encode(
            self.mac(&[iv.as_bytes(), value.as_bytes()])?
                .finalize()
                .into_bytes(),
        );

        EncodedPayload::try_from(&Envelope { iv, value, mac })
    }

    /// Verifies and decrypts an envelope produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, payload: &EncodedPayload) -> Result<String> {
        let envelope = Envelope::try_from(payload)?;

        let expected = hex::decode(&envelope.mac)?;
        self.mac(&[envelope.iv.as_bytes(), envelope.value.as_bytes()])?
            .verify_slice(&expected)
            .map_err(|_| Error::MacMismatch)?;

        let iv = BASE64_STANDARD.decode(&envelope.iv)?;
        if iv.len() != IV_LENGTH {
            return Err(Error::MalformedEnvelope(format!(
                "IV must be {IV_LENGTH} bytes, got {}",
                iv.len()
            )));
        }
        let ciphertext = BASE64_STANDARD.decode(&envelope.value)?;
        let framed = decrypt(
            Cipher::aes_256_cbc(),
            &self.cipher_key(),
            Some(iv.as_slice()),
            &ciphertext,
        )?;

        unframe(&String::from_utf8(framed)?).map(str::to_owned)
    }
}

fn frame(text: &str) -> String {
    format!("s:{}:\"{text}\";", text.len())
}

fn unframe(framed: &str) -> Result<&str> {
    let malformed = || Error::MalformedEnvelope("plaintext is not a serialized string".to_string());

    let (length, rest) = framed
        .strip_prefix("s:")
        .and_then(|rest| rest.split_once(':'))
        .ok_or_else(malformed)?;
    let length: usize = length.parse().map_err(|_| malformed())?;
    let text = rest
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix("\";"))
        .ok_or_else(malformed)?;

    if text.len() != length {
        return Err(Error::MalformedEnvelope(format!(
            "declared length {length} does not match {}",
            text.len()
        )));
    }
    Ok(text)
}
