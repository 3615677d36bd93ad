//! Signing envelopes over the canonical (RFC 8785) document form.
//!
//! Envelope selection is keyed on the playbook's declared `spec_version`.
//! Documents at `1.0`/`1.1` use the legacy envelope: the canonical playbook
//! digest is embedded into the signature's `sha256` property and the
//! signature object itself, base64url encoded, is what gets signed.
//! Everything else uses the primary envelope: the signature (with an empty
//! `value`) is appended as the sole entry of a working copy, the canonical
//! bytes are hashed and the lowercase hex digest text is signed JWS-style.
//!
//! Either way a signature covers the playbook body plus its own metadata
//! and no other signature's `value`, so multiple parties sign independently
//! in any order.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;

use crate::canonical;
use crate::errors::{CacaoError, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::playbook::{codec, Playbook};
use crate::signature::Signature;
use crate::vocab;

/// Outcome of verifying one signature. The negative outcomes are normal
/// results, not errors: only undecodable input or unsupported algorithms
/// and keys fail the operation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The signature verifies under its declared algorithm.
    Valid,
    /// The cryptographic check failed: wrong key or altered content.
    Invalid,
    /// Legacy envelope only: the embedded canonical digest no longer
    /// matches the playbook body.
    ContentAltered,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid)
    }

    /// Promotes a negative outcome into the matching error, for callers
    /// that treat anything but [`Verification::Valid`] as fatal.
    pub fn require_valid(self) -> Result<()> {
        match self {
            Verification::Valid => Ok(()),
            Verification::Invalid => Err(CacaoError::InvalidSignature(
                "the signature does not verify over the current content".to_string(),
            )),
            Verification::ContentAltered => Err(CacaoError::ContentAltered),
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verification::Valid => f.write_str("valid"),
            Verification::Invalid => f.write_str("invalid"),
            Verification::ContentAltered => f.write_str("content altered"),
        }
    }
}

impl Playbook {
    /// Signs the playbook and appends the completed `signature` to its
    /// signature list, the only mutation. The caller pre-fills descriptive
    /// signature fields (signee, validity, related_to); `algorithm`, the
    /// digest fields and `value` are stamped here.
    pub fn sign(
        &mut self,
        algorithm: &str,
        key: &PrivateKey,
        mut signature: Signature,
    ) -> Result<()> {
        if !vocab::is_signing_method_valid(algorithm) {
            return Err(CacaoError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        signature.algorithm = Some(algorithm.to_string());
        signature.value = None;

        if is_legacy(self.spec_version.as_deref()) {
            self.sign_legacy(algorithm, key, signature)
        } else {
            self.sign_primary(algorithm, key, signature)
        }
    }

    fn sign_primary(
        &mut self,
        algorithm: &str,
        key: &PrivateKey,
        mut signature: Signature,
    ) -> Result<()> {
        signature.hash_algorithm = Some("sha-256".to_string());

        let mut working = self.clone();
        working.signatures = vec![signature.clone()];
        codec::clear_step_ids(&mut working);
        let canonical = canonical::to_vec(&working)?;
        let input = signing_input_hex(&canonical);

        let raw = key.sign(algorithm, input.as_bytes())?;
        signature.value = Some(URL_SAFE_NO_PAD.encode(raw));
        self.signatures.push(signature);
        debug!(algorithm, envelope = "primary", "signed playbook");
        Ok(())
    }

    fn sign_legacy(
        &mut self,
        algorithm: &str,
        key: &PrivateKey,
        mut signature: Signature,
    ) -> Result<()> {
        let mut working = self.clone();
        working.signatures = Vec::new();
        let canonical = canonical::to_vec(&working)?;
        signature.sha256 = Some(URL_SAFE_NO_PAD.encode(Sha256::digest(&canonical)));

        let canonical_signature = canonical::to_vec(&signature)?;
        let input = URL_SAFE_NO_PAD.encode(&canonical_signature);

        let raw = key.sign(algorithm, input.as_bytes())?;
        signature.value = Some(URL_SAFE_NO_PAD.encode(raw));
        self.signatures.push(signature);
        debug!(algorithm, envelope = "legacy", "signed playbook");
        Ok(())
    }

    /// Verifies the signature at `index` without mutating the playbook.
    ///
    /// With `key` the check runs against that key alone; without it, every
    /// embedded public key able to serve the declared algorithm is tried
    /// and one match suffices.
    pub fn verify_signature(&self, index: usize, key: Option<&PublicKey>) -> Result<Verification> {
        let Some(stored) = self.signatures.get(index) else {
            return Err(CacaoError::MalformedSignature(format!(
                "no signature at index {index}"
            )));
        };
        let algorithm = stored.algorithm.as_deref().ok_or_else(|| {
            CacaoError::MalformedSignature(
                "the signature does not declare an algorithm".to_string(),
            )
        })?;
        if !vocab::is_signing_method_valid(algorithm) {
            return Err(CacaoError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        let value = stored.value.as_deref().ok_or_else(|| {
            CacaoError::MalformedSignature("the signature value is missing".to_string())
        })?;
        let raw = URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|e| CacaoError::MalformedSignature(format!("signature value: {e}")))?;

        let candidate_keys: Vec<PublicKey> = match key {
            Some(k) => {
                ensure_key_serves_algorithm(algorithm, k)?;
                vec![k.clone()]
            }
            None => {
                if stored.public_keys.is_empty() {
                    return Err(CacaoError::MalformedSignature(
                        "the signature carries no public keys".to_string(),
                    ));
                }
                let parsed: Vec<PublicKey> = stored
                    .public_keys
                    .iter()
                    .map(|b64| PublicKey::from_spki_base64(b64))
                    .collect::<Result<_>>()?;
                let fitting: Vec<PublicKey> = parsed
                    .into_iter()
                    .filter(|k| key_serves_algorithm(algorithm, k))
                    .collect();
                if fitting.is_empty() {
                    return Err(CacaoError::UnsupportedAlgorithm(format!(
                        "none of the embedded public keys can serve {algorithm}"
                    )));
                }
                fitting
            }
        };

        let outcome = if is_legacy(self.spec_version.as_deref()) {
            self.verify_legacy(stored, algorithm, &raw, &candidate_keys)?
        } else {
            self.verify_primary(stored, algorithm, &raw, &candidate_keys)?
        };
        debug!(algorithm, index, %outcome, "verified playbook signature");
        Ok(outcome)
    }

    fn verify_primary(
        &self,
        stored: &Signature,
        algorithm: &str,
        raw: &[u8],
        keys: &[PublicKey],
    ) -> Result<Verification> {
        if let Some(hash) = stored.hash_algorithm.as_deref() {
            if hash != "sha-256" {
                return Err(CacaoError::UnsupportedAlgorithm(hash.to_string()));
            }
        }
        let mut candidate = stored.clone();
        candidate.value = None;

        let mut working = self.clone();
        working.signatures = vec![candidate];
        codec::clear_step_ids(&mut working);
        let canonical = canonical::to_vec(&working)?;
        let input = signing_input_hex(&canonical);

        for key in keys {
            if key.verify(algorithm, input.as_bytes(), raw)? {
                return Ok(Verification::Valid);
            }
        }
        Ok(Verification::Invalid)
    }

    fn verify_legacy(
        &self,
        stored: &Signature,
        algorithm: &str,
        raw: &[u8],
        keys: &[PublicKey],
    ) -> Result<Verification> {
        let Some(embedded_digest) = stored.sha256.as_deref() else {
            return Err(CacaoError::MalformedSignature(
                "the legacy signature does not carry the canonical digest".to_string(),
            ));
        };

        let mut working = self.clone();
        working.signatures = Vec::new();
        let canonical = canonical::to_vec(&working)?;
        let digest = URL_SAFE_NO_PAD.encode(Sha256::digest(&canonical));
        if digest != embedded_digest {
            return Ok(Verification::ContentAltered);
        }

        let mut candidate = stored.clone();
        candidate.value = None;
        let canonical_signature = canonical::to_vec(&candidate)?;
        let input = URL_SAFE_NO_PAD.encode(&canonical_signature);

        for key in keys {
            if key.verify(algorithm, input.as_bytes(), raw)? {
                return Ok(Verification::Valid);
            }
        }
        Ok(Verification::Invalid)
    }
}

fn is_legacy(spec_version: Option<&str>) -> bool {
    matches!(spec_version, Some("1.0") | Some("1.1"))
}

/// SHA-256 of the canonical bytes as lowercase hex text, the primary
/// envelope's signing input.
fn signing_input_hex(canonical: &[u8]) -> String {
    hex::encode(Sha256::digest(canonical))
}

fn key_serves_algorithm(algorithm: &str, key: &PublicKey) -> bool {
    matches!(
        (algorithm, key),
        ("RS256" | "RS384" | "RS512", PublicKey::Rsa(_))
            | ("ES256", PublicKey::P256(_))
            | ("ES384", PublicKey::P384(_))
            | ("ES512", PublicKey::P521(_))
    )
}

fn ensure_key_serves_algorithm(algorithm: &str, key: &PublicKey) -> Result<()> {
    if key_serves_algorithm(algorithm, key) {
        Ok(())
    } else {
        Err(CacaoError::UnsupportedAlgorithm(format!(
            "{algorithm} cannot be used with a {} key",
            key.kind()
        )))
    }
}
