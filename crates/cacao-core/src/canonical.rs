//! JSON Canonicalization Scheme (RFC 8785) for signing input construction.
//!
//! Uses `serde_jcs`, which guarantees lexicographic key ordering, no
//! whitespace between tokens, UTF-8 output and ECMAScript number
//! normalization. Two semantically equal documents canonicalize to the
//! same bytes, so their hashes agree.

use serde::Serialize;

use crate::errors::{CacaoError, Result};

/// Serializes `value` to canonical JSON bytes.
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_jcs::to_vec(value).map_err(|e| CacaoError::Canonicalization(e.to_string()))
}

/// Serializes `value` to a canonical JSON string.
pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    serde_jcs::to_string(value).map_err(|e| CacaoError::Canonicalization(e.to_string()))
}
