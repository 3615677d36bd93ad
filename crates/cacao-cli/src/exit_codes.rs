//! Unified exit codes for the cacao CLI.
//! These codes are part of the public contract and stay aligned with
//! `CacaoError::exit_code`.

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1; // Operation ran, outcome negative (invalid document)
pub const DECODE_ERROR: i32 = 2; // Input could not be read or decoded
pub const UNSUPPORTED: i32 = 3; // Algorithm or key type not supported
pub const SIGNATURE_INVALID: i32 = 4; // Signature did not verify or content altered
