//! Error types shared across decode, validation, signing and verification.

/// Errors raised while decoding, mutating, signing or verifying a playbook.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacaoError {
    #[error("unknown {category} value: {value}")]
    UnknownVariant { category: &'static str, value: String },

    #[error("schema mismatch at {location}: {reason}")]
    SchemaMismatch { location: String, reason: String },

    #[error("type collision for key {key}: embedded id {embedded} differs")]
    TypeCollision { key: String, embedded: String },

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("signature invalid: {0}")]
    InvalidSignature(String),

    #[error("playbook content altered after signing")]
    ContentAltered,

    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl CacaoError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownVariant { .. }
            | Self::SchemaMismatch { .. }
            | Self::TypeCollision { .. } => 2,
            Self::UnsupportedAlgorithm(_) | Self::UnsupportedKeyType(_) => 3,
            Self::InvalidSignature(_) | Self::ContentAltered => 4,
            Self::MalformedSignature(_)
            | Self::Canonicalization(_)
            | Self::InvariantViolation(_) => 1,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CacaoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_group_by_failure_class() {
        assert_eq!(
            CacaoError::UnknownVariant { category: "workflow step type", value: "noop".into() }
                .exit_code(),
            2
        );
        assert_eq!(CacaoError::UnsupportedAlgorithm("HS256".into()).exit_code(), 3);
        assert_eq!(CacaoError::InvalidSignature("mismatch".into()).exit_code(), 4);
        assert_eq!(CacaoError::ContentAltered.exit_code(), 4);
        assert_eq!(CacaoError::MalformedSignature("bad base64".into()).exit_code(), 1);
    }

    #[test]
    fn display_includes_variant_context() {
        let err = CacaoError::UnknownVariant { category: "command type", value: "telnet".into() };
        assert_eq!(err.to_string(), "unknown command type value: telnet");

        let err = CacaoError::TypeCollision {
            key: "step--11f2f155-a296-4c4e-b1a2-7e213e350f67".into(),
            embedded: "step--99999999-a296-4c4e-b1a2-7e213e350f67".into(),
        };
        assert!(err.to_string().contains("type collision"));
    }
}
