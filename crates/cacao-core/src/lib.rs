//! CACAO security playbook model, codec and signing.
//!
//! This crate implements the CACAO v2.0 document layer:
//!
//! - Typed playbook, workflow step, data marking and command objects
//! - A codec that keeps dictionary keys and inline ids consistent
//! - RFC 8785 canonicalization based signing and verification
//! - Field-level validation with a human readable trace

pub mod canonical;
pub mod common;
pub mod errors;
pub mod id;
pub mod keys;
pub mod markings;
pub mod playbook;
pub mod signature;
pub mod timestamp;
pub mod vocab;
pub mod workflow;

/// Specification version stamped into newly created objects.
pub const CURRENT_SPEC_VERSION: &str = "2.0";

// Convenience re-exports
pub use errors::{CacaoError, Result};
pub use keys::{PrivateKey, PublicKey};
pub use markings::{DataMarking, IepMarking, StatementMarking, TlpMarking};
pub use playbook::{Features, Playbook, Verification};
pub use signature::Signature;
pub use workflow::{CommandData, WorkflowStep};
