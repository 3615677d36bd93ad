//! CACAO identifiers of the form `<object-type>--<uuid>`.

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::errors::{CacaoError, Result};
use crate::vocab::{self, Category};

lazy_static! {
    /// UUID with version nibble 4 or 5 and RFC 4122 variant bits.
    static ref UUID_RE: Regex = Regex::new(
        r"^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[45][a-fA-F0-9]{3}-[89aAbB][a-fA-F0-9]{3}-[a-fA-F0-9]{12}$"
    )
    .unwrap();
}

/// Creates a new identifier for `object_type` with a random UUIDv4 suffix.
///
/// Fails when `object_type` is not a known identifier prefix.
pub fn new_id(object_type: &str) -> Result<String> {
    if !vocab::is_member(Category::IdPrefix, object_type) {
        return Err(CacaoError::UnknownVariant {
            category: Category::IdPrefix.label(),
            value: object_type.to_string(),
        });
    }
    Ok(format!("{object_type}--{}", Uuid::new_v4()))
}

/// Returns the object-type prefix of `id`, if the separator is present.
pub fn prefix(id: &str) -> Option<&str> {
    id.split_once("--").map(|(p, _)| p)
}

/// Returns true when `id` is `<known-prefix>--<well-formed uuid>`.
pub fn is_valid(id: &str) -> bool {
    match id.split_once("--") {
        Some((p, suffix)) => {
            vocab::is_member(Category::IdPrefix, p) && UUID_RE.is_match(suffix)
        }
        None => false,
    }
}
