//! The digital signature object embedded in a playbook's `signatures` list.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{is_false, ExtensionBag};

/// Captures one digital signature over a playbook.
///
/// This is a superset of both envelope generations: `sha256` carries the
/// canonical playbook digest for the legacy (1.x) envelope and stays absent
/// for the primary one, `hash_algorithm` is only written by the primary
/// envelope. `related_version` records the playbook's `modified` value at
/// signing time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Base64 DER SubjectPublicKeyInfo entries, standard alphabet, no padding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<String>,
    /// Signature bytes, base64url, no padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

impl Signature {
    /// Creates a signature for the current document generation: type `jss`,
    /// a fresh id, created/modified stamped at millisecond precision.
    pub fn new() -> Self {
        let now = crate::timestamp::now_milli();
        Signature {
            object_type: Some("jss".to_string()),
            spec_version: Some(crate::CURRENT_SPEC_VERSION.to_string()),
            id: Some(format!("jss--{}", Uuid::new_v4())),
            created: Some(now.clone()),
            modified: Some(now),
            ..Default::default()
        }
    }
}
