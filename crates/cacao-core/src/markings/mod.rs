//! Data markings: handling and sharing restrictions attached to a playbook.
//!
//! Marking definitions are immutable once referenced. A changed marking must
//! receive a new identifier instead of mutating the stored object, because
//! multiple playbooks may reference the same marking id.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::common::{take_discriminator, ExtensionBag, ExternalReference};
use crate::errors::{CacaoError, Result};
use crate::vocab::Category;

const TLP_CREATED_BY: &str = "identity--5abe695c-7bd5-4c31-8824-2528696cdbf1";
const TLP_CREATED: &str = "2022-10-01T00:00:00.000Z";

/// Properties shared by every data marking type. Markings carry no
/// `modified` timestamp; they are replaced, not edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkingCommon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "crate::common::is_false")]
    pub revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_references: Vec<ExternalReference>,
}

/// FIRST TLP 2.0 marking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TlpMarking {
    #[serde(flatten)]
    pub common: MarkingCommon,
    /// One of `CLEAR`, `GREEN`, `AMBER`, `AMBER+STRICT`, `RED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlp_level: Option<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

impl TlpMarking {
    fn well_known(id: &str, level: &str) -> Self {
        Self {
            common: MarkingCommon {
                id: Some(id.to_string()),
                created_by: Some(TLP_CREATED_BY.to_string()),
                created: Some(TLP_CREATED.to_string()),
                ..Default::default()
            },
            tlp_level: Some(level.to_string()),
            extra: ExtensionBag::new(),
        }
    }

    pub fn clear() -> Self {
        Self::well_known("marking-tlp--94868c89-83c2-464b-929b-a1a8aa3c8487", "CLEAR")
    }

    pub fn green() -> Self {
        Self::well_known("marking-tlp--bab4a63c-aed9-4cf5-a766-dfca5abac2bb", "GREEN")
    }

    pub fn amber() -> Self {
        Self::well_known("marking-tlp--55d920b0-5e8b-4f79-9ee9-91f868d9b421", "AMBER")
    }

    pub fn amber_strict() -> Self {
        Self::well_known("marking-tlp--939a9414-2ddd-4d32-a0cd-375ea402b003", "AMBER+STRICT")
    }

    pub fn red() -> Self {
        Self::well_known("marking-tlp--e828b379-4e03-4974-9ac4-e53a884c97c1", "RED")
    }
}

/// Free-text marking statement (copyright, terms of use, and the like).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementMarking {
    #[serde(flatten)]
    pub common: MarkingCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

/// FIRST IEP 2.0 marking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IepMarking {
    #[serde(flatten)]
    pub common: MarkingCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iep_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypt_in_transit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permitted_actions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_party_notifications: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmodified_resale: Option<String>,
    #[serde(flatten)]
    pub extra: ExtensionBag,
}

/// A data marking definition, discriminated by the wire `type` property.
#[derive(Debug, Clone, PartialEq)]
pub enum DataMarking {
    Tlp(TlpMarking),
    Statement(StatementMarking),
    Iep(IepMarking),
}

impl DataMarking {
    /// The wire discriminator for this marking.
    pub fn marking_type(&self) -> &'static str {
        match self {
            Self::Tlp(_) => "marking-tlp",
            Self::Statement(_) => "marking-statement",
            Self::Iep(_) => "marking-iep",
        }
    }

    pub fn common(&self) -> &MarkingCommon {
        match self {
            Self::Tlp(m) => &m.common,
            Self::Statement(m) => &m.common,
            Self::Iep(m) => &m.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut MarkingCommon {
        match self {
            Self::Tlp(m) => &mut m.common,
            Self::Statement(m) => &mut m.common,
            Self::Iep(m) => &mut m.common,
        }
    }

    /// Unmodeled properties captured during decode.
    pub fn extra(&self) -> &ExtensionBag {
        match self {
            Self::Tlp(m) => &m.extra,
            Self::Statement(m) => &m.extra,
            Self::Iep(m) => &m.extra,
        }
    }
}

impl Serialize for DataMarking {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let fields = match self {
            Self::Tlp(m) => serde_json::to_value(m),
            Self::Statement(m) => serde_json::to_value(m),
            Self::Iep(m) => serde_json::to_value(m),
        }
        .map_err(serde::ser::Error::custom)?;

        let mut map = serde_json::Map::new();
        map.insert("type".to_string(), Value::String(self.marking_type().to_string()));
        if let Value::Object(fields) = fields {
            map.extend(fields);
        }
        map.serialize(serializer)
    }
}

/// Decodes one data marking from its JSON object form. `location` names
/// the spot in the document for error reporting, usually the map key.
pub fn decode_marking(location: &str, mut map: serde_json::Map<String, Value>) -> Result<DataMarking> {
    let marking_type = take_discriminator(location, &mut map)?;
    let schema = |e: serde_json::Error| CacaoError::SchemaMismatch {
        location: location.to_string(),
        reason: e.to_string(),
    };
    let marking = match marking_type.as_str() {
        "marking-tlp" => {
            DataMarking::Tlp(serde_json::from_value(Value::Object(map)).map_err(schema)?)
        }
        "marking-statement" => {
            DataMarking::Statement(serde_json::from_value(Value::Object(map)).map_err(schema)?)
        }
        "marking-iep" => {
            DataMarking::Iep(serde_json::from_value(Value::Object(map)).map_err(schema)?)
        }
        other => {
            return Err(CacaoError::UnknownVariant {
                category: Category::DataMarkingType.label(),
                value: other.to_string(),
            })
        }
    };
    Ok(marking)
}
