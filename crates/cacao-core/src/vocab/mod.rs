//! Closed vocabularies from the CACAO specification.
//!
//! Every table is baked in at build time. Values not listed here are
//! rejected by the codec and the validator, never silently accepted.

/// Object types that may appear as an identifier prefix.
pub const OBJECT_TYPES: &[&str] = &[
    "playbook",
    "playbook-template",
    "signature",
    "step",
    "target",
    "extension-definition",
    "marking-definition",
    "identity",
];

/// Officially supported playbook types.
pub const PLAYBOOK_TYPES: &[&str] = &[
    "attack",
    "detection",
    "engagement",
    "investigation",
    "mitigation",
    "notification",
    "prevention",
    "remediation",
];

/// Industry sectors a playbook may declare.
pub const INDUSTRY_SECTORS: &[&str] = &[
    "aerospace",
    "aviation",
    "agriculture",
    "automotive",
    "biotechnology",
    "chemical",
    "commercial",
    "consulting",
    "construction",
    "cosmetics",
    "critical-infrastructure",
    "dams",
    "defense",
    "education",
    "emergency-services",
    "energy",
    "non-renewable-energy",
    "renewable-energy",
    "media",
    "financial",
    "food",
    "gambling",
    "government",
    "local-government",
    "national-government",
    "regional-government",
    "public-services",
    "healthcare",
    "information-communications-technology",
    "electronics-hardware",
    "software",
    "telecommunications",
    "legal-services",
    "lodging",
    "manufacturing",
    "maritime",
    "metals",
    "mining",
    "non-profit",
    "humanitarian-aid",
    "human-rights",
    "nuclear",
    "petroleum",
    "pharmaceuticals",
    "research",
    "transportation",
    "logistics-shipping",
    "utilities",
    "video-game",
    "water",
];

/// Workflow step types (the `type` discriminator of a step).
pub const WORKFLOW_STEP_TYPES: &[&str] = &[
    "start",
    "end",
    "action",
    "playbook-action",
    "parallel",
    "if-condition",
    "while-condition",
    "switch-condition",
];

/// Command data types carried by action steps.
pub const COMMAND_TYPES: &[&str] = &[
    "manual",
    "bash",
    "http-api",
    "ssh",
    "caldera-cmd",
    "elastic",
    "jupyter",
    "kestrel",
    "openc2-json",
    "sigma",
    "yara",
];

/// Data marking types (the `type` discriminator of a marking definition).
pub const DATA_MARKING_TYPES: &[&str] = &["marking-statement", "marking-tlp", "marking-iep"];

/// Signing methods supported by the signer and verifier.
pub const SIGNING_METHODS: &[&str] = &["RS256", "RS384", "RS512", "ES256", "ES384", "ES512"];

/// Variable data types.
pub const VARIABLE_TYPES: &[&str] = &[
    "bool",
    "dictionary",
    "float",
    "hexstring",
    "integer",
    "ipv4-addr",
    "ipv6-addr",
    "long",
    "mac-addr",
    "md5-hash",
    "sha256-hash",
    "string",
    "uri",
    "uuid",
];

/// TLP v2 levels for `marking-tlp` definitions.
pub const TLP_LEVELS: &[&str] = &["CLEAR", "GREEN", "AMBER", "AMBER+STRICT", "RED"];

/// Known specification versions.
pub const SPEC_VERSIONS: &[&str] = &["1.0", "1.1", "2.0"];

/// A vocabulary category, used by the codec when reporting unknown values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    ObjectType,
    PlaybookType,
    IndustrySector,
    WorkflowStepType,
    CommandType,
    DataMarkingType,
    SigningMethod,
    VariableType,
    TlpLevel,
    SpecVersion,
    IdPrefix,
}

impl Category {
    /// The table backing this category.
    ///
    /// `IdPrefix` has no single table; membership is the union of object,
    /// workflow step and data marking types plus `jss`, checked in
    /// [`is_member`].
    pub fn table(self) -> &'static [&'static str] {
        match self {
            Self::ObjectType => OBJECT_TYPES,
            Self::PlaybookType => PLAYBOOK_TYPES,
            Self::IndustrySector => INDUSTRY_SECTORS,
            Self::WorkflowStepType => WORKFLOW_STEP_TYPES,
            Self::CommandType => COMMAND_TYPES,
            Self::DataMarkingType => DATA_MARKING_TYPES,
            Self::SigningMethod => SIGNING_METHODS,
            Self::VariableType => VARIABLE_TYPES,
            Self::TlpLevel => TLP_LEVELS,
            Self::SpecVersion => SPEC_VERSIONS,
            Self::IdPrefix => &[],
        }
    }

    /// Human-readable label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::ObjectType => "object type",
            Self::PlaybookType => "playbook type",
            Self::IndustrySector => "industry sector",
            Self::WorkflowStepType => "workflow step type",
            Self::CommandType => "command type",
            Self::DataMarkingType => "data marking type",
            Self::SigningMethod => "signing method",
            Self::VariableType => "variable type",
            Self::TlpLevel => "tlp level",
            Self::SpecVersion => "spec version",
            Self::IdPrefix => "identifier prefix",
        }
    }
}

/// Returns true when `value` is a member of `category`.
pub fn is_member(category: Category, value: &str) -> bool {
    match category {
        Category::IdPrefix => {
            value == "jss"
                || OBJECT_TYPES.contains(&value)
                || WORKFLOW_STEP_TYPES.contains(&value)
                || DATA_MARKING_TYPES.contains(&value)
        }
        _ => category.table().contains(&value),
    }
}

pub fn is_object_type_valid(s: &str) -> bool {
    is_member(Category::ObjectType, s)
}

pub fn is_playbook_type_valid(s: &str) -> bool {
    is_member(Category::PlaybookType, s)
}

pub fn is_industry_sector_valid(s: &str) -> bool {
    is_member(Category::IndustrySector, s)
}

pub fn is_workflow_step_type_valid(s: &str) -> bool {
    is_member(Category::WorkflowStepType, s)
}

pub fn is_command_type_valid(s: &str) -> bool {
    is_member(Category::CommandType, s)
}

pub fn is_data_marking_type_valid(s: &str) -> bool {
    is_member(Category::DataMarkingType, s)
}

pub fn is_signing_method_valid(s: &str) -> bool {
    is_member(Category::SigningMethod, s)
}

pub fn is_variable_type_valid(s: &str) -> bool {
    is_member(Category::VariableType, s)
}

pub fn is_tlp_level_valid(s: &str) -> bool {
    is_member(Category::TlpLevel, s)
}

pub fn is_spec_version_valid(s: &str) -> bool {
    is_member(Category::SpecVersion, s)
}
