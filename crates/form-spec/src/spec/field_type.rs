use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Question kinds a form can carry.
///
/// Each kind maps to exactly one field type of the external table schema;
/// external fields of any other type are not offered as questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    ShortText,
    LongText,
    SingleSelect,
    MultiSelect,
    AttachmentUrl,
}

/// Every supported kind, in the order the table schema lists them.
pub const SUPPORTED_FIELD_TYPES: [FieldType; 5] = [
    FieldType::ShortText,
    FieldType::LongText,
    FieldType::SingleSelect,
    FieldType::MultiSelect,
    FieldType::AttachmentUrl,
];

impl FieldType {
    /// Name of this kind in the external schema vocabulary.
    pub fn external_name(self) -> &'static str {
        match self {
            FieldType::ShortText => "singleLineText",
            FieldType::LongText => "multilineText",
            FieldType::SingleSelect => "singleSelect",
            FieldType::MultiSelect => "multipleSelects",
            FieldType::AttachmentUrl => "multipleAttachments",
        }
    }

    /// Resolves an external field type, or `None` when it is unsupported.
    pub fn from_external(name: &str) -> Option<Self> {
        SUPPORTED_FIELD_TYPES
            .into_iter()
            .find(|kind| kind.external_name() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::ShortText => "short_text",
            FieldType::LongText => "long_text",
            FieldType::SingleSelect => "single_select",
            FieldType::MultiSelect => "multi_select",
            FieldType::AttachmentUrl => "attachment_url",
        }
    }

    /// Select kinds must carry at least one option.
    pub fn requires_options(self) -> bool {
        matches!(self, FieldType::SingleSelect | FieldType::MultiSelect)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_vocabulary_round_trips() {
        for kind in SUPPORTED_FIELD_TYPES {
            assert_eq!(FieldType::from_external(kind.external_name()), Some(kind));
        }
    }

    #[test]
    fn unsupported_external_types_are_rejected() {
        assert_eq!(FieldType::from_external("formula"), None);
        assert_eq!(FieldType::from_external("number"), None);
        assert_eq!(FieldType::from_external("short_text"), None);
    }

    #[test]
    fn only_selects_require_options() {
        assert!(FieldType::SingleSelect.requires_options());
        assert!(FieldType::MultiSelect.requires_options());
        assert!(!FieldType::ShortText.requires_options());
        assert!(!FieldType::AttachmentUrl.requires_options());
    }
}
