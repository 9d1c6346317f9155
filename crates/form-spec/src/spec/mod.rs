pub mod field_type;
pub mod form;
pub mod question;
pub mod rule;

pub use field_type::{FieldType, SUPPORTED_FIELD_TYPES};
pub use form::{FormDefinition, FormDraft, TableRef};
pub use question::{Question, SelectOption};
pub use rule::{RuleSet, VisibilityRule};
