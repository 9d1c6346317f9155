#![allow(missing_docs)]

pub mod answers;
pub mod answers_schema;
pub mod external;
pub mod render;
pub mod spec;
pub mod submission;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerSet, AnswerValue};
pub use answers_schema::generate as answers_schema;
pub use external::{
    BasesResponse, DiscoveredField, DiscoveryError, ExternalTable, TableNames, TablesResponse,
    base_and_table_names, find_table, supported_fields,
};
pub use render::{
    InputKind, RenderPayload, RenderProgress, RenderQuestion, RenderStatus, build_render_payload,
    render_json_ui, render_text,
};
pub use spec::{
    FieldType, FormDefinition, FormDraft, Question, RuleSet, SUPPORTED_FIELD_TYPES, SelectOption,
    TableRef, VisibilityRule,
};
pub use submission::{MappedSubmission, RecordPayload, map_submission};
pub use validate::{ValidationError, revalidate, validate_form};
pub use visibility::{VisibilityMap, is_visible, resolve_visibility, retain_visible, visible_questions};
