//! Shapes of the external table API's metadata responses, and how their
//! fields turn into questions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::{
    field_type::FieldType,
    question::{Question, SelectOption},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("base '{0}' not found")]
    BaseNotFound(String),
    #[error("table '{0}' not found")]
    TableNotFound(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasesResponse {
    #[serde(default)]
    pub bases: Vec<ExternalBase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalBase {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablesResponse {
    #[serde(default)]
    pub tables: Vec<ExternalTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTable {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_field_id: Option<String>,
    #[serde(default)]
    pub fields: Vec<ExternalField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ExternalFieldOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalFieldOptions {
    #[serde(default)]
    pub choices: Vec<ExternalChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalChoice {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// An external field whose type can back a question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredField {
    pub field_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl DiscoveredField {
    /// Question bound to this field, labelled with the field name.
    pub fn to_question(&self) -> Question {
        Question {
            field_id: self.field_id.clone(),
            label: self.name.clone(),
            kind: self.kind,
            options: if self.kind.requires_options() {
                self.options.clone()
            } else {
                Vec::new()
            },
        }
    }
}

/// Base and table display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNames {
    pub base_name: String,
    pub table_name: String,
}

/// Fields of `table` that map onto a supported question type, in table order.
pub fn supported_fields(table: &ExternalTable) -> Vec<DiscoveredField> {
    table
        .fields
        .iter()
        .filter_map(|field| {
            let Some(kind) = FieldType::from_external(&field.kind) else {
                tracing::trace!(field_id = %field.id, kind = %field.kind, "skipping unsupported field");
                return None;
            };
            let options = field
                .options
                .as_ref()
                .map(|options| {
                    options
                        .choices
                        .iter()
                        .map(|choice| SelectOption {
                            id: choice.id.clone(),
                            name: choice.name.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some(DiscoveredField {
                field_id: field.id.clone(),
                name: field.name.clone(),
                kind,
                options,
            })
        })
        .collect()
}

pub fn find_table<'a>(
    tables: &'a TablesResponse,
    table_id: &str,
) -> Result<&'a ExternalTable, DiscoveryError> {
    tables
        .tables
        .iter()
        .find(|table| table.id == table_id)
        .ok_or_else(|| DiscoveryError::TableNotFound(table_id.to_string()))
}

pub fn base_and_table_names(
    bases: &BasesResponse,
    tables: &TablesResponse,
    base_id: &str,
    table_id: &str,
) -> Result<TableNames, DiscoveryError> {
    let base = bases
        .bases
        .iter()
        .find(|base| base.id == base_id)
        .ok_or_else(|| DiscoveryError::BaseNotFound(base_id.to_string()))?;
    let table = find_table(tables, table_id)?;
    Ok(TableNames {
        base_name: base.name.clone(),
        table_name: table.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tables() -> TablesResponse {
        serde_json::from_value(json!({
            "tables": [{
                "id": "tblPeople",
                "name": "People",
                "primaryFieldId": "fldName",
                "fields": [
                    { "id": "fldName", "name": "Name", "type": "singleLineText" },
                    { "id": "fldAge", "name": "Age", "type": "number", "options": { "precision": 0 } },
                    {
                        "id": "fldRole",
                        "name": "Role",
                        "type": "singleSelect",
                        "options": { "choices": [
                            { "id": "selEng", "name": "Engineer", "color": "blueLight2" },
                            { "id": "selMgr", "name": "Manager", "color": "redLight2" }
                        ]}
                    },
                    { "id": "fldPhoto", "name": "Photo", "type": "multipleAttachments", "options": { "isReversed": false } }
                ],
                "views": []
            }]
        }))
        .expect("tables response")
    }

    #[test]
    fn unsupported_fields_are_excluded() {
        let tables = tables();
        let table = find_table(&tables, "tblPeople").expect("table");
        let fields = supported_fields(table);
        let ids: Vec<_> = fields.iter().map(|field| field.field_id.as_str()).collect();
        assert_eq!(ids, vec!["fldName", "fldRole", "fldPhoto"]);
        assert_eq!(fields[1].kind, FieldType::SingleSelect);
        assert_eq!(fields[1].options.len(), 2);
        assert_eq!(fields[2].kind, FieldType::AttachmentUrl);
    }

    #[test]
    fn discovered_fields_become_labelled_questions() {
        let tables = tables();
        let fields = supported_fields(&tables.tables[0]);
        let question = fields[1].to_question();
        assert_eq!(question.label, "Role");
        assert_eq!(question.option_names().collect::<Vec<_>>(), vec!["Engineer", "Manager"]);
    }

    #[test]
    fn names_resolve_or_report_missing() {
        let bases: BasesResponse = serde_json::from_value(json!({
            "bases": [{ "id": "appHR", "name": "HR", "permissionLevel": "create" }]
        }))
        .expect("bases response");
        let tables = tables();

        let names = base_and_table_names(&bases, &tables, "appHR", "tblPeople").expect("names");
        assert_eq!(names.base_name, "HR");
        assert_eq!(names.table_name, "People");

        assert_eq!(
            base_and_table_names(&bases, &tables, "appX", "tblPeople"),
            Err(DiscoveryError::BaseNotFound("appX".into()))
        );
        assert_eq!(
            base_and_table_names(&bases, &tables, "appHR", "tblX"),
            Err(DiscoveryError::TableNotFound("tblX".into()))
        );
    }
}
