//! Community selection form.

use serde::Serialize;
use serde_json::Value;
use shared::utils::{sanitize_text, validation::normalize_community_name};
use std::collections::HashMap;

pub const COMMUNITY_FORM_ID: &str = "community";
pub const COMMUNITY_FIELD: &str = "subreddit";

pub type FormValues = HashMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    pub description: String,
    pub fields: Vec<FormField>,
}

pub fn community_selection_form() -> FormSpec {
    FormSpec {
        id: COMMUNITY_FORM_ID.into(),
        title: "Select a Subreddit".into(),
        description: "Enter the name of the subreddit you want to invest.".into(),
        fields: vec![FormField {
            name: COMMUNITY_FIELD.into(),
            label: "Subreddit Name".into(),
            field_type: FieldType::String,
        }],
    }
}

/// Community name from submitted values, `None` when missing or blank.
pub fn extract_community_name(values: &FormValues) -> Option<String> {
    let raw = match values.get(COMMUNITY_FIELD)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let name = normalize_community_name(&sanitize_text(&raw));
    (!name.is_empty()).then_some(name)
}
