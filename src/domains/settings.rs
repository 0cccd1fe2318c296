//! App settings declared to the host.

use serde::Serialize;

use crate::domains::widget::form::FieldType;

pub const DEFAULT_UPVOTES: &str = "default-upvotes";
pub const REDDIT_API_NAME: &str = "reddit-api-name";
pub const REDDIT_API_KEY: &str = "reddit-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingScope {
    App,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingDefinition {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub scope: SettingScope,
    pub is_secret: bool,
}

pub fn setting_definitions() -> Vec<SettingDefinition> {
    vec![
        SettingDefinition {
            name: DEFAULT_UPVOTES,
            label: "Default $UPVs that users have at first",
            field_type: FieldType::Number,
            scope: SettingScope::App,
            is_secret: false,
        },
        SettingDefinition {
            name: REDDIT_API_NAME,
            label: "Reddit API name",
            field_type: FieldType::String,
            scope: SettingScope::App,
            is_secret: true,
        },
        SettingDefinition {
            name: REDDIT_API_KEY,
            label: "Reddit API key",
            field_type: FieldType::String,
            scope: SettingScope::App,
            is_secret: true,
        },
    ]
}
