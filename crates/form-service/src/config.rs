use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "https://api.airtable.com/v0";

/// What happens to answers of questions that are hidden at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenAnswerPolicy {
    /// Hidden answers are dropped before the payload is built.
    #[default]
    Clear,
    /// Hidden answers are submitted like any other.
    Retain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub hidden_answers: HiddenAnswerPolicy,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            hidden_answers: HiddenAnswerPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// Parses a JSON config; blank input yields the defaults.
    pub fn from_json(config_json: &str) -> Result<Self, serde_json::Error> {
        if config_json.trim().is_empty() {
            Ok(Self::default())
        } else {
            serde_json::from_str(config_json)
        }
    }
}
