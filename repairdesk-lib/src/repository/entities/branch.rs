use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An independently operated service-center location. Each branch owns its
/// own inventory, service entries, and bill sequence; the snapshot tracks at
/// most one selected branch at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branch {
    pub id: String,
    pub name: String,
    /// Short branch code, also the default bill-number prefix.
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
}

impl Default for Branch {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            code: String::new(),
            address: None,
            phone: None,
            manager: None,
        }
    }
}

impl Branch {
    pub fn new(name: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            ..Self::default()
        }
    }
}
