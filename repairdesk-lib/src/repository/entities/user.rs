use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Id of the built-in administrator account. It is seeded into every fresh
/// snapshot and can never be deleted.
pub const ADMIN_USER_ID: &str = "admin";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// An operator account. Passwords are stored and compared in plain text,
/// matching the single-trusted-device scope of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            username: String::new(),
            password: String::new(),
            role: Role::default(),
            branch_id: None,
            created_at: Utc::now(),
            last_login: None,
        }
    }
}

impl User {
    /// The administrator account present in every fresh snapshot.
    pub(crate) fn builtin_admin() -> Self {
        Self {
            id: ADMIN_USER_ID.to_string(),
            name: "Administrator".to_string(),
            username: "admin".to_string(),
            password: "4567".to_string(),
            role: Role::Admin,
            ..Self::default()
        }
    }

    pub fn is_builtin_admin(&self) -> bool {
        self.id == ADMIN_USER_ID
    }
}
