//! User roles and profile form

use serde::{Deserialize, Serialize};

use super::text::{optional_label, required_label};
use super::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Unknown role strings fall back to `User`, never to `Admin`.
    pub fn from_db(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Profile fields a user may edit about themselves
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDraft {
    pub name: String,
    pub phone: Option<String>,
}

impl ProfileForm {
    pub fn validate(self) -> Result<ProfileDraft, ValidationError> {
        Ok(ProfileDraft {
            name: required_label("name", &self.name)?,
            phone: optional_label("phone", self.phone.as_deref())?,
        })
    }
}
