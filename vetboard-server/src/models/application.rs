//! Job application models

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Maximum cover letter length
const MAX_COVER_LETTER_LEN: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ValidationError::InvalidVariant {
                field: "application status",
                value: s.to_owned(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Statuses a job owner may set. `pending` is only ever the initial state.
    pub fn owner_settable(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Optional cover letter, blank becomes `None`
pub fn cover_letter(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.chars().count() > MAX_COVER_LETTER_LEN => Err(ValidationError::TooLong {
            field: "cover letter",
            max: MAX_COVER_LETTER_LEN,
        }),
        Some(v) => Ok(Some(v.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_cannot_reset_to_pending() {
        assert!(!ApplicationStatus::Pending.owner_settable());
        assert!(ApplicationStatus::Accepted.owner_settable());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            ApplicationStatus::parse("Rejected").unwrap(),
            ApplicationStatus::Rejected
        );
    }

    #[test]
    fn cover_letter_limits() {
        assert_eq!(cover_letter(Some("   ")).unwrap(), None);
        assert!(cover_letter(Some(&"가".repeat(5001))).is_err());
    }
}
