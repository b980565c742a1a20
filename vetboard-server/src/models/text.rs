//! Validated text fields shared by listings, posts, and messages

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for titles (characters)
const MAX_TITLE_LEN: usize = 200;

/// Maximum length for free-form bodies (64KB)
const MAX_BODY_LEN: usize = 65536;

/// Maximum length for short labels (names, regions, positions)
const MAX_LABEL_LEN: usize = 100;

/// Maximum length for email addresses
const MAX_EMAIL_LEN: usize = 254;

/// Deliberately loose: one `@`, no whitespace, a dot in the domain part.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Validated title (job, transfer, forum post, lecture, message subject)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Create a new title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 200 characters
    ///
    /// # Example
    /// ```
    /// use vetboard_server::models::Title;
    ///
    /// assert!(Title::new("수의사 구인").is_ok());
    /// assert!(Title::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }

        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated free-form body (post content, description, message text)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body(String);

impl Body {
    /// Create non-empty body content, max 64KB.
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field });
        }

        if s.len() > MAX_BODY_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_BODY_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Validated email address, normalised to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let normalised = s.trim().to_lowercase();

        if normalised.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }

        if normalised.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        if !EMAIL_RE.is_match(&normalised) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@domain.tld",
            });
        }

        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trim an optional label; blank becomes `None`.
///
/// Fails when the trimmed value exceeds the label limit.
pub fn optional_label(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.chars().count() > MAX_LABEL_LEN => Err(ValidationError::TooLong {
            field,
            max: MAX_LABEL_LEN,
        }),
        Some(v) => Ok(Some(v.to_owned())),
    }
}

/// Required short label (region, position, hospital name).
pub fn required_label(field: &'static str, value: &str) -> Result<String, ValidationError> {
    optional_label(field, Some(value))?.ok_or(ValidationError::Empty { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        let title = Title::new("  동물병원 양도  ").unwrap();
        assert_eq!(title.as_str(), "동물병원 양도");
    }

    #[test]
    fn title_counts_characters_not_bytes() {
        // 200 Hangul syllables are 600 bytes but still a valid title
        let title = "가".repeat(200);
        assert!(Title::new(&title).is_ok());

        let too_long = "가".repeat(201);
        let err = Title::new(&too_long).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 200, .. }));
    }

    #[test]
    fn body_rejects_blank() {
        let err = Body::new("content", " \n\t").unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "content" });
    }

    #[test]
    fn body_max_length() {
        let body = "a".repeat(65536);
        assert!(Body::new("content", &body).is_ok());

        let too_long = "a".repeat(65537);
        assert!(Body::new("content", &too_long).is_err());
    }

    #[test]
    fn email_normalises_case() {
        let email = Email::new("  Vet@Clinic.KR ").unwrap();
        assert_eq!(email.as_str(), "vet@clinic.kr");
    }

    #[test]
    fn email_rejects_garbage() {
        assert!(matches!(
            Email::new("not-an-email").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            Email::new("a b@c.d").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn optional_label_blank_is_none() {
        assert_eq!(optional_label("region", Some("   ")).unwrap(), None);
        assert_eq!(optional_label("region", None).unwrap(), None);
        assert_eq!(
            optional_label("region", Some(" 서울 ")).unwrap(),
            Some("서울".to_owned())
        );
    }

    #[test]
    fn required_label_rejects_blank() {
        let err = required_label("region", "").unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "region" });
    }
}
