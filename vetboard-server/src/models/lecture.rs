//! Lecture video models

use serde::Deserialize;

use super::text::{optional_label, required_label};
use super::{Title, ValidationError};

/// Longest accepted lecture, in seconds (12 hours)
const MAX_DURATION_SECONDS: i32 = 12 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LectureSort {
    #[default]
    Latest,
    Popular,
}

impl LectureSort {
    pub fn parse(s: Option<&str>) -> Result<Self, ValidationError> {
        match s.map(str::trim).filter(|s| !s.is_empty()) {
            None | Some("latest") => Ok(Self::Latest),
            Some("popular") => Ok(Self::Popular),
            Some(other) => Err(ValidationError::InvalidVariant {
                field: "sort",
                value: other.to_owned(),
            }),
        }
    }

    pub fn order_by(&self) -> &'static str {
        match self {
            Self::Latest => "l.created_at DESC",
            Self::Popular => "l.view_count DESC, l.created_at DESC",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LectureListParams {
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LectureFilter {
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub sort: LectureSort,
}

impl TryFrom<LectureListParams> for LectureFilter {
    type Error = ValidationError;

    fn try_from(p: LectureListParams) -> Result<Self, Self::Error> {
        Ok(Self {
            category: optional_label("category", p.category.as_deref())?,
            keyword: optional_label("keyword", p.keyword.as_deref())?,
            sort: LectureSort::parse(p.sort.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureForm {
    pub title: String,
    pub instructor: String,
    pub category: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LectureDraft {
    pub title: Title,
    pub instructor: String,
    pub category: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
}

fn http_url(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "must be an http(s) URL",
        });
    }
    Ok(trimmed.to_owned())
}

impl LectureForm {
    pub fn validate(self) -> Result<LectureDraft, ValidationError> {
        if let Some(d) = self.duration_seconds {
            if !(0..=MAX_DURATION_SECONDS).contains(&d) {
                return Err(ValidationError::OutOfRange {
                    field: "duration",
                    min: 0,
                    max: MAX_DURATION_SECONDS as i64,
                });
            }
        }

        let thumbnail_url = match self.thumbnail_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(http_url("thumbnail url", url)?),
            _ => None,
        };

        Ok(LectureDraft {
            title: Title::new(&self.title)?,
            instructor: required_label("instructor", &self.instructor)?,
            category: required_label("category", &self.category)?,
            description: self.description.filter(|d| !d.trim().is_empty()),
            video_url: http_url("video url", &self.video_url)?,
            thumbnail_url,
            duration_seconds: self.duration_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> LectureForm {
        LectureForm {
            title: "반려견 치과 기초".into(),
            instructor: "이교수".into(),
            category: "dentistry".into(),
            video_url: "https://cdn.example.com/v/1.mp4".into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_lecture() {
        let draft = form().validate().unwrap();
        assert_eq!(draft.thumbnail_url, None);
    }

    #[test]
    fn rejects_non_http_video() {
        let mut f = form();
        f.video_url = "ftp://cdn/1.mp4".into();
        assert!(matches!(
            f.validate().unwrap_err(),
            ValidationError::InvalidFormat { field: "video url", .. }
        ));
    }

    #[test]
    fn rejects_absurd_duration() {
        let mut f = form();
        f.duration_seconds = Some(MAX_DURATION_SECONDS + 1);
        assert!(f.validate().is_err());
    }
}
