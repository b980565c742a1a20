//! Bookmark target kinds

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Things a user can bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkKind {
    Job,
    Transfer,
    Resume,
    Lecture,
    ForumPost,
}

impl BookmarkKind {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "job" => Ok(Self::Job),
            "transfer" => Ok(Self::Transfer),
            "resume" => Ok(Self::Resume),
            "lecture" => Ok(Self::Lecture),
            "forum_post" => Ok(Self::ForumPost),
            _ => Err(ValidationError::InvalidVariant {
                field: "bookmark kind",
                value: s.to_owned(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Transfer => "transfer",
            Self::Resume => "resume",
            Self::Lecture => "lecture",
            Self::ForumPost => "forum_post",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trip() {
        for kind in [
            BookmarkKind::Job,
            BookmarkKind::Transfer,
            BookmarkKind::Resume,
            BookmarkKind::Lecture,
            BookmarkKind::ForumPost,
        ] {
            assert_eq!(BookmarkKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&BookmarkKind::ForumPost).unwrap();
        assert_eq!(json, "\"forum_post\"");
    }
}
