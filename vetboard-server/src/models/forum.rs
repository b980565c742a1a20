//! Forum post and comment models

use serde::Deserialize;

use super::text::optional_label;
use super::{Body, Title, ValidationError};

/// Maximum length for a comment
const MAX_COMMENT_LEN: usize = 2000;

/// Boards a post can live in
const CATEGORIES: &[&str] = &["free", "clinical", "career", "qna", "notice"];

/// Validated forum category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForumCategory(&'static str);

impl ForumCategory {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let lowered = s.trim().to_lowercase();
        CATEGORIES
            .iter()
            .find(|c| **c == lowered.as_str())
            .map(|c| Self(*c))
            .ok_or_else(|| ValidationError::InvalidVariant {
                field: "forum category",
                value: s.to_owned(),
            })
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForumSort {
    #[default]
    Latest,
    Views,
    Comments,
}

impl ForumSort {
    pub fn parse(s: Option<&str>) -> Result<Self, ValidationError> {
        match s.map(str::trim).filter(|s| !s.is_empty()) {
            None | Some("latest") => Ok(Self::Latest),
            Some("views") => Ok(Self::Views),
            Some("comments") => Ok(Self::Comments),
            Some(other) => Err(ValidationError::InvalidVariant {
                field: "sort",
                value: other.to_owned(),
            }),
        }
    }

    pub fn order_by(&self) -> &'static str {
        match self {
            Self::Latest => "p.created_at DESC",
            Self::Views => "p.view_count DESC, p.created_at DESC",
            Self::Comments => "p.comment_count DESC, p.created_at DESC",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForumListParams {
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForumFilter {
    pub category: Option<ForumCategory>,
    pub keyword: Option<String>,
    pub sort: ForumSort,
}

impl TryFrom<ForumListParams> for ForumFilter {
    type Error = ValidationError;

    fn try_from(p: ForumListParams) -> Result<Self, Self::Error> {
        Ok(Self {
            category: p
                .category
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(ForumCategory::new)
                .transpose()?,
            keyword: optional_label("keyword", p.keyword.as_deref())?,
            sort: ForumSort::parse(p.sort.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostForm {
    pub category: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub category: ForumCategory,
    pub title: Title,
    pub content: Body,
}

impl PostForm {
    pub fn validate(self) -> Result<PostDraft, ValidationError> {
        Ok(PostDraft {
            category: ForumCategory::new(&self.category)?,
            title: Title::new(&self.title)?,
            content: Body::new("content", &self.content)?,
        })
    }
}

/// Validated comment text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentContent(String);

impl CommentContent {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "comment" });
        }
        if trimmed.chars().count() > MAX_COMMENT_LEN {
            return Err(ValidationError::TooLong {
                field: "comment",
                max: MAX_COMMENT_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
