//! Content kinds an admin can hide or delete

use super::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeratedKind {
    Job,
    Transfer,
    ForumPost,
}

impl ModeratedKind {
    /// Parse the admin path segment (`jobs`, `transfers`, `forum`).
    pub fn from_segment(s: &str) -> Result<Self, ValidationError> {
        match s {
            "jobs" => Ok(Self::Job),
            "transfers" => Ok(Self::Transfer),
            "forum" => Ok(Self::ForumPost),
            _ => Err(ValidationError::InvalidVariant {
                field: "content kind",
                value: s.to_owned(),
            }),
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Self::Job => "jobs",
            Self::Transfer => "transfers",
            Self::ForumPost => "forum_posts",
        }
    }

    pub fn resource(&self) -> &'static str {
        match self {
            Self::Job => "job",
            Self::Transfer => "transfer",
            Self::ForumPost => "post",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_map_to_tables() {
        assert_eq!(ModeratedKind::from_segment("forum").unwrap().table(), "forum_posts");
        assert_eq!(ModeratedKind::from_segment("jobs").unwrap(), ModeratedKind::Job);
        assert!(ModeratedKind::from_segment("lectures").is_err());
        assert!(ModeratedKind::from_segment("users").is_err());
    }
}
