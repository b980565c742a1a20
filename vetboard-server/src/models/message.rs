//! Direct message models

use serde::Deserialize;
use uuid::Uuid;

use super::{Body, Title, ValidationError};

/// Direct message form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageForm {
    pub recipient_id: Uuid,
    pub subject: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    pub recipient_id: Uuid,
    pub subject: Option<Title>,
    pub content: Body,
}

impl MessageForm {
    /// Validate the form. Messaging yourself is rejected.
    pub fn validate(self, sender_id: Uuid) -> Result<MessageDraft, ValidationError> {
        if self.recipient_id == sender_id {
            return Err(ValidationError::InvalidFormat {
                field: "recipient",
                reason: "cannot send a message to yourself",
            });
        }

        let subject = match self.subject.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(Title::new(s)?),
            _ => None,
        };

        Ok(MessageDraft {
            recipient_id: self.recipient_id,
            subject,
            content: Body::new("content", &self.content)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_self_message() {
        let me = Uuid::new_v4();
        let err = MessageForm {
            recipient_id: me,
            subject: None,
            content: "hi".into(),
        }
        .validate(me)
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { field: "recipient", .. }));
    }

    #[test]
    fn blank_subject_is_none() {
        let draft = MessageForm {
            recipient_id: Uuid::new_v4(),
            subject: Some("  ".into()),
            content: "면접 일정 문의드립니다".into(),
        }
        .validate(Uuid::new_v4())
        .unwrap();
        assert!(draft.subject.is_none());
    }
}
