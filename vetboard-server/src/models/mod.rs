//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod text;
pub mod pagination;
pub mod user;
pub mod resume;
pub mod job;
pub mod application;
pub mod transfer;
pub mod forum;
pub mod lecture;
pub mod message;
pub mod bookmark;
pub mod moderation;

pub use validation::ValidationError;
pub use text::{Body, Email, Title};
pub use pagination::{Pagination, Paginated, PaginationParams};
pub use user::{ProfileDraft, ProfileForm, Role};
pub use resume::{ResumeDraft, ResumeFilter, ResumeForm, ResumeListParams};
pub use job::{JobDraft, JobFilter, JobForm, JobListParams, JobSort, JobStatus};
pub use application::ApplicationStatus;
pub use transfer::{
    TransferCategory, TransferDraft, TransferFilter, TransferForm, TransferListParams,
    TransferSort, TransferStatus,
};
pub use forum::{CommentContent, ForumCategory, ForumFilter, ForumListParams, ForumSort, PostDraft, PostForm};
pub use lecture::{LectureDraft, LectureFilter, LectureForm, LectureListParams, LectureSort};
pub use message::{MessageDraft, MessageForm};
pub use bookmark::BookmarkKind;
pub use moderation::ModeratedKind;
