//! Wire models for the wiki REST API.

mod admin;
mod comment;
mod page;
mod user;

pub use admin::{AdminUser, AuditLogEntry, RoleChange, SiteStats};
pub use comment::{Comment, CommentInput, MAX_COMMENT_LEN};
pub use page::{
    Page, PageAuthor, PageInput, PageQuery, PageStatus, PageSummary, Paginated, SearchHit,
    TagCount, UploadedImage, MAX_TITLE_LEN,
};
pub use user::{
    AuthResponse, LoginRequest, ProfilePatch, RegisterRequest, UserProfile, MIN_PASSWORD_LEN,
};
