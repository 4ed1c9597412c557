use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PageAuthor;
use crate::error::ApiError;

pub const MAX_COMMENT_LEN: usize = 2_000;

/// A comment on a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub page_id: String,
    pub author: PageAuthor,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some_and(|t| t > self.created_at)
    }
}

/// Body of `POST /pages/{id}/comments` and `PUT /comments/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentInput {
    pub body: String,
}

impl CommentInput {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let body = self.body.trim();
        if body.is_empty() {
            return Err(ApiError::invalid_field("body", "Write a comment first"));
        }
        if body.chars().count() > MAX_COMMENT_LEN {
            return Err(ApiError::invalid_field(
                "body",
                format!("Comments are limited to {MAX_COMMENT_LEN} characters"),
            ));
        }
        Ok(())
    }
}
