//! # Page models
//!
//! | Struct | Endpoint(s) |
//! |--------|-------------|
//! | [`Page`] | `GET /pages/{id}`, returned by create/update/approve |
//! | [`PageSummary`] | items of `GET /pages` and `GET /admin/pages/pending` |
//! | [`PageInput`] | body of `POST /pages` and `PUT /pages/{id}` |
//! | [`PageQuery`] | query string of `GET /pages` |
//! | [`Paginated`] | envelope for every paged listing |
//! | [`SearchHit`], [`TagCount`], [`UploadedImage`] | search, tag cloud and image upload |
//!
//! Pages created by contributors come back with [`PageStatus::Draft`] and stay
//! invisible until a moderator approves them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::{DraftFields, TagList};

use crate::error::ApiError;

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    /// Awaiting moderator approval.
    #[default]
    Draft,
    Published,
    Rejected,
}

impl PageStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PageStatus::Draft => "Pending approval",
            PageStatus::Published => "Published",
            PageStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageAuthor {
    pub id: String,
    pub nickname: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PageStatus,
    pub author: Option<PageAuthor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// The editable fields, used as the editor's baseline.
    pub fn draft_fields(&self) -> DraftFields {
        DraftFields::new(self.title.clone(), self.content.clone(), self.tags.clone())
    }

    pub fn is_pending(&self) -> bool {
        self.status == PageStatus::Draft
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author.as_ref().is_some_and(|a| a.id == user_id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PageStatus,
    pub author: Option<PageAuthor>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl PageInput {
    /// Client-side checks run before the request is sent.
    pub fn validate(&self) -> Result<(), ApiError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::invalid_field("title", "Enter a title"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ApiError::invalid_field(
                "title",
                format!("Titles are limited to {MAX_TITLE_LEN} characters"),
            ));
        }
        if self.content.trim().is_empty() {
            return Err(ApiError::invalid_field("content", "Write some content first"));
        }
        TagList::try_from(self.tags.clone())
            .map_err(|e| ApiError::invalid_field("tags", e.to_string()))?;
        Ok(())
    }
}

impl From<DraftFields> for PageInput {
    fn from(fields: DraftFields) -> Self {
        Self {
            title: fields.title.trim().to_string(),
            content: fields.content,
            tags: fields.tags,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PageQuery {
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            tag: None,
        }
    }
}

impl PageQuery {
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.per_page)) as u32
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub page_id: String,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn input(title: &str, content: &str, tags: &[&str]) -> PageInput {
        PageInput {
            title: title.into(),
            content: content.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_validate_page_input() {
        assert!(input("Rust", "Ownership", &["lang"]).validate().is_ok());

        let err = input("  ", "x", &[]).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field_errors()[0].field, "title");

        let eleven: Vec<String> = (0..11).map(|i| format!("t{i}")).collect();
        let refs: Vec<&str> = eleven.iter().map(String::as_str).collect();
        let err = input("Rust", "x", &refs).validate().unwrap_err();
        assert_eq!(err.field_errors()[0].field, "tags");
    }

    #[test]
    fn test_page_decodes_with_missing_optionals() {
        let json = r#"{
            "id": "p1", "title": "Home", "content": "Welcome",
            "author": null,
            "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z"
        }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert!(page.tags.is_empty());
        assert!(page.is_pending());
        assert_eq!(page.draft_fields().title, "Home");
    }

    #[test]
    fn test_pagination_math() {
        let page = Paginated::<u8> {
            items: vec![],
            page: 2,
            per_page: 20,
            total: 41,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
    }
}
