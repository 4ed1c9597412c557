//! Page tag rules: at most [`MAX_TAGS`] tags, each at most [`MAX_TAG_LEN`]
//! characters, no blanks and no case-insensitive duplicates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("Tags cannot be empty")]
    Empty,
    #[error("Tags are limited to {} characters", MAX_TAG_LEN)]
    TooLong,
    #[error("A page can have at most {} tags", MAX_TAGS)]
    TooMany,
    #[error("Tag \"{0}\" is already added")]
    Duplicate(String),
}

/// An ordered, validated list of tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag, rejecting it without touching the list if it breaks a rule.
    pub fn try_add(&mut self, tag: &str) -> Result<(), TagError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(TagError::Empty);
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(TagError::TooLong);
        }
        if self.0.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            return Err(TagError::Duplicate(tag.to_string()));
        }
        if self.0.len() >= MAX_TAGS {
            return Err(TagError::TooMany);
        }
        self.0.push(tag.to_string());
        Ok(())
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_TAGS
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl TryFrom<Vec<String>> for TagList {
    type Error = TagError;

    fn try_from(tags: Vec<String>) -> Result<Self, Self::Error> {
        let mut list = TagList::new();
        for tag in &tags {
            list.try_add(tag)?;
        }
        Ok(list)
    }
}

impl From<TagList> for Vec<String> {
    fn from(list: TagList) -> Self {
        list.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_list() -> TagList {
        let mut list = TagList::new();
        for i in 0..MAX_TAGS {
            list.try_add(&format!("tag{i}")).unwrap();
        }
        list
    }

    #[test]
    fn test_eleventh_tag_rejected() {
        let mut list = full_list();
        let before = list.clone();

        assert_eq!(list.try_add("one-more"), Err(TagError::TooMany));
        assert_eq!(list, before);
        assert!(list.is_full());
    }

    #[test]
    fn test_long_tag_rejected() {
        let mut list = TagList::new();
        list.try_add("rust").unwrap();

        let long = "x".repeat(MAX_TAG_LEN + 1);
        assert_eq!(list.try_add(&long), Err(TagError::TooLong));
        assert_eq!(list.as_slice(), ["rust".to_string()]);

        // Exactly at the limit is fine, counted in characters.
        assert!(list.try_add(&"é".repeat(MAX_TAG_LEN)).is_ok());
    }

    #[test]
    fn test_blank_and_duplicate_rejected() {
        let mut list = TagList::new();
        list.try_add(" Rust ").unwrap();
        assert_eq!(list.try_add("   "), Err(TagError::Empty));
        assert_eq!(list.try_add("rust"), Err(TagError::Duplicate("rust".into())));
        assert_eq!(list.as_slice(), ["Rust".to_string()]);
    }

    #[test]
    fn test_order_preserved_and_remove() {
        let mut list = TagList::new();
        for t in ["b", "a", "c"] {
            list.try_add(t).unwrap();
        }
        assert!(list.remove("a"));
        assert!(!list.remove("zzz"));
        assert_eq!(list.into_vec(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: TagList = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(ok.len(), 2);

        let tags: Vec<String> = (0..=MAX_TAGS).map(|i| format!("t{i}")).collect();
        let too_many = serde_json::to_string(&tags).unwrap();
        assert!(serde_json::from_str::<TagList>(&too_many).is_err());
    }
}
