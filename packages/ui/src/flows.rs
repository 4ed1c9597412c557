//! What happens after an operation succeeds, and who may do what.
//!
//! Kept free of components so the rules can be tested directly.

use api::{Comment, Page};
use store::SessionUser;

/// Where to go once a page has been saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Home,
    Page(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub message: &'static str,
    pub destination: Destination,
}

/// Outcome of a successful create (`created`) or update.
///
/// A page that came back pending is not viewable by its author yet, so the
/// user is told it awaits approval and sent home.
pub fn after_page_saved(page: &Page, created: bool) -> SubmitOutcome {
    if page.is_pending() {
        return SubmitOutcome {
            message: "Submitted for approval",
            destination: Destination::Home,
        };
    }
    SubmitOutcome {
        message: if created { "Page created" } else { "Changes saved" },
        destination: Destination::Page(page.id.clone()),
    }
}

pub fn can_edit_page(user: Option<&SessionUser>, page: &Page) -> bool {
    user.is_some_and(|u| u.role.can_edit_any_page() || page.is_authored_by(&u.id))
}

pub fn can_delete_page(user: Option<&SessionUser>, page: &Page) -> bool {
    user.is_some_and(|u| u.role.can_moderate() || page.is_authored_by(&u.id))
}

pub fn can_approve_page(user: Option<&SessionUser>, page: &Page) -> bool {
    page.is_pending() && user.is_some_and(|u| u.role.can_moderate())
}

pub fn can_edit_comment(user: Option<&SessionUser>, comment: &Comment) -> bool {
    user.is_some_and(|u| comment.author.id == u.id)
}

pub fn can_delete_comment(user: Option<&SessionUser>, comment: &Comment) -> bool {
    user.is_some_and(|u| u.role.can_moderate() || comment.author.id == u.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::{PageAuthor, PageStatus};
    use chrono::Utc;
    use store::Role;

    fn page(status: PageStatus) -> Page {
        Page {
            id: "p1".into(),
            title: "Rust".into(),
            content: "Ownership".into(),
            tags: vec![],
            status,
            author: Some(PageAuthor {
                id: "author".into(),
                nickname: "ada".into(),
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(id: &str, role: Role) -> SessionUser {
        SessionUser {
            id: id.into(),
            nickname: id.into(),
            role,
            email: None,
            avatar_url: None,
        }
    }

    #[test]
    fn test_pending_create_goes_home() {
        let outcome = after_page_saved(&page(PageStatus::Draft), true);
        assert_eq!(outcome.message, "Submitted for approval");
        assert_eq!(outcome.destination, Destination::Home);
    }

    #[test]
    fn test_published_save_opens_page() {
        let created = after_page_saved(&page(PageStatus::Published), true);
        assert_eq!(created.destination, Destination::Page("p1".into()));
        assert_eq!(created.message, "Page created");
        assert_eq!(after_page_saved(&page(PageStatus::Published), false).message, "Changes saved");
    }

    #[test]
    fn test_page_permissions() {
        let p = page(PageStatus::Draft);
        let author = user("author", Role::Contributor);
        let stranger = user("other", Role::Contributor);
        let editor = user("ed", Role::Editor);
        let moderator = user("mod", Role::Moderator);

        assert!(can_edit_page(Some(&author), &p));
        assert!(!can_edit_page(Some(&stranger), &p));
        assert!(can_edit_page(Some(&editor), &p));
        assert!(!can_edit_page(None, &p));

        assert!(!can_delete_page(Some(&editor), &p));
        assert!(can_delete_page(Some(&moderator), &p));

        assert!(can_approve_page(Some(&moderator), &p));
        assert!(!can_approve_page(Some(&editor), &p));
        assert!(!can_approve_page(Some(&moderator), &page(PageStatus::Published)));
    }
}
