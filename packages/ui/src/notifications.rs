//! Transient notifications raised at operation boundaries.
//!
//! Every failed operation ends up here as a [`Notice`] built from its
//! [`ApiError`]; successes get a short confirmation. Notices dismiss
//! themselves after [`AUTO_DISMISS`] or when clicked.

use std::time::Duration;

use api::{ApiError, FieldError};
use dioxus::prelude::*;

use crate::storage::sleep;

pub const AUTO_DISMISS: Duration = Duration::from_secs(5);
const MAX_VISIBLE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    fn class(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "notice notice-info",
            NoticeLevel::Success => "notice notice-success",
            NoticeLevel::Error => "notice notice-error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub title: String,
    pub detail: Option<String>,
    pub fields: Vec<FieldError>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeBoard {
    pub fn push(&mut self, level: NoticeLevel, title: impl Into<String>, detail: Option<String>) -> u64 {
        self.push_notice(level, title.into(), detail, Vec::new())
    }

    pub fn push_error(&mut self, err: &ApiError) -> u64 {
        self.push_notice(
            NoticeLevel::Error,
            err.title().to_string(),
            err.detail(),
            err.field_errors().to_vec(),
        )
    }

    fn push_notice(
        &mut self,
        level: NoticeLevel,
        title: String,
        detail: Option<String>,
        fields: Vec<FieldError>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.notices.push(Notice {
            id,
            level,
            title,
            detail,
            fields,
        });
        let overflow = self.notices.len().saturating_sub(MAX_VISIBLE);
        self.notices.drain(..overflow);
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

/// Handle for raising notices from event handlers and tasks.
#[derive(Clone, Copy)]
pub struct Notifier(Signal<NoticeBoard>);

impl Notifier {
    pub fn info(&self, title: impl Into<String>) {
        let mut board = self.0;
        board.write().push(NoticeLevel::Info, title, None);
    }

    pub fn success(&self, title: impl Into<String>) {
        let mut board = self.0;
        board.write().push(NoticeLevel::Success, title, None);
    }

    pub fn error(&self, err: &ApiError) {
        tracing::error!("operation failed: {err}");
        let mut board = self.0;
        board.write().push_error(err);
    }

    pub fn dismiss(&self, id: u64) {
        let mut board = self.0;
        board.write().dismiss(id);
    }
}

pub fn use_notifier() -> Notifier {
    Notifier(use_context::<Signal<NoticeBoard>>())
}

/// Provides the notice board and renders the toast stack above `children`.
#[component]
pub fn NotificationProvider(children: Element) -> Element {
    let board = use_signal(NoticeBoard::default);
    use_context_provider(|| board);
    let notifier = Notifier(board);
    let notices = board.read().notices().to_vec();

    rsx! {
        {children}
        div {
            class: "notice-stack",
            for notice in notices {
                Toast {
                    key: "{notice.id}",
                    notice: notice.clone(),
                    on_dismiss: move |id| notifier.dismiss(id),
                }
            }
        }
    }
}

#[component]
fn Toast(notice: Notice, on_dismiss: EventHandler<u64>) -> Element {
    let id = notice.id;
    use_future(move || async move {
        sleep(AUTO_DISMISS).await;
        on_dismiss.call(id);
    });

    rsx! {
        div {
            class: notice.level.class(),
            role: "status",
            onclick: move |_| on_dismiss.call(id),
            strong { "{notice.title}" }
            if let Some(detail) = &notice.detail {
                p { "{detail}" }
            }
            if !notice.fields.is_empty() {
                ul {
                    for field in notice.fields.iter() {
                        li { "{field.field}: {field.message}" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_notice_carries_title_detail_and_fields() {
        let mut board = NoticeBoard::default();
        let body = r#"{"message":"Invalid page","errors":[{"field":"title","message":"Required"}]}"#;
        board.push_error(&ApiError::from_response(422, body));

        let notice = &board.notices()[0];
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Check your input");
        assert_eq!(notice.detail.as_deref(), Some("Invalid page"));
        assert_eq!(notice.fields[0].field, "title");
    }

    #[test]
    fn test_dismiss_and_overflow() {
        let mut board = NoticeBoard::default();
        let first = board.push(NoticeLevel::Info, "one", None);
        for i in 0..MAX_VISIBLE {
            board.push(NoticeLevel::Success, format!("n{i}"), None);
        }
        assert_eq!(board.notices().len(), MAX_VISIBLE);
        assert!(!board.dismiss(first), "oldest notice was dropped on overflow");

        let last = board.notices()[MAX_VISIBLE - 1].id;
        assert!(board.dismiss(last));
        assert_eq!(board.notices().len(), MAX_VISIBLE - 1);
    }
}
