//! Comment thread under a page.
//!
//! Deleting hides the comment right away; the client restores its cached copy
//! if the server refuses, and the thread is re-fetched either way.

use api::{Comment, CommentInput, MAX_COMMENT_LEN};
use dioxus::prelude::*;
use ui::flows::{can_delete_comment, can_edit_comment};
use ui::{use_notifier, use_session};

use super::guarded;
use crate::Route;

#[component]
pub fn CommentSection(page_id: String) -> Element {
    let session = use_session();
    let mut refresh = use_signal(|| 0u32);
    let signed_in = session.state().is_authenticated();

    let comments = use_resource({
        let page_id = page_id.clone();
        move || {
            let session = session.clone();
            let page_id = page_id.clone();
            let _ = refresh();
            async move { guarded(&session, session.client().list_comments(&page_id).await).await }
        }
    });

    let list = match &*comments.read() {
        None => rsx! { p { class: "view-muted", "Loading comments…" } },
        Some(Err(_)) => rsx! { p { class: "view-muted", "Comments are unavailable." } },
        Some(Ok(items)) if items.is_empty() => rsx! { p { class: "view-muted", "No comments yet." } },
        Some(Ok(items)) => rsx! {
            ul {
                class: "comment-list",
                for comment in items.iter() {
                    CommentItem {
                        key: "{comment.id}",
                        comment: comment.clone(),
                        on_changed: move |_| refresh += 1,
                    }
                }
            }
        },
    };

    rsx! {
        section {
            class: "comments",
            h2 { "Comments" }
            {list}
            if signed_in {
                CommentForm { page_id: page_id.clone(), on_posted: move |_| refresh += 1 }
            } else {
                p {
                    class: "view-muted",
                    Link { to: Route::Login {}, "Sign in" }
                    " to comment."
                }
            }
        }
    }
}

#[component]
fn CommentItem(comment: Comment, on_changed: EventHandler<()>) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let user = session.user();
    let mut hidden = use_signal(|| false);
    let mut editing = use_signal(|| false);
    let mut body = use_signal({
        let initial = comment.body.clone();
        move || initial
    });

    let can_edit = can_edit_comment(user.as_ref(), &comment);
    let can_delete = can_delete_comment(user.as_ref(), &comment);
    let posted = comment.created_at.format("%Y-%m-%d %H:%M").to_string();

    let delete = {
        let session = session.clone();
        let page_id = comment.page_id.clone();
        let id = comment.id.clone();
        move |_| {
            let session = session.clone();
            let page_id = page_id.clone();
            let id = id.clone();
            async move {
                hidden.set(true);
                match session.client().delete_comment(&page_id, &id).await {
                    Ok(()) => notifier.success("Comment deleted"),
                    Err(e) => {
                        hidden.set(false);
                        notifier.error(&e);
                        session.handle_error(&e).await;
                    }
                }
                on_changed.call(());
            }
        }
    };

    let save = {
        let session = session.clone();
        let page_id = comment.page_id.clone();
        let id = comment.id.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let session = session.clone();
            let page_id = page_id.clone();
            let id = id.clone();
            async move {
                let input = CommentInput::new(body());
                match session.client().update_comment(&page_id, &id, &input).await {
                    Ok(_) => {
                        editing.set(false);
                        on_changed.call(());
                    }
                    Err(e) => {
                        notifier.error(&e);
                        session.handle_error(&e).await;
                    }
                }
            }
        }
    };

    if hidden() {
        return rsx! {};
    }

    rsx! {
        li {
            class: "comment",
            div {
                class: "comment-meta",
                Link { to: Route::Profile { id: comment.author.id.clone() }, "{comment.author.nickname}" }
                " · {posted}"
                if comment.is_edited() {
                    " (edited)"
                }
            }
            if editing() {
                form {
                    onsubmit: save,
                    textarea {
                        maxlength: "{MAX_COMMENT_LEN}",
                        value: body(),
                        oninput: move |evt: FormEvent| body.set(evt.value()),
                    }
                    button { r#type: "submit", class: "btn btn-primary", "Save" }
                    button {
                        r#type: "button",
                        class: "btn btn-ghost",
                        onclick: move |_| editing.set(false),
                        "Cancel"
                    }
                }
            } else {
                p { class: "comment-body", "{comment.body}" }
                div {
                    class: "comment-actions",
                    if can_edit {
                        button { class: "btn btn-ghost", onclick: move |_| editing.set(true), "Edit" }
                    }
                    if can_delete {
                        button { class: "btn btn-ghost", onclick: delete, "Delete" }
                    }
                }
            }
        }
    }
}

#[component]
fn CommentForm(page_id: String, on_posted: EventHandler<()>) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let mut body = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let session = session.clone();
        let page_id = page_id.clone();
        async move {
            let input = CommentInput::new(body());
            if let Err(e) = input.validate() {
                error.set(e.detail());
                return;
            }
            busy.set(true);
            let result = session.client().create_comment(&page_id, &input).await;
            busy.set(false);
            match result {
                Ok(_) => {
                    body.set(String::new());
                    error.set(None);
                    on_posted.call(());
                }
                Err(e) => {
                    error.set(e.detail());
                    notifier.error(&e);
                    session.handle_error(&e).await;
                }
            }
        }
    };

    let remaining = MAX_COMMENT_LEN.saturating_sub(body.read().chars().count());

    rsx! {
        form {
            class: "comment-form",
            onsubmit: onsubmit,
            textarea {
                placeholder: "Add a comment",
                value: body(),
                oninput: move |evt: FormEvent| body.set(evt.value()),
            }
            div {
                class: "comment-form-footer",
                span { class: "view-muted", "{remaining} characters left" }
                button { r#type: "submit", class: "btn btn-primary", disabled: busy(), "Comment" }
            }
            if let Some(message) = error() {
                p { class: "form-error", "{message}" }
            }
        }
    }
}
