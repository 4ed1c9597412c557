use api::{Page, PageStatus};
use dioxus::prelude::*;
use ui::flows::{can_approve_page, can_delete_page, can_edit_page};
use ui::{use_notifier, use_session, Markdown};

use super::comments::CommentSection;
use super::{guarded, ErrorPanel, Loading};
use crate::Route;

#[component]
pub fn PageDetail(id: String) -> Element {
    // Route params change without remounting; keep the resource keyed on a signal
    let mut id_signal = use_signal(|| id.clone());
    if *id_signal.peek() != id {
        id_signal.set(id.clone());
    }

    let session = use_session();
    let mut refresh = use_signal(|| 0u32);

    let page = use_resource(move || {
        let session = session.clone();
        let id = id_signal();
        let _ = refresh();
        async move { guarded(&session, session.client().get_page(&id).await).await }
    });

    let content = match &*page.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! { ErrorPanel { error: e.clone() } },
        Some(Ok(page)) => rsx! {
            PageBody {
                key: "{page.id}",
                page: page.clone(),
                on_changed: move |_| refresh += 1,
            }
        },
    };

    content
}

#[component]
fn PageBody(page: Page, on_changed: EventHandler<()>) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let nav = use_navigator();
    let user = session.user();
    let mut confirming_delete = use_signal(|| false);
    let mut busy = use_signal(|| false);

    let can_edit = can_edit_page(user.as_ref(), &page);
    let can_delete = can_delete_page(user.as_ref(), &page);
    let can_approve = can_approve_page(user.as_ref(), &page);
    let updated = page.updated_at.format("%Y-%m-%d %H:%M").to_string();

    let approve = {
        let session = session.clone();
        let id = page.id.clone();
        move |_| {
            let session = session.clone();
            let id = id.clone();
            async move {
                busy.set(true);
                match session.client().approve_page(&id).await {
                    Ok(_) => {
                        notifier.success("Page approved");
                        on_changed.call(());
                    }
                    Err(e) => {
                        notifier.error(&e);
                        session.handle_error(&e).await;
                    }
                }
                busy.set(false);
            }
        }
    };

    let delete = {
        let session = session.clone();
        let id = page.id.clone();
        move |_| {
            let session = session.clone();
            let id = id.clone();
            async move {
                busy.set(true);
                match session.client().delete_page(&id).await {
                    Ok(()) => {
                        notifier.success("Page deleted");
                        nav.replace(Route::Home {});
                    }
                    Err(e) => {
                        notifier.error(&e);
                        session.handle_error(&e).await;
                        busy.set(false);
                        confirming_delete.set(false);
                    }
                }
            }
        }
    };

    rsx! {
        article {
            class: "view page-detail",
            header {
                h1 { class: "view-title", "{page.title}" }
                if page.status != PageStatus::Published {
                    span { class: "status-badge", "{page.status.label()}" }
                }
                div {
                    class: "page-meta",
                    if let Some(author) = &page.author {
                        "By "
                        Link { to: Route::Profile { id: author.id.clone() }, "{author.nickname}" }
                        " · "
                    }
                    "Updated {updated}"
                }
                div {
                    class: "page-row-tags",
                    for tag in page.tags.iter() {
                        Link { key: "{tag}", class: "tag", to: Route::TagPages { tag: tag.clone() }, "{tag}" }
                    }
                }
                div {
                    class: "page-actions",
                    if can_edit {
                        Link { class: "btn", to: Route::EditPage { id: page.id.clone() }, "Edit" }
                    }
                    if can_approve {
                        button { class: "btn btn-primary", disabled: busy(), onclick: approve, "Approve" }
                    }
                    if can_delete {
                        if confirming_delete() {
                            span { "Delete this page? " }
                            button { class: "btn btn-danger", disabled: busy(), onclick: delete, "Delete" }
                            button { class: "btn btn-ghost", onclick: move |_| confirming_delete.set(false), "Keep" }
                        } else {
                            button { class: "btn btn-ghost", onclick: move |_| confirming_delete.set(true), "Delete…" }
                        }
                    }
                }
            }
            Markdown { source: page.content.clone() }
            CommentSection { page_id: page.id.clone() }
        }
    }
}
