use api::{PageQuery, PageStatus, PageSummary};
use dioxus::prelude::*;
use store::DraftKey;
use ui::use_session;

use super::{guarded, ErrorPanel, Loading, Pager};
use crate::Route;

#[component]
pub fn Home() -> Element {
    let session = use_session();
    let signed_in = session.state().is_authenticated();

    rsx! {
        div {
            class: "view",
            h1 { class: "view-title", "Recently updated" }
            if signed_in {
                LocalDrafts {}
            }
            PageList { query: PageQuery::default() }
        }
    }
}

#[component]
pub fn TagPages(tag: String) -> Element {
    rsx! {
        div {
            class: "view",
            h1 { class: "view-title", "Pages tagged “{tag}”" }
            PageList { key: "{tag}", query: PageQuery::tagged(tag.clone()) }
        }
    }
}

/// Paged list of published pages for `query`.
#[component]
fn PageList(query: PageQuery) -> Element {
    let session = use_session();
    let mut page = use_signal(|| 1u32);

    let pages = use_resource(move || {
        let session = session.clone();
        let query = query.clone().with_page(page());
        async move { guarded(&session, session.client().list_pages(&query).await).await }
    });

    let content = match &*pages.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! { ErrorPanel { error: e.clone() } },
        Some(Ok(listing)) if listing.items.is_empty() => rsx! {
            p { class: "view-muted", "No pages yet." }
        },
        Some(Ok(listing)) => {
            let current = listing.page;
            let total = listing.total_pages();
            let has_next = listing.has_next();
            rsx! {
                ul {
                    class: "page-list",
                    for summary in listing.items.iter() {
                        PageRow { key: "{summary.id}", summary: summary.clone() }
                    }
                }
                Pager {
                    current,
                    total,
                    has_next,
                    on_change: move |p| page.set(p),
                }
            }
        }
    };

    content
}

#[component]
fn PageRow(summary: PageSummary) -> Element {
    let updated = summary.updated_at.format("%Y-%m-%d").to_string();
    rsx! {
        li {
            class: "page-row",
            Link {
                class: "page-row-title",
                to: Route::PageDetail { id: summary.id.clone() },
                "{summary.title}"
            }
            if summary.status != PageStatus::Published {
                span { class: "status-badge", "{summary.status.label()}" }
            }
            div {
                class: "page-row-meta",
                if let Some(author) = &summary.author {
                    Link { to: Route::Profile { id: author.id.clone() }, "{author.nickname}" }
                    " · "
                }
                "{updated}"
            }
            div {
                class: "page-row-tags",
                for tag in summary.tags.iter() {
                    Link { key: "{tag}", class: "tag", to: Route::TagPages { tag: tag.clone() }, "{tag}" }
                }
            }
        }
    }
}

/// Unsaved drafts kept in local storage, newest first.
#[component]
fn LocalDrafts() -> Element {
    let session = use_session();
    let drafts = use_resource(move || {
        let drafts = session.services().drafts.clone();
        async move { drafts.list().await }
    });

    let list = drafts.read().clone().unwrap_or_default();
    if list.is_empty() {
        return rsx! {};
    }

    rsx! {
        section {
            class: "local-drafts",
            h2 { "Unsaved drafts" }
            ul {
                for (key, draft) in list {
                    DraftRow {
                        key: "{key}",
                        draft_key: key.clone(),
                        title: draft.title.clone(),
                        saved: draft.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                    }
                }
            }
        }
    }
}

#[component]
fn DraftRow(draft_key: DraftKey, title: String, saved: String) -> Element {
    let title = if title.trim().is_empty() {
        "(untitled)".to_string()
    } else {
        title
    };
    let (route, prefix) = match draft_key {
        DraftKey::NewPage => (Route::NewPage {}, "New page"),
        DraftKey::EditPage(id) => (Route::EditPage { id }, "Edit"),
    };

    rsx! {
        li {
            Link { to: route, "{prefix}: {title}" }
            span { class: "view-muted", " saved {saved}" }
        }
    }
}
