use api::Page;
use dioxus::prelude::*;
use store::{DraftFields, DraftKey};
use ui::flows::can_edit_page;
use ui::{after_page_saved, use_notifier, use_session, PageEditor, RequireAuth};

use super::{guarded, route_for, ErrorPanel, Loading};
use crate::Route;

#[component]
pub fn NewPage() -> Element {
    let notifier = use_notifier();
    let nav = use_navigator();

    let on_saved = move |page: Page| {
        let outcome = after_page_saved(&page, true);
        notifier.success(outcome.message);
        nav.push(route_for(outcome.destination));
    };

    rsx! {
        RequireAuth {
            div {
                class: "view",
                h1 { class: "view-title", "New page" }
                PageEditor {
                    draft_key: DraftKey::NewPage,
                    baseline: DraftFields::default(),
                    on_saved: on_saved,
                    on_cancel: move |_| {
                        nav.push(Route::Home {});
                    },
                }
            }
        }
    }
}

#[component]
pub fn EditPage(id: String) -> Element {
    rsx! {
        RequireAuth {
            EditExisting { key: "{id}", id: id.clone() }
        }
    }
}

#[component]
fn EditExisting(id: String) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let nav = use_navigator();
    let user = session.user();

    let page = use_resource({
        let id = id.clone();
        move || {
            let session = session.clone();
            let id = id.clone();
            async move { guarded(&session, session.client().get_page(&id).await).await }
        }
    });

    let on_saved = move |page: Page| {
        let outcome = after_page_saved(&page, false);
        notifier.success(outcome.message);
        nav.push(route_for(outcome.destination));
    };

    let content = match &*page.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! { ErrorPanel { error: e.clone() } },
        Some(Ok(page)) if !can_edit_page(user.as_ref(), page) => rsx! {
            div {
                class: "guard-forbidden",
                h2 { "Not allowed" }
                p { "Only the author or an editor can change this page." }
            }
        },
        Some(Ok(page)) => {
            let back = page.id.clone();
            rsx! {
                div {
                    class: "view",
                    h1 { class: "view-title", "Editing “{page.title}”" }
                    PageEditor {
                        draft_key: DraftKey::EditPage(page.id.clone()),
                        baseline: page.draft_fields(),
                        on_saved: on_saved,
                        on_cancel: move |_| {
                            nav.push(Route::PageDetail { id: back.clone() });
                        },
                    }
                }
            }
        }
    };

    content
}
