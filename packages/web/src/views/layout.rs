use dioxus::prelude::*;
use store::{Role, UiPreferences};
use ui::{use_session, LogoutButton, Navbar};

use crate::Route;

/// Shell around every routed view: navbar, tag sidebar, content.
#[component]
pub fn AppLayout() -> Element {
    let session = use_session();
    let nav = use_navigator();
    let role = session.role();
    let signed_in = role.is_some();

    let account = if signed_in {
        rsx! {
            LogoutButton {
                class: "btn btn-ghost",
                on_signed_out: move |_| {
                    nav.push(Route::Home {});
                },
            }
        }
    } else {
        rsx! {
            Link { class: "btn btn-ghost", to: Route::Login {}, "Sign in" }
            Link { class: "btn btn-primary", to: Route::Register {}, "Join" }
        }
    };

    rsx! {
        Navbar {
            brand: rsx! { Link { to: Route::Home {}, "Tessera" } },
            account,
            Link { to: Route::Home {}, "Pages" }
            Link { to: Route::Search {}, "Search" }
            if signed_in {
                Link { to: Route::NewPage {}, "New page" }
                Link { to: Route::Settings {}, "Settings" }
            }
            if role.is_some_and(|r| r.at_least(Role::Moderator)) {
                Link { to: Route::Admin {}, "Admin" }
            }
        }
        div {
            class: "app-body",
            TagSidebar {}
            main {
                class: "app-content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn TagSidebar() -> Element {
    let session = use_session();
    let kv = session.services().kv.clone();
    let mut collapsed = use_signal(|| false);

    use_future({
        let kv = kv.clone();
        move || {
            let kv = kv.clone();
            async move {
                collapsed.set(UiPreferences::load(&kv).await.sidebar_collapsed);
            }
        }
    });

    let tags = use_resource({
        let session = session.clone();
        move || {
            let session = session.clone();
            async move { super::guarded(&session, session.client().list_tags().await).await }
        }
    });

    let toggle = move |_| {
        let kv = kv.clone();
        async move {
            let next = !collapsed();
            collapsed.set(next);
            let mut prefs = UiPreferences::load(&kv).await;
            prefs.sidebar_collapsed = next;
            prefs.save(&kv).await;
        }
    };

    rsx! {
        aside {
            class: if collapsed() { "tag-sidebar collapsed" } else { "tag-sidebar" },
            button {
                class: "tag-sidebar-toggle",
                title: if collapsed() { "Show tags" } else { "Hide tags" },
                onclick: toggle,
                if collapsed() { "»" } else { "«" }
            }
            if !collapsed() {
                h3 { "Tags" }
                {match &*tags.read() {
                    Some(Ok(list)) => rsx! {
                        ul {
                            for tag in list.iter() {
                                li {
                                    key: "{tag.name}",
                                    Link {
                                        to: Route::TagPages { tag: tag.name.clone() },
                                        "{tag.name}"
                                    }
                                    span { class: "tag-count", " {tag.count}" }
                                }
                            }
                        }
                    },
                    Some(Err(_)) => rsx! { p { class: "view-muted", "Tags are unavailable." } },
                    None => rsx! {},
                }}
            }
        }
    }
}
