use dioxus::prelude::*;
use store::SessionState;

use crate::session::use_session;

/// Top bar: brand slot on the left, caller links, then the signed-in user.
#[component]
pub fn Navbar(brand: Element, children: Element, account: Element) -> Element {
    let session = use_session();

    rsx! {
        nav {
            class: "navbar",
            div { class: "navbar-brand", {brand} }
            div { class: "navbar-links", {children} }
            div {
                class: "navbar-account",
                {match session.state() {
                    SessionState::Loading => rsx! {},
                    SessionState::Anonymous => rsx! { {account} },
                    SessionState::Authenticated(s) => rsx! {
                        span {
                            class: "navbar-user",
                            title: "{s.user.role}",
                            if let Some(avatar) = &s.user.avatar_url {
                                img { class: "navbar-avatar", src: "{avatar}", alt: "" }
                            }
                            "{s.user.nickname}"
                        }
                        {account}
                    },
                }}
            }
        }
    }
}
