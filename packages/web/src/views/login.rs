//! Sign-in view.

use dioxus::prelude::*;
use ui::{use_session, LoginForm};

use crate::Route;

#[component]
pub fn Login() -> Element {
    let session = use_session();
    let state = session.signal();
    let nav = use_navigator();

    // Already signed in: nothing to do here
    use_effect(move || {
        if state().is_authenticated() {
            nav.replace(Route::Home {});
        }
    });

    rsx! {
        div {
            class: "auth-view",
            h1 { "Sign in" }
            LoginForm {
                on_success: move |_| {
                    nav.push(Route::Home {});
                },
            }
            p {
                class: "view-muted",
                "No account yet? "
                Link { to: Route::Register {}, "Join the wiki" }
            }
        }
    }
}
