use dioxus::prelude::*;
use ui::RegisterForm;

use crate::Route;

#[component]
pub fn Register() -> Element {
    let nav = use_navigator();

    rsx! {
        div {
            class: "auth-view",
            h1 { "Join the wiki" }
            RegisterForm {
                on_success: move |_| {
                    nav.push(Route::Home {});
                },
            }
            p {
                class: "view-muted",
                "Already registered? "
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
