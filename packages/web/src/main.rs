use api::ApiConfig;
use dioxus::prelude::*;

use ui::{NotificationProvider, SessionProvider, ThemeProvider};
use views::{
    Admin, AppLayout, EditPage, Home, Login, NewPage, NotFound, PageDetail, Profile, Register,
    Search, Settings, TagPages,
};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(AppLayout)]
        #[route("/")]
        Home {},
        #[route("/login")]
        Login {},
        #[route("/register")]
        Register {},
        #[route("/pages/new")]
        NewPage {},
        #[route("/pages/:id")]
        PageDetail { id: String },
        #[route("/pages/:id/edit")]
        EditPage { id: String },
        #[route("/tags/:tag")]
        TagPages { tag: String },
        #[route("/users/:id")]
        Profile { id: String },
        #[route("/search")]
        Search {},
        #[route("/settings")]
        Settings {},
        #[route("/admin")]
        Admin {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let client = use_hook(|| {
        let config = ApiConfig::load();
        tracing::info!(api = %config.base_url(), "starting wiki client");
        api::Client::connect(&config)
    });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        {match client {
            Ok(client) => rsx! {
                NotificationProvider {
                    SessionProvider {
                        client,
                        ThemeProvider {
                            Router::<Route> {}
                        }
                    }
                }
            },
            Err(e) => rsx! {
                div {
                    class: "fatal",
                    h1 { "The wiki could not start" }
                    p { "{e}" }
                }
            },
        }}
    }
}
