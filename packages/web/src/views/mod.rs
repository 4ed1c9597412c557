use api::{ApiError, ErrorKind};
use dioxus::prelude::*;
use ui::{Destination, SessionHandle};

use crate::Route;

mod layout;
pub use layout::AppLayout;

mod home;
pub use home::{Home, TagPages};

mod login;
pub use login::Login;

mod register;
pub use register::Register;

mod page_detail;
pub use page_detail::PageDetail;

mod comments;

mod page_edit;
pub use page_edit::{EditPage, NewPage};

mod profile;
pub use profile::Profile;

mod search;
pub use search::Search;

mod settings;
pub use settings::Settings;

mod admin;
pub use admin::Admin;

mod not_found;
pub use not_found::NotFound;

/// Pass a query result through, signing out first if the API rejected our token.
pub(crate) async fn guarded<T>(
    session: &SessionHandle,
    result: Result<T, ApiError>,
) -> Result<T, ApiError> {
    if let Err(e) = &result {
        session.handle_error(e).await;
    }
    result
}

pub(crate) fn route_for(destination: Destination) -> Route {
    match destination {
        Destination::Home => Route::Home {},
        Destination::Page(id) => Route::PageDetail { id },
    }
}

#[component]
pub(crate) fn Loading() -> Element {
    rsx! {
        div { class: "view-loading", "Loading…" }
    }
}

/// Fallback for a failed page-level query.
#[component]
pub(crate) fn ErrorPanel(error: ApiError) -> Element {
    let heading = match error.kind() {
        ErrorKind::NotFound => "Not found",
        _ => error.title(),
    };
    rsx! {
        div {
            class: "view-error",
            h2 { "{heading}" }
            if let Some(detail) = error.detail() {
                p { "{detail}" }
            }
            Link { to: Route::Home {}, "Back to the wiki" }
        }
    }
}

/// Previous/next controls for a paginated listing; hidden for a single page.
#[component]
pub(crate) fn Pager(current: u32, total: u32, has_next: bool, on_change: EventHandler<u32>) -> Element {
    if total <= 1 {
        return rsx! {};
    }
    rsx! {
        div {
            class: "pager",
            button {
                disabled: current <= 1,
                onclick: move |_| on_change.call(current.saturating_sub(1).max(1)),
                "Previous"
            }
            span { "Page {current} of {total}" }
            button {
                disabled: !has_next,
                onclick: move |_| on_change.call(current + 1),
                "Next"
            }
        }
    }
}
