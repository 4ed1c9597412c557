use api::UserProfile;
use dioxus::prelude::*;
use ui::use_session;

use super::{guarded, ErrorPanel, Loading};
use crate::Route;

#[component]
pub fn Profile(id: String) -> Element {
    let mut id_signal = use_signal(|| id.clone());
    if *id_signal.peek() != id {
        id_signal.set(id.clone());
    }

    let session = use_session();
    let own_id = session.user().map(|u| u.id);

    let profile = use_resource(move || {
        let session = session.clone();
        let id = id_signal();
        async move { guarded(&session, session.client().get_profile(&id).await).await }
    });

    let content = match &*profile.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! { ErrorPanel { error: e.clone() } },
        Some(Ok(profile)) => rsx! {
            ProfileCard {
                profile: profile.clone(),
                is_own: own_id.as_deref() == Some(profile.id.as_str()),
            }
        },
    };

    content
}

#[component]
fn ProfileCard(profile: UserProfile, is_own: bool) -> Element {
    let joined = profile
        .created_at
        .map(|t| t.format("%B %Y").to_string());

    rsx! {
        div {
            class: "view profile",
            if let Some(avatar) = &profile.avatar_url {
                img { class: "profile-avatar", src: "{avatar}", alt: "" }
            }
            h1 { class: "view-title", "{profile.nickname}" }
            span { class: "role-badge", "{profile.role}" }
            if let Some(joined) = joined {
                p { class: "view-muted", "Member since {joined}" }
            }
            if let Some(bio) = &profile.bio {
                p { class: "profile-bio", "{bio}" }
            }
            if is_own {
                Link { class: "btn", to: Route::Settings {}, "Edit profile" }
            }
        }
    }
}
