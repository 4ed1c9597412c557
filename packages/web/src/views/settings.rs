use api::{ApiError, ProfilePatch, UserProfile};
use dioxus::prelude::*;
use store::{RecentSearches, Theme, UiPreferences};
use ui::{apply_theme, use_notifier, use_session, RequireAuth, ThemeSelector, ThemeSignal};

use super::{guarded, ErrorPanel, Loading};

#[component]
pub fn Settings() -> Element {
    rsx! {
        RequireAuth {
            SettingsBody {}
        }
    }
}

#[component]
fn SettingsBody() -> Element {
    let session = use_session();

    let me = use_resource(move || {
        let session = session.clone();
        async move { guarded(&session, session.client().me().await).await }
    });

    let profile_section = match &*me.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! { ErrorPanel { error: e.clone() } },
        Some(Ok(profile)) => rsx! {
            ProfileForm { key: "{profile.id}", profile: profile.clone() }
        },
    };

    rsx! {
        div {
            class: "view settings",
            h1 { class: "view-title", "Settings" }
            section {
                class: "settings-section",
                h2 { "Appearance" }
                ThemeSelector {}
            }
            section {
                class: "settings-section",
                h2 { "Profile" }
                {profile_section}
            }
            LocalData {}
        }
    }
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[component]
fn ProfileForm(profile: UserProfile) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let mut nickname = use_signal(|| profile.nickname.clone());
    let mut bio = use_signal(|| profile.bio.clone().unwrap_or_default());
    let mut avatar_url = use_signal(|| profile.avatar_url.clone().unwrap_or_default());
    let mut error = use_signal(|| None::<ApiError>);
    let mut busy = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let session = session.clone();
        async move {
            let patch = ProfilePatch {
                nickname: Some(nickname().trim().to_string()),
                bio: optional(bio()),
                avatar_url: optional(avatar_url()),
            };
            if let Err(e) = patch.validate() {
                error.set(Some(e));
                return;
            }
            busy.set(true);
            let result = session.client().update_profile(&patch).await;
            busy.set(false);
            match result {
                Ok(updated) => {
                    error.set(None);
                    session.refresh_user(&updated).await;
                    notifier.success("Profile updated");
                }
                Err(e) => {
                    notifier.error(&e);
                    session.handle_error(&e).await;
                    error.set(Some(e));
                }
            }
        }
    };

    let field_message = move |field: &str| {
        error
            .read()
            .as_ref()
            .and_then(|e| e.field_errors().iter().find(|f| f.field == field))
            .map(|f| f.message.clone())
    };

    rsx! {
        form {
            class: "profile-form",
            onsubmit: onsubmit,
            label {
                "Nickname"
                input {
                    value: nickname(),
                    oninput: move |evt: FormEvent| nickname.set(evt.value()),
                }
                if let Some(message) = field_message("nickname") {
                    span { class: "field-error", "{message}" }
                }
            }
            label {
                "Bio"
                textarea {
                    rows: "4",
                    value: bio(),
                    oninput: move |evt: FormEvent| bio.set(evt.value()),
                }
            }
            label {
                "Avatar URL"
                input {
                    r#type: "url",
                    placeholder: "https://",
                    value: avatar_url(),
                    oninput: move |evt: FormEvent| avatar_url.set(evt.value()),
                }
                if let Some(message) = field_message("avatar_url") {
                    span { class: "field-error", "{message}" }
                }
            }
            button {
                r#type: "submit",
                class: "btn btn-primary",
                disabled: busy(),
                "Save profile"
            }
        }
    }
}

/// Wipes drafts, search history and display preferences kept on this device.
/// The session itself is left alone; signing out handles that.
#[component]
fn LocalData() -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let mut theme = use_context::<ThemeSignal>();
    let mut confirming = use_signal(|| false);

    let clear = move |_| {
        let services = session.services().clone();
        async move {
            let drafts = services.drafts.list().await.len();
            services.drafts.clear_all().await;
            RecentSearches::clear(&services.kv).await;
            UiPreferences::clear(&services.kv).await;
            apply_theme(Theme::default());
            theme.set(Theme::default());
            tracing::info!(drafts, "cleared local data");
            confirming.set(false);
            notifier.success("Local data cleared");
        }
    };

    rsx! {
        section {
            class: "settings-section",
            h2 { "Local data" }
            p {
                class: "view-muted",
                "Unsaved drafts, recent searches and display preferences are stored in this browser."
            }
            if confirming() {
                span { "Delete all of it? " }
                button { class: "btn btn-danger", onclick: clear, "Clear local data" }
                button { class: "btn btn-ghost", onclick: move |_| confirming.set(false), "Keep" }
            } else {
                button { class: "btn", onclick: move |_| confirming.set(true), "Clear local data…" }
            }
        }
    }
}
