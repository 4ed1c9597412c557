//! Theme preference, persisted in [`UiPreferences`] and applied as a
//! `data-theme` attribute on the document root.

use dioxus::prelude::*;
use store::{Theme, UiPreferences};

use crate::session::use_services;

/// Theme shared through context so any view can read or change it.
pub type ThemeSignal = Signal<Theme>;

pub fn apply_theme(theme: Theme) {
    let js = match theme.attribute() {
        Some(value) => format!("document.documentElement.setAttribute('data-theme', '{value}');"),
        None => "document.documentElement.removeAttribute('data-theme');".to_string(),
    };
    document::eval(&js);
}

/// Loads the stored preference on mount and provides the [`ThemeSignal`].
#[component]
pub fn ThemeProvider(children: Element) -> Element {
    let services = use_services();
    let mut theme = use_signal(Theme::default);
    use_context_provider(|| theme);

    use_future(move || {
        let kv = services.kv.clone();
        async move {
            let prefs = UiPreferences::load(&kv).await;
            apply_theme(prefs.theme);
            theme.set(prefs.theme);
        }
    });

    rsx! {
        {children}
    }
}

#[component]
pub fn ThemeSelector() -> Element {
    let services = use_services();
    let theme = use_context::<ThemeSignal>();
    let current = theme();

    rsx! {
        div {
            class: "theme-selector",
            for option in Theme::ALL {
                label {
                    key: "{option.label()}",
                    class: if option == current { "theme-card theme-card-active" } else { "theme-card" },
                    onclick: {
                        let kv = services.kv.clone();
                        move |_| {
                            let kv = kv.clone();
                            let mut theme = theme;
                            async move {
                                apply_theme(option);
                                theme.set(option);
                                let mut prefs = UiPreferences::load(&kv).await;
                                prefs.theme = option;
                                prefs.save(&kv).await;
                            }
                        }
                    },
                    span { "{option.label()}" }
                }
            }
        }
        p {
            class: "view-muted",
            "System follows your OS preference."
        }
    }
}
