//! Full-text search with a locally remembered list of recent queries.

use dioxus::prelude::*;
use store::RecentSearches;
use ui::use_session;

use super::guarded;
use crate::Route;

#[component]
pub fn Search() -> Element {
    let session = use_session();
    let kv = session.services().kv.clone();
    let mut text = use_signal(String::new);
    let mut query = use_signal(String::new);
    let mut recent = use_signal(RecentSearches::default);

    use_future({
        let kv = kv.clone();
        move || {
            let kv = kv.clone();
            async move { recent.set(RecentSearches::load(&kv).await) }
        }
    });

    let results = use_resource({
        let session = session.clone();
        move || {
            let session = session.clone();
            let q = query();
            async move { guarded(&session, session.client().search(&q).await).await }
        }
    });

    let mut run = {
        let kv = kv.clone();
        move |raw: String| {
            let trimmed = raw.trim().to_string();
            text.set(trimmed.clone());
            query.set(trimmed.clone());
            if trimmed.is_empty() {
                return;
            }
            recent.write().record(&trimmed);
            let snapshot = recent.peek().clone();
            let kv = kv.clone();
            spawn(async move { snapshot.save(&kv).await });
        }
    };

    let forget = {
        let kv = kv.clone();
        move |q: String| {
            recent.write().remove(&q);
            let snapshot = recent.peek().clone();
            let kv = kv.clone();
            spawn(async move { snapshot.save(&kv).await });
        }
    };

    let clear_recent = move |_| {
        let kv = kv.clone();
        recent.set(RecentSearches::default());
        spawn(async move { RecentSearches::clear(&kv).await });
    };

    let run_from_recent = run.clone();

    let results_view = match &*results.read() {
        _ if query().is_empty() => rsx! {},
        None => rsx! { p { class: "view-muted", "Searching…" } },
        Some(Err(e)) => rsx! { p { class: "form-error", "{e.title()}" } },
        Some(Ok(hits)) if hits.is_empty() => rsx! {
            p { class: "view-muted", "No pages match “{query}”." }
        },
        Some(Ok(hits)) => rsx! {
            ul {
                class: "search-results",
                for hit in hits.iter() {
                    li {
                        key: "{hit.page_id}",
                        Link { to: Route::PageDetail { id: hit.page_id.clone() }, "{hit.title}" }
                        if !hit.snippet.is_empty() {
                            p { class: "search-snippet", "{hit.snippet}" }
                        }
                    }
                }
            }
        },
    };

    rsx! {
        div {
            class: "view",
            h1 { class: "view-title", "Search" }
            form {
                class: "search-form",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    run(text());
                },
                input {
                    r#type: "search",
                    placeholder: "Search pages",
                    value: text(),
                    oninput: move |evt: FormEvent| text.set(evt.value()),
                }
                button { r#type: "submit", class: "btn btn-primary", "Search" }
            }
            {results_view}
            if !recent.read().is_empty() {
                section {
                    class: "recent-searches",
                    h2 { "Recent searches" }
                    ul {
                        for q in recent.read().queries().iter().cloned() {
                            li {
                                key: "{q}",
                                button {
                                    class: "link",
                                    onclick: {
                                        let q = q.clone();
                                        let mut run = run_from_recent.clone();
                                        move |_| run(q.clone())
                                    },
                                    "{q}"
                                }
                                button {
                                    class: "btn btn-ghost",
                                    title: "Forget",
                                    onclick: {
                                        let q = q.clone();
                                        let mut forget = forget.clone();
                                        move |_| forget(q.clone())
                                    },
                                    "×"
                                }
                            }
                        }
                    }
                    button { class: "btn btn-ghost", onclick: clear_recent, "Clear history" }
                }
            }
        }
    }
}
