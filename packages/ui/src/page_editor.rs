//! Page editor with local drafts.
//!
//! On mount the editor seeds itself from the stored draft for its
//! [`DraftKey`] when one exists, otherwise from `baseline` (the server copy,
//! or empty fields for a new page). Edits feed an [`AutosaveTracker`]; a
//! polling task owned by the component writes the draft once the tracker is
//! due, and a dirty draft is flushed one last time when the editor unmounts.
//!
//! A successful submit clears the draft before `on_saved` fires.

use std::time::Duration;

use api::{FieldError, Page, PageInput};
use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use store::{AutosavePolicy, AutosaveTracker, DraftFields, DraftKey, DraftStore, KvStore};

use crate::markdown::Markdown;
use crate::notifications::use_notifier;
use crate::session::use_session;
use crate::storage::sleep;
use crate::tag_input::TagInput;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Write `current` as the draft for `key`, or drop the draft when the edits
/// were reverted back to `baseline`.
async fn persist<S: KvStore>(
    drafts: &DraftStore<S>,
    key: &DraftKey,
    current: &DraftFields,
    baseline: &DraftFields,
) {
    if current.is_dirty(baseline) {
        drafts
            .save(key, &current.title, &current.content, &current.tags)
            .await;
    } else {
        drafts.clear(key).await;
    }
}

#[component]
pub fn PageEditor(
    draft_key: DraftKey,
    baseline: DraftFields,
    on_saved: EventHandler<Page>,
    #[props(default)] on_cancel: EventHandler<()>,
) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let drafts = session.services().drafts.clone();

    let mut fields = use_signal({
        let initial = baseline.clone();
        move || initial
    });
    let mut loaded = use_signal(|| false);
    let mut restored_at = use_signal(|| None::<DateTime<Utc>>);
    let mut tracker = use_signal(|| AutosaveTracker::new(AutosavePolicy::default()));
    let mut preview = use_signal(|| false);
    let mut saving = use_signal(|| false);
    let mut field_errors = use_signal(Vec::<FieldError>::new);
    // Set once the page is saved; no draft may be written after that.
    let mut submitted = use_signal(|| false);

    // Seed from the stored draft, if any
    use_future({
        let drafts = drafts.clone();
        let key = draft_key.clone();
        let baseline = baseline.clone();
        move || {
            let drafts = drafts.clone();
            let key = key.clone();
            let baseline = baseline.clone();
            async move {
                let seed = drafts.seed(&key, baseline).await;
                if seed.is_restored() {
                    tracing::info!(draft = %key, "restored local draft");
                }
                restored_at.set(seed.restored_at);
                fields.set(seed.fields);
                loaded.set(true);
            }
        }
    });

    // Autosave loop, dropped with the component
    use_future({
        let drafts = drafts.clone();
        let key = draft_key.clone();
        let baseline = baseline.clone();
        move || {
            let drafts = drafts.clone();
            let key = key.clone();
            let baseline = baseline.clone();
            async move {
                loop {
                    sleep(POLL_INTERVAL).await;
                    if *submitted.peek() {
                        break;
                    }
                    if !tracker.peek().due(Utc::now()) {
                        continue;
                    }
                    // Edits made while the write is in flight dirty the tracker again.
                    tracker.write().mark_saved();
                    let current = fields.peek().clone();
                    persist(&drafts, &key, &current, &baseline).await;
                }
            }
        }
    });

    // Flush a dirty draft on unmount
    use_drop({
        let drafts = drafts.clone();
        let key = draft_key.clone();
        let baseline = baseline.clone();
        move || {
            if *submitted.peek() || !tracker.peek().is_dirty() {
                return;
            }
            let current = fields.peek().clone();
            spawn_forever(async move {
                persist(&drafts, &key, &current, &baseline).await;
            });
        }
    });

    let discard = {
        let drafts = drafts.clone();
        let key = draft_key.clone();
        let baseline = baseline.clone();
        move |_| {
            let drafts = drafts.clone();
            let key = key.clone();
            let baseline = baseline.clone();
            async move {
                tracker.write().reset();
                drafts.clear(&key).await;
                fields.set(baseline);
                restored_at.set(None);
                field_errors.set(Vec::new());
                notifier.info("Draft discarded");
            }
        }
    };

    let submit = {
        let session = session.clone();
        let drafts = drafts.clone();
        let key = draft_key.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let session = session.clone();
            let drafts = drafts.clone();
            let key = key.clone();
            async move {
                let input = PageInput::from(fields.peek().clone());
                if let Err(e) = input.validate() {
                    field_errors.set(e.field_errors().to_vec());
                    notifier.error(&e);
                    return;
                }

                saving.set(true);
                let client = session.client();
                let result = match &key {
                    DraftKey::NewPage => client.create_page(&input).await,
                    DraftKey::EditPage(id) => client.update_page(id, &input).await,
                };
                saving.set(false);

                match result {
                    Ok(page) => {
                        submitted.set(true);
                        tracker.write().reset();
                        drafts.clear(&key).await;
                        field_errors.set(Vec::new());
                        on_saved.call(page);
                    }
                    Err(e) => {
                        field_errors.set(e.field_errors().to_vec());
                        notifier.error(&e);
                        session.handle_error(&e).await;
                    }
                }
            }
        }
    };

    let field_message = move |field: &str| {
        field_errors
            .read()
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.clone())
    };

    let current = fields();
    let dirty = tracker.read().is_dirty();
    let has_local_changes = current.is_dirty(&baseline);
    let restored_label = restored_at().map(|at| at.format("%Y-%m-%d %H:%M").to_string());

    rsx! {
        form {
            class: "page-editor",
            onsubmit: submit,

            div {
                class: "editor-status",
                if let Some(at) = restored_label.clone() {
                    span { class: "editor-restored", "Restored unsaved draft from {at}" }
                }
                if dirty {
                    span { class: "editor-unsaved", "Unsaved" }
                } else if has_local_changes {
                    span { class: "editor-saved", "Draft saved locally" }
                }
            }

            label {
                "Title"
                input {
                    class: "editor-title",
                    disabled: !loaded(),
                    value: "{current.title}",
                    oninput: move |evt: FormEvent| {
                        fields.write().title = evt.value();
                        tracker.write().on_edit(Utc::now());
                    },
                }
                if let Some(message) = field_message("title") {
                    span { class: "field-error", "{message}" }
                }
            }

            div {
                class: "editor-tabs",
                button {
                    r#type: "button",
                    class: if preview() { "tab" } else { "tab active" },
                    onclick: move |_| preview.set(false),
                    "Write"
                }
                button {
                    r#type: "button",
                    class: if preview() { "tab active" } else { "tab" },
                    onclick: move |_| preview.set(true),
                    "Preview"
                }
            }

            if preview() {
                Markdown { source: current.content.clone() }
            } else {
                textarea {
                    class: "editor-content",
                    disabled: !loaded(),
                    placeholder: "Write in Markdown…",
                    value: "{current.content}",
                    oninput: move |evt: FormEvent| {
                        fields.write().content = evt.value();
                        tracker.write().on_edit(Utc::now());
                    },
                }
            }
            if let Some(message) = field_message("content") {
                span { class: "field-error", "{message}" }
            }

            TagInput {
                tags: current.tags.clone(),
                on_change: move |tags: Vec<String>| {
                    fields.write().tags = tags;
                    tracker.write().on_edit(Utc::now());
                },
            }
            if let Some(message) = field_message("tags") {
                span { class: "field-error", "{message}" }
            }

            div {
                class: "editor-actions",
                button {
                    r#type: "submit",
                    class: "btn btn-primary",
                    disabled: saving() || !loaded(),
                    if saving() { "Saving…" } else { "Save" }
                }
                if has_local_changes || restored_label.is_some() {
                    button {
                        r#type: "button",
                        class: "btn",
                        onclick: discard,
                        "Discard draft"
                    }
                }
                button {
                    r#type: "button",
                    class: "btn btn-ghost",
                    onclick: move |_| on_cancel.call(()),
                    "Cancel"
                }
            }
        }
    }
}
