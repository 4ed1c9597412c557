use dioxus::prelude::*;
use store::{TagError, TagList, MAX_TAGS};

/// `tags` with `raw` appended, if the tag rules allow it.
pub fn add_tag(tags: &[String], raw: &str) -> Result<Vec<String>, TagError> {
    let mut list = TagList::try_from(tags.to_vec())?;
    list.try_add(raw)?;
    Ok(list.into_vec())
}

#[component]
pub fn TagInput(tags: Vec<String>, on_change: EventHandler<Vec<String>>) -> Element {
    let mut text = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let full = tags.len() >= MAX_TAGS;

    let mut commit = {
        let tags = tags.clone();
        move |raw: String| match add_tag(&tags, &raw) {
            Ok(next) => {
                text.set(String::new());
                error.set(None);
                on_change.call(next);
            }
            Err(e) => error.set(Some(e.to_string())),
        }
    };

    rsx! {
        div {
            class: "tag-input",
            for tag in tags.iter() {
                span {
                    key: "{tag}",
                    class: "tag",
                    "{tag}"
                    button {
                        r#type: "button",
                        class: "tag-remove",
                        title: "Remove tag",
                        onclick: {
                            let remaining: Vec<String> =
                                tags.iter().filter(|t| *t != tag).cloned().collect();
                            move |_| on_change.call(remaining.clone())
                        },
                        "×"
                    }
                }
            }
            input {
                placeholder: if full { "Tag limit reached" } else { "Add a tag and press Enter" },
                disabled: full,
                value: text(),
                oninput: move |evt: FormEvent| text.set(evt.value()),
                onkeydown: move |evt: KeyboardEvent| {
                    let separator = matches!(evt.key(), Key::Enter)
                        || matches!(evt.key(), Key::Character(ref c) if c == ",");
                    if separator {
                        evt.prevent_default();
                        commit(text());
                    }
                },
            }
            if let Some(message) = error() {
                span { class: "field-error", "{message}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_tag_applies_rules() {
        let tags = vec!["rust".to_string()];
        assert_eq!(add_tag(&tags, "wiki").unwrap(), vec!["rust", "wiki"]);
        assert_eq!(add_tag(&tags, "RUST"), Err(TagError::Duplicate("RUST".into())));
        assert_eq!(add_tag(&tags, "  "), Err(TagError::Empty));
    }
}
