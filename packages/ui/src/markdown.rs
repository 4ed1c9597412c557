//! Markdown rendering for page bodies and the editor preview.
//!
//! Raw HTML in the source is shown as text and `javascript:` links are
//! neutralised, so rendered output is safe to inject.

use dioxus::prelude::*;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

fn parser_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

fn is_script_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    url.starts_with("javascript:") || url.starts_with("vbscript:") || url.starts_with("data:text")
}

pub fn render_markdown(source: &str) -> String {
    let events = Parser::new_ext(source, parser_options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_script_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

#[component]
pub fn Markdown(source: String) -> Element {
    let rendered = render_markdown(&source);
    rsx! {
        div {
            class: "markdown-body",
            dangerous_inner_html: "{rendered}",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_common_markdown() {
        let out = render_markdown("# Title\n\n- [x] done\n\n~~old~~");
        assert!(out.contains("<h1>Title</h1>"));
        assert!(out.contains("checkbox"));
        assert!(out.contains("<del>old</del>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let out = render_markdown("hello <script>alert(1)</script>");
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_script_links_are_neutralised() {
        let out = render_markdown("[click](javascript:alert(1))");
        assert!(out.contains(r##"href="#""##));
        assert!(!out.contains("javascript:"));
    }
}
