//! HTML snapshot of a page state.
//!
//! Renders a [`MemoryDocument`] back to markup: one `div` per element with
//! its current class list, so role and active markers can be inspected in a
//! browser or diffed between runs. The body carries `overflow: hidden` while
//! the scroll lock is on.

use crate::dom::{Document, MemoryDocument};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const SNAPSHOT_CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem; }
div { border: 1px solid #ccc; margin: .25rem 0; padding: .5rem; }
.front { border-color: #111; font-weight: bold; }
.middle { border-color: #666; }
.back { border-color: #aaa; }
.modal { display: none; }
.modal.active { display: block; background: #f5f5f5; }
code { color: #666; font-size: .85em; margin-left: .5rem; }
"#;

/// Render the document as a standalone HTML page.
pub fn render_snapshot(doc: &MemoryDocument, title: &str) -> Markup {
    let overflow = doc.body_overflow();
    let body_style = overflow
        .is_locked()
        .then(|| format!("overflow: {}", overflow.as_css()));

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { (title) }
                style { (PreEscaped(SNAPSHOT_CSS)) }
            }
            body style=[body_style] {
                @for el in doc.elements() {
                    @let classes = doc.classes(el).join(" ");
                    div id=[doc.element_id(el)] class=(classes) {
                        @if let Some(label) = doc.label(el) {
                            (label)
                        }
                        code { "." (classes.replace(' ', ".")) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Overflow;

    #[test]
    fn renders_ids_classes_and_labels() {
        let mut doc = MemoryDocument::default();
        let card = doc.push(Some("card-1"), &["stack-card"]);
        doc.add_class(card, "front");
        let html = render_snapshot(&doc, "Home").into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains(r#"id="card-1""#));
        assert!(html.contains(r#"class="stack-card front""#));
        assert!(html.contains(".stack-card.front"));
        assert!(!html.contains("overflow: hidden"));
    }

    #[test]
    fn locked_body_carries_overflow_style() {
        let mut doc = MemoryDocument::default();
        doc.push(Some("m"), &["modal", "active"]);
        doc.set_body_overflow(Overflow::Hidden);
        let html = render_snapshot(&doc, "x").into_string();
        assert!(html.contains(r#"<body style="overflow: hidden">"#));
    }

    #[test]
    fn element_without_id_has_no_id_attribute() {
        let mut doc = MemoryDocument::default();
        doc.push(None, &["spacer"]);
        let html = render_snapshot(&doc, "x").into_string();
        assert!(html.contains(r#"<div class="spacer">"#));
    }

    #[test]
    fn labels_are_escaped() {
        let spec: crate::dom::PageSpec = toml::from_str(
            r#"
[[elements]]
label = "<b>Sale</b>"
"#,
        )
        .unwrap();
        let doc = MemoryDocument::from_spec(&spec).unwrap();
        let html = render_snapshot(&doc, "x").into_string();
        assert!(html.contains("&lt;b&gt;Sale&lt;/b&gt;"));
    }
}
