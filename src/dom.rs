//! Host document abstraction.
//!
//! The behaviors in this crate never talk to a browser directly. Everything
//! they need from the page goes through the [`Document`] trait:
//!
//! - element lookup by id (`getElementById`)
//! - class-based queries in document order (`querySelectorAll(".a.b")`)
//! - class list mutation (`classList.add/remove/contains`)
//! - the document-level `overflow` style used as the scroll lock
//!
//! [`MemoryDocument`] is the in-memory implementation. It is built from a
//! [`PageSpec`], a flat list of elements loaded from TOML or JSON:
//!
//! ```toml
//! [[elements]]
//! id = "card-1"
//! classes = ["stack-card"]
//! label = "Ship faster"
//!
//! [[elements]]
//! id = "contact"
//! classes = ["modal"]
//! ```
//!
//! Document order is the order of the `elements` list.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate element id '{0}'")]
    DuplicateId(String),
    #[error("invalid class name '{0}' on element {1}")]
    InvalidClass(String, usize),
}

/// Opaque handle to one element of a [`Document`].
///
/// Handles are only meaningful for the document that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef(usize);

impl ElementRef {
    /// Position of the element in document order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Value of the document-level `overflow` style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Default page scrolling.
    #[default]
    Auto,
    /// Scrolling suppressed (a modal is displayed).
    Hidden,
}

impl Overflow {
    pub fn is_locked(self) -> bool {
        self == Overflow::Hidden
    }

    pub fn as_css(self) -> &'static str {
        match self {
            Overflow::Auto => "auto",
            Overflow::Hidden => "hidden",
        }
    }
}

/// The slice of the DOM the behaviors depend on.
pub trait Document {
    /// Look up an element by its `id` attribute.
    fn get_element_by_id(&self, id: &str) -> Option<ElementRef>;

    /// Every element carrying all of `classes`, in document order.
    fn query_all(&self, classes: &[&str]) -> Vec<ElementRef>;

    /// First element carrying all of `classes`.
    fn query_first(&self, classes: &[&str]) -> Option<ElementRef> {
        self.query_all(classes).into_iter().next()
    }

    /// The element's `id` attribute, if it has one.
    fn element_id(&self, el: ElementRef) -> Option<&str>;

    fn add_class(&mut self, el: ElementRef, class: &str);

    /// Removing a class the element does not carry is a no-op.
    fn remove_class(&mut self, el: ElementRef, class: &str);

    fn has_class(&self, el: ElementRef, class: &str) -> bool;

    fn set_body_overflow(&mut self, overflow: Overflow);

    fn body_overflow(&self) -> Overflow;
}

/// Shared, single-threaded handle to a document.
///
/// Timer and key callbacks each hold one of these; all of them run on the
/// host's event loop, so a `RefCell` borrow never overlaps another.
pub type SharedDocument = Rc<RefCell<dyn Document>>;

/// Wrap a concrete document for sharing with callbacks.
pub fn share<D: Document + 'static>(doc: D) -> Rc<RefCell<D>> {
    Rc::new(RefCell::new(doc))
}

// ============================================================================
// Page description
// ============================================================================

/// Declarative page layout used to build a [`MemoryDocument`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageSpec {
    /// Optional page title, used by the HTML snapshot.
    #[serde(default)]
    pub title: Option<String>,
    /// Elements in document order.
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// Text content shown in snapshots and reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PageSpec {
    /// Load a page from a `.toml` or `.json` file (by extension, TOML otherwise).
    pub fn load(path: &Path) -> Result<Self, DomError> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Ok(toml::from_str(&content)?),
        }
    }
}

// ============================================================================
// In-memory document
// ============================================================================

#[derive(Debug, Clone)]
struct Node {
    id: Option<String>,
    label: Option<String>,
    classes: BTreeSet<String>,
    /// Insertion order of classes, for stable `class=""` rendering.
    order: Vec<String>,
}

/// In-memory [`Document`].
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    title: Option<String>,
    nodes: Vec<Node>,
    ids: HashMap<String, usize>,
    overflow: Overflow,
}

impl MemoryDocument {
    /// Build a document from a page description.
    ///
    /// Fails on duplicate ids and on class names that are empty or contain
    /// whitespace (they could never be matched by a class query).
    pub fn from_spec(spec: &PageSpec) -> Result<Self, DomError> {
        let mut doc = MemoryDocument {
            title: spec.title.clone(),
            ..Default::default()
        };
        for (index, el) in spec.elements.iter().enumerate() {
            for class in &el.classes {
                if class.is_empty() || class.chars().any(char::is_whitespace) {
                    return Err(DomError::InvalidClass(class.clone(), index));
                }
            }
            if let Some(id) = &el.id {
                if doc.ids.insert(id.clone(), index).is_some() {
                    return Err(DomError::DuplicateId(id.clone()));
                }
            }
            let mut node = Node {
                id: el.id.clone(),
                label: el.label.clone(),
                classes: BTreeSet::new(),
                order: Vec::new(),
            };
            for class in &el.classes {
                if node.classes.insert(class.clone()) {
                    node.order.push(class.clone());
                }
            }
            doc.nodes.push(node);
        }
        Ok(doc)
    }

    /// Append an element and return its handle. Used by tests and builders.
    pub fn push(&mut self, id: Option<&str>, classes: &[&str]) -> ElementRef {
        let index = self.nodes.len();
        let mut node = Node {
            id: id.map(str::to_string),
            label: None,
            classes: BTreeSet::new(),
            order: Vec::new(),
        };
        for class in classes {
            if node.classes.insert(class.to_string()) {
                node.order.push(class.to_string());
            }
        }
        if let Some(id) = id {
            self.ids.insert(id.to_string(), index);
        }
        self.nodes.push(node);
        ElementRef(index)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef> + '_ {
        (0..self.nodes.len()).map(ElementRef)
    }

    /// Class list in the order classes were added.
    pub fn classes(&self, el: ElementRef) -> &[String] {
        self.nodes
            .get(el.0)
            .map(|n| n.order.as_slice())
            .unwrap_or(&[])
    }

    pub fn label(&self, el: ElementRef) -> Option<&str> {
        self.nodes.get(el.0).and_then(|n| n.label.as_deref())
    }
}

impl Document for MemoryDocument {
    fn get_element_by_id(&self, id: &str) -> Option<ElementRef> {
        self.ids.get(id).copied().map(ElementRef)
    }

    fn query_all(&self, classes: &[&str]) -> Vec<ElementRef> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| classes.iter().all(|c| n.classes.contains(*c)))
            .map(|(i, _)| ElementRef(i))
            .collect()
    }

    fn element_id(&self, el: ElementRef) -> Option<&str> {
        self.nodes.get(el.0).and_then(|n| n.id.as_deref())
    }

    fn add_class(&mut self, el: ElementRef, class: &str) {
        if let Some(node) = self.nodes.get_mut(el.0) {
            if node.classes.insert(class.to_string()) {
                node.order.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, el: ElementRef, class: &str) {
        if let Some(node) = self.nodes.get_mut(el.0) {
            if node.classes.remove(class) {
                node.order.retain(|c| c != class);
            }
        }
    }

    fn has_class(&self, el: ElementRef, class: &str) -> bool {
        self.nodes
            .get(el.0)
            .is_some_and(|n| n.classes.contains(class))
    }

    fn set_body_overflow(&mut self, overflow: Overflow) {
        self.overflow = overflow;
    }

    fn body_overflow(&self) -> Overflow {
        self.overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(toml_src: &str) -> MemoryDocument {
        let spec: PageSpec = toml::from_str(toml_src).unwrap();
        MemoryDocument::from_spec(&spec).unwrap()
    }

    #[test]
    fn lookup_by_id() {
        let doc = page(
            r#"
[[elements]]
id = "a"
[[elements]]
id = "b"
classes = ["modal"]
"#,
        );
        let b = doc.get_element_by_id("b").unwrap();
        assert_eq!(b.index(), 1);
        assert_eq!(doc.element_id(b), Some("b"));
        assert!(doc.get_element_by_id("missing").is_none());
    }

    #[test]
    fn query_all_requires_every_class_and_keeps_document_order() {
        let doc = page(
            r#"
[[elements]]
classes = ["modal", "active"]
[[elements]]
classes = ["modal"]
[[elements]]
classes = ["active", "modal", "wide"]
"#,
        );
        let found: Vec<usize> = doc
            .query_all(&["modal", "active"])
            .into_iter()
            .map(ElementRef::index)
            .collect();
        assert_eq!(found, vec![0, 2]);
        assert_eq!(doc.query_first(&["wide"]).map(ElementRef::index), Some(2));
        assert_eq!(doc.query_all(&["modal"]).len(), 3);
    }

    #[test]
    fn add_and_remove_class_are_idempotent() {
        let mut doc = MemoryDocument::default();
        let el = doc.push(Some("x"), &["card"]);
        doc.add_class(el, "front");
        doc.add_class(el, "front");
        assert_eq!(doc.classes(el), ["card", "front"]);
        doc.remove_class(el, "front");
        doc.remove_class(el, "front");
        doc.remove_class(el, "never-there");
        assert_eq!(doc.classes(el), ["card"]);
        assert!(!doc.has_class(el, "front"));
    }

    #[test]
    fn overflow_defaults_to_auto() {
        let mut doc = MemoryDocument::default();
        assert_eq!(doc.body_overflow(), Overflow::Auto);
        doc.set_body_overflow(Overflow::Hidden);
        assert!(doc.body_overflow().is_locked());
        assert_eq!(doc.body_overflow().as_css(), "hidden");
    }

    #[test]
    fn duplicate_ids_rejected() {
        let spec: PageSpec = toml::from_str(
            r#"
[[elements]]
id = "dup"
[[elements]]
id = "dup"
"#,
        )
        .unwrap();
        let err = MemoryDocument::from_spec(&spec).unwrap_err();
        assert!(matches!(err, DomError::DuplicateId(id) if id == "dup"));
    }

    #[test]
    fn whitespace_class_rejected() {
        let spec = PageSpec {
            title: None,
            elements: vec![ElementSpec {
                id: None,
                classes: vec!["two words".to_string()],
                label: None,
            }],
        };
        assert!(matches!(
            MemoryDocument::from_spec(&spec),
            Err(DomError::InvalidClass(_, 0))
        ));
    }

    #[test]
    fn unknown_element_key_rejected() {
        let result: Result<PageSpec, _> = toml::from_str(
            r#"
[[elements]]
id = "a"
clases = ["typo"]
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn load_page_from_json_and_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let json_path = tmp.path().join("page.json");
        fs::write(
            &json_path,
            r#"{"title": "Home", "elements": [{"id": "a", "classes": ["modal"]}]}"#,
        )
        .unwrap();
        let spec = PageSpec::load(&json_path).unwrap();
        assert_eq!(spec.title.as_deref(), Some("Home"));
        assert_eq!(spec.elements.len(), 1);

        let toml_path = tmp.path().join("page.toml");
        fs::write(&toml_path, "[[elements]]\nid = \"b\"\n").unwrap();
        let spec = PageSpec::load(&toml_path).unwrap();
        assert_eq!(spec.elements[0].id.as_deref(), Some("b"));
    }

    #[test]
    fn shared_document_coerces_to_trait_object() {
        let doc = share(MemoryDocument::default());
        let shared: SharedDocument = doc.clone();
        shared.borrow_mut().set_body_overflow(Overflow::Hidden);
        assert!(doc.borrow().body_overflow().is_locked());
    }
}
