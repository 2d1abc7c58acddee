//! Shared test utilities for the pagewire test suite.
//!
//! Provides document builders, role lookups, and fixture loading that work
//! with the in-memory DOM ([`MemoryDocument`]).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (mut doc, cards) = card_document(4);
//! let mut state = CarouselState::new(cards.clone());
//! state.tick(&mut doc, &RoleClasses::default());
//!
//! assert_eq!(cards_with_class(&doc, &cards, "front"), vec![0]);
//! ```

use std::path::{Path, PathBuf};

use crate::dom::{Document, ElementRef, MemoryDocument, PageSpec};

// =========================================================================
// Fixture setup
// =========================================================================

/// Path to a file under `fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

/// Load `fixtures/<name>` as a page description. Panics on failure.
pub fn load_fixture_page(name: &str) -> PageSpec {
    let path = fixture_path(name);
    PageSpec::load(&path).unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}

// =========================================================================
// Document builders
// =========================================================================

/// A document holding `n` carousel cards (`card-0`, `card-1`, ...) and
/// nothing else.
pub fn card_document(n: usize) -> (MemoryDocument, Vec<ElementRef>) {
    let mut doc = MemoryDocument::default();
    let cards = (0..n)
        .map(|i| doc.push(Some(format!("card-{i}").as_str()), &["stack-card"]))
        .collect();
    (doc, cards)
}

// =========================================================================
// Lookups
// =========================================================================

/// Positions (within `cards`) of the cards carrying `class`.
pub fn cards_with_class(doc: &MemoryDocument, cards: &[ElementRef], class: &str) -> Vec<usize> {
    cards
        .iter()
        .enumerate()
        .filter(|(_, el)| doc.has_class(**el, class))
        .map(|(i, _)| i)
        .collect()
}

/// Ids of every element carrying `class`, in document order.
pub fn ids_with_class(doc: &MemoryDocument, class: &str) -> Vec<String> {
    doc.query_all(&[class])
        .into_iter()
        .filter_map(|el| doc.element_id(el).map(str::to_string))
        .collect()
}
