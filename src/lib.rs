//! # pagewire
//!
//! Page behaviors for a static marketing site, with the host page abstracted
//! away. After load, the host hands the library its document, a timer source
//! and a key-press stream; the library wires up:
//!
//! - a **stacked hero carousel** that rotates front/middle/back role markers
//!   across a fixed list of cards on a fixed period (4 s by default)
//! - a **modal controller** that opens and closes overlays by id, owns the
//!   page scroll lock, and closes the displayed modal on Escape
//!
//! Everything else a marketing page does after load (smooth scrolling,
//! reveal-on-scroll, form validation) is one-shot wiring that lives with the
//! host and does not touch this crate's state.
//!
//! # Architecture: Host Traits + Owned Handles
//!
//! ```text
//!   host                         pagewire
//!   ────                         ────────
//!   Document      ─────────────▶ CarouselEngine  (owns a PeriodicTask)
//!   Scheduler     ─────────────▶
//!   KeyboardTarget ────────────▶ InstalledModals (owns a KeyListenerGuard)
//! ```
//!
//! The host's primitives are traits ([`dom::Document`],
//! [`scheduler::Scheduler`], [`events::KeyboardTarget`]). Startup returns owned
//! handles instead of installing global callables: UI wiring receives the
//! modal controller by reference, and dropping a handle releases the timer or
//! listener it holds.
//!
//! In-memory implementations of all three traits ([`dom::MemoryDocument`],
//! [`scheduler::VirtualClock`], [`events::EventBus`]) make the behaviors fully
//! deterministic. The [`simulate`] module and the `pagewire` binary use them
//! to replay scripted timelines against a page description.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`carousel`] | Role rotation over the hero cards, driven by a periodic task |
//! | [`modal`] | Open/close by id, cancellation key, scroll-lock policy |
//! | [`init`] | Startup entry points; absorbs and logs startup failures |
//! | [`dom`] | `Document` trait, in-memory document, page description format |
//! | [`scheduler`] | `Scheduler` trait, `PeriodicTask` guard, `VirtualClock` |
//! | [`events`] | Key events, `KeyboardTarget` trait, `EventBus` |
//! | [`config`] | `pagewire.toml` loading, merging and validation |
//! | [`simulate`] | Scripted timeline runner over the in-memory host |
//! | [`snapshot`] | HTML rendering of a page state via Maud |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Scroll Lock Policy
//!
//! Closing any modal unlocks page scrolling, even when another modal is still
//! displayed. Sites built against that behavior keep it by default
//! ([`config::ScrollLockPolicy::Unconditional`]). Setting
//! `scroll_lock = "ref-counted"` switches to an explicit open-modal registry
//! that unlocks only when the last modal closes.
//!
//! ## Silent Misses
//!
//! An unknown modal id is not an error for the page: nothing changes and
//! nothing is logged at the default level. The controller still returns
//! [`modal::ModalError::NotFound`] so callers and tests can tell a typo from
//! a success.
//!
//! ## Single-Threaded by Construction
//!
//! Browsers run timers and key handlers on one event loop. Shared state is
//! `Rc<RefCell<_>>`, never `Arc<Mutex<_>>`: each callback runs to completion
//! before the next one starts, so borrows never overlap.

pub mod carousel;
pub mod config;
pub mod dom;
pub mod events;
pub mod init;
pub mod modal;
pub mod output;
pub mod scheduler;
pub mod simulate;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_helpers;
