//! Modal overlay controller.
//!
//! Each modal is an element with the modal class; it is displayed while it
//! carries the active class. Per id the lifecycle is a two-state machine:
//!
//! ```text
//!            open_modal(id)  [scroll lock on]
//!   Closed ─────────────────────────────────▶ Open
//!      ▲                                        │
//!      └────────────────────────────────────────┘
//!            close_modal(id) [scroll lock off*]
//! ```
//!
//! `*` depends on [`ScrollLockPolicy`]:
//!
//! - `Unconditional`: every close unlocks page scrolling, even while another
//!   modal is still open.
//! - `RefCounted`: the controller keeps a registry of the modals it opened
//!   and unlocks only once none of them is open.
//!
//! Nothing stops several modals being open at once. The cancellation key
//! closes the first open modal in document order, one per key press.
//!
//! Unknown ids are reported as [`ModalError::NotFound`] and leave the page
//! untouched. UI wiring that wants fire-and-forget calls can ignore the result.

use crate::config::{ModalConfig, ScrollLockPolicy};
use crate::dom::{Overflow, SharedDocument};
use crate::events::{KeyEvent, KeyListenerGuard, KeyboardTarget};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModalError {
    #[error("no element with id '{0}'")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open,
}

/// Opens and closes modals by id and owns the page scroll lock.
pub struct ModalController {
    doc: SharedDocument,
    config: ModalConfig,
    registry: RefCell<BTreeMap<String, ModalState>>,
}

impl fmt::Debug for ModalController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalController")
            .field("config", &self.config)
            .field("registry", &self.registry.borrow())
            .finish_non_exhaustive()
    }
}

impl ModalController {
    pub fn new(doc: SharedDocument, config: &ModalConfig) -> Self {
        Self {
            doc,
            config: config.clone(),
            registry: RefCell::new(BTreeMap::new()),
        }
    }

    /// Share the controller and listen for the cancellation key.
    ///
    /// The listener holds a weak reference, so dropping the returned
    /// [`InstalledModals`] both removes the listener and frees the controller.
    pub fn install(self, keyboard: Rc<dyn KeyboardTarget>) -> InstalledModals {
        let controller = Rc::new(self);
        let weak: Weak<ModalController> = Rc::downgrade(&controller);
        let listener = KeyListenerGuard::register(
            keyboard,
            Box::new(move |event: &KeyEvent| {
                if let Some(controller) = weak.upgrade() {
                    controller.handle_key(event);
                }
            }),
        );
        tracing::debug!(cancel_key = %controller.config.cancel_key, "modals: installed");
        InstalledModals {
            controller,
            _listener: listener,
        }
    }

    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    /// Mark `id` active and lock page scrolling.
    ///
    /// Opening an already-open modal is harmless.
    pub fn open_modal(&self, id: &str) -> Result<(), ModalError> {
        let mut doc = self.doc.borrow_mut();
        let Some(el) = doc.get_element_by_id(id) else {
            tracing::trace!(id, "modals: open target not found");
            return Err(ModalError::NotFound(id.to_string()));
        };
        doc.add_class(el, &self.config.active_class);
        self.registry
            .borrow_mut()
            .insert(id.to_string(), ModalState::Open);
        doc.set_body_overflow(Overflow::Hidden);
        tracing::debug!(id, "modals: opened");
        Ok(())
    }

    /// Clear the active marker on `id` and release the scroll lock according
    /// to the configured [`ScrollLockPolicy`].
    pub fn close_modal(&self, id: &str) -> Result<(), ModalError> {
        let mut doc = self.doc.borrow_mut();
        let Some(el) = doc.get_element_by_id(id) else {
            tracing::trace!(id, "modals: close target not found");
            return Err(ModalError::NotFound(id.to_string()));
        };
        doc.remove_class(el, &self.config.active_class);
        self.registry
            .borrow_mut()
            .insert(id.to_string(), ModalState::Closed);

        let unlock = match self.config.scroll_lock {
            ScrollLockPolicy::Unconditional => true,
            ScrollLockPolicy::RefCounted => self.open_count() == 0,
        };
        if unlock {
            doc.set_body_overflow(Overflow::Auto);
        }
        tracing::debug!(id, unlocked = unlock, "modals: closed");
        Ok(())
    }

    /// React to a key press: the cancellation key closes the first open modal.
    ///
    /// Returns the id that was closed. Any other key, no open modal, or an
    /// open modal without an id leaves the page untouched.
    pub fn handle_key(&self, event: &KeyEvent) -> Option<String> {
        if event.key != self.config.cancel_key {
            return None;
        }
        let id = {
            let doc = self.doc.borrow();
            let el = doc.query_first(&self.active_selector())?;
            doc.element_id(el).map(str::to_string)
        };
        let Some(id) = id else {
            tracing::trace!("modals: active modal has no id, nothing to close");
            return None;
        };
        self.close_modal(&id).ok().map(|()| id)
    }

    /// Current state of `id`, read from its active marker.
    pub fn state(&self, id: &str) -> Result<ModalState, ModalError> {
        let doc = self.doc.borrow();
        let el = doc
            .get_element_by_id(id)
            .ok_or_else(|| ModalError::NotFound(id.to_string()))?;
        if doc.has_class(el, &self.config.active_class) {
            Ok(ModalState::Open)
        } else {
            Ok(ModalState::Closed)
        }
    }

    /// Ids of every displayed modal, in document order.
    pub fn active_modals(&self) -> Vec<String> {
        let doc = self.doc.borrow();
        doc.query_all(&self.active_selector())
            .into_iter()
            .filter_map(|el| doc.element_id(el).map(str::to_string))
            .collect()
    }

    /// Number of modals this controller opened and has not closed since.
    pub fn open_count(&self) -> usize {
        self.registry
            .borrow()
            .values()
            .filter(|s| **s == ModalState::Open)
            .count()
    }

    fn active_selector(&self) -> [&str; 2] {
        [&self.config.modal_class, &self.config.active_class]
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.doc.borrow().body_overflow().is_locked()
    }
}

/// An installed [`ModalController`]: the handle UI wiring calls
/// `open_modal`/`close_modal` on. Dropping it uninstalls the key listener.
#[derive(Debug)]
pub struct InstalledModals {
    controller: Rc<ModalController>,
    _listener: KeyListenerGuard,
}

impl InstalledModals {
    /// Another handle to the controller, for wiring that outlives this borrow.
    pub fn controller(&self) -> Rc<ModalController> {
        self.controller.clone()
    }
}

impl Deref for InstalledModals {
    type Target = ModalController;

    fn deref(&self) -> &ModalController {
        &self.controller
    }
}
