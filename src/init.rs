//! Startup entry points.
//!
//! The host calls these once, when the document becomes interactive. Each
//! returns the owned handle of what it started; the host keeps the handles
//! alive for as long as the page is shown and drops them on teardown.
//!
//! [`Behaviors::init`] runs both. A failure while starting one behavior is
//! logged and that behavior is skipped; it never aborts the other one and
//! never reaches the caller.

use crate::carousel::CarouselEngine;
use crate::config::BehaviorConfig;
use crate::dom::SharedDocument;
use crate::events::KeyboardTarget;
use crate::modal::{InstalledModals, ModalController};
use crate::scheduler::Scheduler;
use std::rc::Rc;

/// Find the hero cards and start rotating them.
pub fn init_hero_carousel(
    doc: SharedDocument,
    scheduler: Rc<dyn Scheduler>,
    config: &BehaviorConfig,
) -> CarouselEngine {
    let cards = doc.borrow().query_all(&[config.carousel.card_class.as_str()]);
    CarouselEngine::start(doc, scheduler, cards, &config.carousel)
}

/// Create the modal controller and listen for the cancellation key.
pub fn init_modals(
    doc: SharedDocument,
    keyboard: Rc<dyn KeyboardTarget>,
    config: &BehaviorConfig,
) -> InstalledModals {
    ModalController::new(doc, &config.modals).install(keyboard)
}

/// Everything started at page load.
#[derive(Debug)]
pub struct Behaviors {
    pub carousel: Option<CarouselEngine>,
    pub modals: Option<InstalledModals>,
}

impl Behaviors {
    /// Start the carousel and the modal controller.
    ///
    /// An invalid configuration is logged and leaves both behaviors off.
    pub fn init(
        doc: SharedDocument,
        scheduler: Rc<dyn Scheduler>,
        keyboard: Rc<dyn KeyboardTarget>,
        config: &BehaviorConfig,
    ) -> Self {
        if let Err(e) = config.validate() {
            tracing::error!("page behaviors not started: {e}");
            return Self {
                carousel: None,
                modals: None,
            };
        }
        let carousel = init_hero_carousel(doc.clone(), scheduler, config);
        let modals = init_modals(doc, keyboard, config);
        tracing::info!(
            cards = carousel.card_count(),
            carousel_running = carousel.is_running(),
            "page behaviors started"
        );
        Self {
            carousel: Some(carousel),
            modals: Some(modals),
        }
    }

    /// Stop the carousel and uninstall the modal key listener.
    pub fn teardown(&mut self) {
        if let Some(mut carousel) = self.carousel.take() {
            carousel.stop();
        }
        self.modals = None;
    }
}
