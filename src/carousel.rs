//! Stacked hero carousel.
//!
//! A fixed, ordered list of cards rotates through three visual roles. On every
//! tick the card at `current_index` becomes the front card, the next one the
//! middle card, the one after that the back card, and the index advances:
//!
//! ```text
//! tick 1:  [front] [middle] [back] [ -- ]
//! tick 2:  [ -- ] [front] [middle] [back]
//! tick 3:  [back] [ -- ] [front] [middle]
//! ```
//!
//! Cards beyond the first three positions carry no role marker and are left
//! to the stylesheet to hide.
//!
//! ## Small stacks
//!
//! Role indices wrap modulo the card count, so with fewer than three cards
//! several roles land on the same card. Markers are assigned front, middle,
//! back in that order, and the stylesheet decides which combination wins:
//!
//! - one card carries `front middle back` at once
//! - with two cards, front and back share a card and middle lands on the other
//!
//! ## Lifecycle
//!
//! [`CarouselEngine::start`] schedules a [`PeriodicTask`]; nothing is marked
//! until the first tick fires. The engine owns the task: [`CarouselEngine::stop`]
//! or dropping the engine clears the interval. An empty card list schedules
//! nothing.

use crate::config::{CarouselConfig, RoleClasses};
use crate::dom::{Document, ElementRef, SharedDocument};
use crate::scheduler::{PeriodicTask, Scheduler};
use std::cell::RefCell;
use std::rc::Rc;

/// Visual role of a card within the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Front,
    Middle,
    Back,
}

impl Role {
    /// All roles in assignment order.
    pub const ALL: [Role; 3] = [Role::Front, Role::Middle, Role::Back];

    /// Offset from the current index.
    pub fn offset(self) -> usize {
        match self {
            Role::Front => 0,
            Role::Middle => 1,
            Role::Back => 2,
        }
    }

    pub fn class_name(self, classes: &RoleClasses) -> &str {
        match self {
            Role::Front => &classes.front,
            Role::Middle => &classes.middle,
            Role::Back => &classes.back,
        }
    }
}

/// Card positions for the front, middle and back roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleIndices {
    pub front: usize,
    pub middle: usize,
    pub back: usize,
}

impl RoleIndices {
    pub fn get(&self, role: Role) -> usize {
        match role {
            Role::Front => self.front,
            Role::Middle => self.middle,
            Role::Back => self.back,
        }
    }
}

/// Compute which card takes each role when `current` is at the front.
///
/// Returns `None` for an empty stack.
pub fn role_indices(current: usize, n: usize) -> Option<RoleIndices> {
    if n == 0 {
        return None;
    }
    Some(RoleIndices {
        front: current % n,
        middle: (current + 1) % n,
        back: (current + 2) % n,
    })
}

/// Rotation state: the cards and the position of the next front card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselState {
    cards: Vec<ElementRef>,
    current_index: usize,
}

impl CarouselState {
    pub fn new(cards: Vec<ElementRef>) -> Self {
        Self {
            cards,
            current_index: 0,
        }
    }

    pub fn cards(&self) -> &[ElementRef] {
        &self.cards
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Reassign role markers and advance the index.
    ///
    /// No-op on an empty stack.
    pub fn tick(&mut self, doc: &mut dyn Document, classes: &RoleClasses) {
        let Some(indices) = role_indices(self.current_index, self.cards.len()) else {
            return;
        };

        for &card in &self.cards {
            for role in Role::ALL {
                doc.remove_class(card, role.class_name(classes));
            }
        }

        for role in Role::ALL {
            doc.add_class(self.cards[indices.get(role)], role.class_name(classes));
        }

        self.current_index = (self.current_index + 1) % self.cards.len();
    }
}

/// A running (or stopped) carousel bound to a document and a scheduler.
#[derive(Debug)]
pub struct CarouselEngine {
    state: Rc<RefCell<CarouselState>>,
    task: Option<PeriodicTask>,
}

impl CarouselEngine {
    /// Start rotating `cards` every `config.interval_ms`.
    ///
    /// With no cards the engine is created stopped and nothing is scheduled.
    pub fn start(
        doc: SharedDocument,
        scheduler: Rc<dyn Scheduler>,
        cards: Vec<ElementRef>,
        config: &CarouselConfig,
    ) -> Self {
        let state = Rc::new(RefCell::new(CarouselState::new(cards)));
        let card_count = state.borrow().cards.len();
        if card_count == 0 {
            tracing::debug!("carousel: no cards, not scheduling");
            return Self { state, task: None };
        }

        let roles = config.roles.clone();
        let tick_state = state.clone();
        let task = PeriodicTask::start(scheduler, config.interval(), move || {
            tick_state
                .borrow_mut()
                .tick(&mut *doc.borrow_mut(), &roles);
        });
        tracing::debug!(
            cards = card_count,
            interval_ms = config.interval_ms,
            "carousel: started"
        );
        Self {
            state,
            task: Some(task),
        }
    }

    /// Clear the periodic schedule. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
            tracing::debug!("carousel: stopped");
        }
    }

    /// Whether the engine holds a live interval; see [`PeriodicTask::is_active`].
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(PeriodicTask::is_active)
    }

    pub fn current_index(&self) -> usize {
        self.state.borrow().current_index
    }

    pub fn card_count(&self) -> usize {
        self.state.borrow().cards.len()
    }

    /// Snapshot of the rotation state.
    pub fn state(&self) -> CarouselState {
        self.state.borrow().clone()
    }
}
