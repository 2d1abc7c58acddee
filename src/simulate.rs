//! Scripted timeline runner.
//!
//! Builds an in-memory page, starts the behaviors on it exactly as a host
//! would at load time, then replays a script of timer advances, modal calls
//! and key presses, recording the visible state after every step.
//!
//! ## Script Format
//!
//! ```toml
//! [[steps]]
//! advance = { ms = 4000 }      # let virtual time pass (timers fire)
//!
//! [[steps]]
//! open = { id = "contact" }    # UI wiring calls open_modal
//!
//! [[steps]]
//! close = { id = "contact" }   # UI wiring calls close_modal
//!
//! [[steps]]
//! key = { key = "Escape" }     # global key press
//! ```
//!
//! Unknown ids do not stop the run; they show up as `NotFound` outcomes.

use crate::config::{BehaviorConfig, ConfigError};
use crate::dom::{Document, DomError, MemoryDocument, PageSpec, share};
use crate::events::{EventBus, KeyEvent};
use crate::init::Behaviors;
use crate::modal::ModalError;
use crate::scheduler::VirtualClock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("script parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("page error: {0}")]
    Dom(#[from] DomError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub enum Step {
    Advance { ms: u64 },
    Open { id: String },
    Close { id: String },
    Key { key: String },
}

impl Step {
    pub fn describe(&self) -> String {
        match self {
            Step::Advance { ms } => format!("advance {ms}ms"),
            Step::Open { id } => format!("open {id}"),
            Step::Close { id } => format!("close {id}"),
            Step::Key { key } => format!("key {key}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, SimulateError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Timer callbacks fired while time advanced.
    Ticks(usize),
    Opened,
    Closed,
    NotFound(String),
    /// Modals closed by a key press (empty if the key did nothing).
    KeyPressed(Vec<String>),
    /// The modal controller is not installed.
    Inactive,
}

/// Ids holding each carousel role; several entries mean aliasing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleSnapshot {
    pub front: Vec<String>,
    pub middle: Vec<String>,
    pub back: Vec<String>,
}

/// Visible state after one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// 1-based position in the script.
    pub index: usize,
    pub step: Step,
    pub outcome: Outcome,
    pub elapsed_ms: u128,
    pub roles: RoleSnapshot,
    pub open_modals: Vec<String>,
    pub scroll_locked: bool,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub reports: Vec<StepReport>,
    /// Page state after the last step.
    pub document: MemoryDocument,
}

/// Run `script` against `page`.
pub fn simulate(
    page: &PageSpec,
    script: &Script,
    config: &BehaviorConfig,
) -> Result<Simulation, SimulateError> {
    config.validate()?;
    let doc = share(MemoryDocument::from_spec(page)?);
    let clock = VirtualClock::new();
    let bus = EventBus::new();
    let behaviors = Behaviors::init(doc.clone(), clock.clone(), bus.clone(), config);

    let mut reports = Vec::with_capacity(script.steps.len());
    for (i, step) in script.steps.iter().enumerate() {
        let outcome = match (step, behaviors.modals.as_ref()) {
            (Step::Advance { ms }, _) => {
                Outcome::Ticks(clock.advance(Duration::from_millis(*ms)))
            }
            (Step::Open { id }, Some(modals)) => {
                modal_outcome(modals.open_modal(id), Outcome::Opened)
            }
            (Step::Close { id }, Some(modals)) => {
                modal_outcome(modals.close_modal(id), Outcome::Closed)
            }
            (Step::Key { key }, Some(modals)) => {
                let before = modals.active_modals();
                bus.dispatch(&KeyEvent::new(key.clone()));
                let after = modals.active_modals();
                let closed = before.into_iter().filter(|id| !after.contains(id));
                Outcome::KeyPressed(closed.collect())
            }
            (_, None) => Outcome::Inactive,
        };

        let page_state = doc.borrow();
        let report = StepReport {
            index: i + 1,
            step: step.clone(),
            outcome,
            elapsed_ms: clock.now().as_millis(),
            roles: role_snapshot(&page_state, config),
            open_modals: behaviors
                .modals
                .as_ref()
                .map(|m| m.active_modals())
                .unwrap_or_default(),
            scroll_locked: page_state.body_overflow().is_locked(),
        };
        tracing::debug!(step = report.index, action = %step.describe(), "simulate: step done");
        reports.push(report);
    }

    let document = doc.borrow().clone();
    Ok(Simulation { reports, document })
}

fn modal_outcome(result: Result<(), ModalError>, ok: Outcome) -> Outcome {
    match result {
        Ok(()) => ok,
        Err(ModalError::NotFound(id)) => Outcome::NotFound(id),
    }
}

/// Read the role markers currently on the carousel cards.
pub fn role_snapshot(doc: &MemoryDocument, config: &BehaviorConfig) -> RoleSnapshot {
    let roles = &config.carousel.roles;
    let holders = |class: &str| -> Vec<String> {
        doc.query_all(&[config.carousel.card_class.as_str(), class])
            .into_iter()
            .map(|el| {
                doc.element_id(el)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", el.index()))
            })
            .collect()
    };
    RoleSnapshot {
        front: holders(&roles.front),
        middle: holders(&roles.middle),
        back: holders(&roles.back),
    }
}
