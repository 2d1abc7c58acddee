//! CLI output formatting.
//!
//! # Step Display Contract
//!
//! Every scripted step prints a header line with its 1-based position, the
//! action, and what happened, followed by indented context lines describing
//! the page after the step:
//!
//! ```text
//! 001 advance 4000ms → 1 tick
//!     Time: 4000ms
//!     Roles: front=card-1 middle=card-2 back=card-3
//!     Modals: none
//!     Scroll: unlocked
//! 002 open contact → opened
//!     Time: 4000ms
//!     Roles: front=card-1 middle=card-2 back=card-3
//!     Modals: contact
//!     Scroll: locked
//! ```
//!
//! ## Check
//!
//! ```text
//! Page: Northwind Analytics
//! Carousel (4 cards, every 4000ms)
//!     001 card-1 Live revenue
//!     002 card-2 Churn forecast
//! Modals
//!     001 contact Talk to sales
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::config::BehaviorConfig;
use crate::dom::{Document, MemoryDocument};
use crate::simulate::{Outcome, RoleSnapshot, Simulation, StepReport};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn format_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Ticks(1) => "1 tick".to_string(),
        Outcome::Ticks(n) => format!("{n} ticks"),
        Outcome::Opened => "opened".to_string(),
        Outcome::Closed => "closed".to_string(),
        Outcome::NotFound(id) => format!("not found: {id}"),
        Outcome::KeyPressed(closed) if closed.is_empty() => "no effect".to_string(),
        Outcome::KeyPressed(closed) => format!("closed {}", closed.join(", ")),
        Outcome::Inactive => "modals not installed".to_string(),
    }
}

/// `front=a middle=b back=c`; aliased roles repeat the id, missing roles show `-`.
fn format_roles(roles: &RoleSnapshot) -> String {
    let show = |ids: &[String]| -> String {
        if ids.is_empty() {
            "-".to_string()
        } else {
            ids.join("+")
        }
    };
    format!(
        "front={} middle={} back={}",
        show(&roles.front),
        show(&roles.middle),
        show(&roles.back)
    )
}

// ============================================================================
// Simulation output
// ============================================================================

/// Format one step report.
pub fn format_step(report: &StepReport) -> Vec<String> {
    let ctx = indent(1);
    vec![
        format!(
            "{} {} → {}",
            format_index(report.index),
            report.step.describe(),
            format_outcome(&report.outcome)
        ),
        format!("{ctx}Time: {}ms", report.elapsed_ms),
        format!("{ctx}Roles: {}", format_roles(&report.roles)),
        format!("{ctx}Modals: {}", join_or(&report.open_modals, "none")),
        format!(
            "{ctx}Scroll: {}",
            if report.scroll_locked {
                "locked"
            } else {
                "unlocked"
            }
        ),
    ]
}

/// Format a whole simulation run, followed by a one-line summary.
pub fn format_simulation(sim: &Simulation) -> Vec<String> {
    let mut lines: Vec<String> = sim.reports.iter().flat_map(format_step).collect();
    let ticks: usize = sim
        .reports
        .iter()
        .map(|r| match r.outcome {
            Outcome::Ticks(n) => n,
            _ => 0,
        })
        .sum();
    let misses = sim
        .reports
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::NotFound(_)))
        .count();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Ran {} steps, {} ticks, {} unknown ids",
        sim.reports.len(),
        ticks,
        misses
    ));
    lines
}

pub fn print_simulation(sim: &Simulation) {
    for line in format_simulation(sim) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Describe what the behaviors will attach to on this page.
pub fn format_check(doc: &MemoryDocument, config: &BehaviorConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(title) = doc.title() {
        lines.push(format!("Page: {}", title));
    }

    let entry = |pos: usize, el| -> String {
        let id = doc.element_id(el).unwrap_or("(no id)");
        match doc.label(el) {
            Some(label) => format!("{}{} {} {}", indent(1), format_index(pos), id, label),
            None => format!("{}{} {}", indent(1), format_index(pos), id),
        }
    };

    let cards = doc.query_all(&[config.carousel.card_class.as_str()]);
    if cards.is_empty() {
        lines.push(format!(
            "Carousel: no .{} elements, not started",
            config.carousel.card_class
        ));
    } else {
        lines.push(format!(
            "Carousel ({} cards, every {}ms)",
            cards.len(),
            config.carousel.interval_ms
        ));
        for (i, el) in cards.into_iter().enumerate() {
            lines.push(entry(i + 1, el));
        }
    }

    let modals = doc.query_all(&[config.modals.modal_class.as_str()]);
    if modals.is_empty() {
        lines.push(format!("Modals: no .{} elements", config.modals.modal_class));
    } else {
        lines.push("Modals".to_string());
        for (i, el) in modals.into_iter().enumerate() {
            lines.push(entry(i + 1, el));
        }
    }
    lines
}

pub fn print_check(doc: &MemoryDocument, config: &BehaviorConfig) {
    for line in format_check(doc, config) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::Step;
    use crate::test_helpers::*;

    fn report(step: Step, outcome: Outcome) -> StepReport {
        StepReport {
            index: 1,
            step,
            outcome,
            elapsed_ms: 4000,
            roles: RoleSnapshot {
                front: vec!["a".into()],
                middle: vec!["b".into()],
                back: vec!["a".into()],
            },
            open_modals: vec![],
            scroll_locked: false,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn step_lines() {
        let lines = format_step(&report(Step::Advance { ms: 4000 }, Outcome::Ticks(1)));
        assert_eq!(
            lines,
            vec![
                "001 advance 4000ms → 1 tick",
                "    Time: 4000ms",
                "    Roles: front=a middle=b back=a",
                "    Modals: none",
                "    Scroll: unlocked",
            ]
        );
    }

    #[test]
    fn outcome_wording() {
        assert_eq!(format_outcome(&Outcome::Ticks(3)), "3 ticks");
        assert_eq!(
            format_outcome(&Outcome::NotFound("x".into())),
            "not found: x"
        );
        assert_eq!(format_outcome(&Outcome::KeyPressed(vec![])), "no effect");
        assert_eq!(
            format_outcome(&Outcome::KeyPressed(vec!["demo".into()])),
            "closed demo"
        );
    }

    #[test]
    fn empty_roles_show_dash() {
        assert_eq!(
            format_roles(&RoleSnapshot::default()),
            "front=- middle=- back=-"
        );
    }

    #[test]
    fn simulation_summary_counts_ticks_and_misses() {
        let sim = Simulation {
            reports: vec![
                report(Step::Advance { ms: 8000 }, Outcome::Ticks(2)),
                report(Step::Close { id: "x".into() }, Outcome::NotFound("x".into())),
            ],
            document: MemoryDocument::default(),
        };
        let lines = format_simulation(&sim);
        assert_eq!(
            lines.last().unwrap(),
            "Ran 2 steps, 2 ticks, 1 unknown ids"
        );
    }

    #[test]
    fn check_lists_cards_and_modals() {
        let doc = MemoryDocument::from_spec(&load_fixture_page("landing.toml")).unwrap();
        let lines = format_check(&doc, &BehaviorConfig::default());
        assert_eq!(lines[0], "Page: Northwind Analytics");
        assert_eq!(lines[1], "Carousel (4 cards, every 4000ms)");
        assert_eq!(lines[2], "    001 card-1 Live revenue");
        assert!(lines.contains(&"Modals".to_string()));
        assert_eq!(lines.last().unwrap(), "    002 demo Book a demo");
    }

    #[test]
    fn check_reports_missing_cards() {
        let doc = MemoryDocument::default();
        let lines = format_check(&doc, &BehaviorConfig::default());
        assert_eq!(
            lines,
            vec![
                "Carousel: no .stack-card elements, not started",
                "Modals: no .modal elements",
            ]
        );
    }
}
