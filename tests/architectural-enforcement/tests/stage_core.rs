//! Rules for the headless stage core

use std::fs;

use architectural_enforcement::{find_violations, production_lines, report, workspace_root};

fn core_src() -> std::path::PathBuf {
    workspace_root().join("conductor/core/src")
}

#[test]
fn test_core_sources_are_found() {
    let lines = production_lines(&core_src());
    assert!(
        lines.iter().any(|(file, _, _)| file.ends_with("sequencer.rs")),
        "expected to scan the sequencer"
    );
}

#[test]
fn test_no_sleep_in_core() {
    let violations = find_violations(
        &core_src(),
        &["thread::sleep", "time::sleep", "sleep_until"],
    );
    assert!(
        violations.is_empty(),
        "delays must be scheduled, not slept:\n{}",
        report(&violations)
    );
}

#[test]
fn test_core_is_headless() {
    let violations = find_violations(&core_src(), &["ratatui", "crossterm"]);
    assert!(
        violations.is_empty(),
        "terminal code belongs in the tui crate:\n{}",
        report(&violations)
    );

    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("core manifest");
    assert!(!manifest.contains("ratatui"));
    assert!(!manifest.contains("crossterm"));
}

#[test]
fn test_no_unwrap_in_core_production_code() {
    let violations = find_violations(&core_src(), &[".unwrap()", ".expect("]);
    assert!(
        violations.is_empty(),
        "propagate or handle errors instead:\n{}",
        report(&violations)
    );
}
