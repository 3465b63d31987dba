//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in the stage core (delays go through the scheduler)
//! - The core stays headless (no terminal crates)
//! - No panicking shortcuts in core production code
//!
//! These tests are designed to catch violations early in the development cycle.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Workspace root, two levels above this package
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// A source line that broke a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub file: PathBuf,
    pub line: usize,
    pub text: String,
}

/// Production lines of every `.rs` file under `dir`
///
/// Comment lines are skipped, and a file is read only up to its first
/// `#[cfg(test)]` so unit test modules are excluded.
#[must_use]
pub fn production_lines(dir: &Path) -> Vec<(PathBuf, usize, String)> {
    let mut lines = Vec::new();
    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
    {
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("#[cfg(test)]") {
                break;
            }
            if trimmed.starts_with("//") {
                continue;
            }
            lines.push((entry.path().to_path_buf(), index + 1, line.to_string()));
        }
    }
    lines
}

/// Lines under `dir` containing any of `needles`
#[must_use]
pub fn find_violations(dir: &Path, needles: &[&str]) -> Vec<Violation> {
    production_lines(dir)
        .into_iter()
        .filter(|(_, _, text)| needles.iter().any(|n| text.contains(n)))
        .map(|(file, line, text)| Violation { file, line, text })
        .collect()
}

/// Render violations for an assertion message
#[must_use]
pub fn report(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  {}:{}: {}", v.file.display(), v.line, v.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
