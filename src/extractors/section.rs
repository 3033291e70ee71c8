// src/extractors/section.rs

// --- Imports ---
use serde::{Deserialize, Serialize};

// --- Heading Tables ---

/// How a line is compared against a heading. Both sides are trimmed and uppercased first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Line equals the heading or starts with it ("EXPERIENCE (2019-2024)").
    #[default]
    Prefix,
    /// Heading appears anywhere in the line.
    Contains,
}

impl MatchMode {
    fn matches(self, line: &str, heading: &str) -> bool {
        match self {
            MatchMode::Prefix => line == heading || line.starts_with(heading),
            MatchMode::Contains => line.contains(heading),
        }
    }
}

/// Declarative description of a section: the headings that open it, the headings
/// that close it, and how lines are matched against both lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRule {
    pub start: Vec<String>,
    pub stop: Vec<String>,
    #[serde(default)]
    pub match_mode: MatchMode,
}

impl SectionRule {
    pub fn new(start: &[&str], stop: &[&str], match_mode: MatchMode) -> Self {
        Self {
            start: start.iter().map(|s| s.to_string()).collect(),
            stop: stop.iter().map(|s| s.to_string()).collect(),
            match_mode,
        }
    }
}

// --- Data Structures ---

/// Half-open line interval `[start_line, end_line)` of a located section.
/// `start_line == None` means no start heading was found; `end_line` is then the line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub start_line: Option<usize>,
    pub end_line: usize,
}

impl SectionSpan {
    pub fn not_found(line_count: usize) -> Self {
        Self { start_line: None, end_line: line_count }
    }

    /// Joins the spanned lines (heading line included) back into text.
    pub fn text(&self, lines: &[&str]) -> Option<String> {
        let start = self.start_line?;
        let end = self.end_line.min(lines.len());
        Some(lines[start.min(end)..end].join("\n"))
    }
}

/// Returns the index of the first line at or after `from` matching any heading, and that heading.
/// Headings must already be trimmed and uppercased.
pub fn find_first_matching_line<'h>(
    lines: &[&str],
    from: usize,
    headings: &'h [String],
    mode: MatchMode,
) -> Option<(usize, &'h str)> {
    lines.iter().enumerate().skip(from).find_map(|(idx, line)| {
        let normalized = line.trim().to_uppercase();
        headings
            .iter()
            .find(|heading| mode.matches(&normalized, heading))
            .map(|heading| (idx, heading.as_str()))
    })
}

fn normalize_headings(headings: &[String]) -> Vec<String> {
    headings
        .iter()
        .map(|h| h.trim().to_uppercase())
        .filter(|h| !h.is_empty()) // an empty heading would match every line
        .collect()
}

// --- Locator ---

/// Finds a section's line span from a `SectionRule`. Holds only the normalized heading tables.
#[derive(Debug, Clone)]
pub struct SectionLocator {
    name: String,
    start: Vec<String>,
    stop: Vec<String>,
    mode: MatchMode,
}

impl SectionLocator {
    pub fn new(name: &str, rule: &SectionRule) -> Self {
        Self {
            name: name.to_string(),
            start: normalize_headings(&rule.start),
            stop: normalize_headings(&rule.stop),
            mode: rule.match_mode,
        }
    }

    /// Only the first start heading counts. The stop search begins strictly after it and
    /// defaults to end-of-text.
    pub fn locate(&self, lines: &[&str]) -> SectionSpan {
        let Some((start_idx, start_heading)) =
            find_first_matching_line(lines, 0, &self.start, self.mode)
        else {
            tracing::debug!("No '{}' section heading found in {} lines", self.name, lines.len());
            return SectionSpan::not_found(lines.len());
        };
        tracing::debug!(
            "Found '{}' section at line {} (heading '{}'): {}",
            self.name, start_idx, start_heading, lines[start_idx].trim()
        );

        let end_idx = match find_first_matching_line(lines, start_idx + 1, &self.stop, self.mode) {
            Some((idx, stop_heading)) => {
                tracing::debug!(
                    "'{}' section ends at line {} (heading '{}')",
                    self.name, idx, stop_heading
                );
                idx
            }
            None => {
                tracing::debug!("'{}' section runs to end of text", self.name);
                lines.len()
            }
        };

        SectionSpan { start_line: Some(start_idx), end_line: end_idx }
    }
}
