//! Citation highlighting for display.
//!
//! The transform is single-pass: never feed its output back in. Markers are
//! plain text and may themselves contain citation-like substrings.

use std::collections::HashSet;

use regex::{Captures, Regex};

/// Text inserted around each highlighted citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub open: String,
    pub close: String,
}

impl Marker {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// `<mark>` ... `</mark>`.
    pub fn html() -> Self {
        Self::new("<mark>", "</mark>")
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::html()
    }
}

/// Escape `literal` so that, used as a pattern, it matches only itself.
pub fn escape_literal(literal: &str) -> String {
    regex::escape(literal)
}

/// Wrap every occurrence of every citation in `marker`.
///
/// Matching is literal, case-sensitive and global. Citations are applied in
/// the order given, each over the output of the previous one, so overlapping
/// citations resolve by that order. Empty citations and repeats of an
/// earlier citation are skipped. Matched text is kept as-is; only markers
/// are inserted.
pub fn highlight_citations(text: &str, citations: &[String], marker: &Marker) -> String {
    let mut highlighted = text.to_string();
    let mut applied: HashSet<&str> = HashSet::new();

    for citation in citations {
        if citation.is_empty() || !applied.insert(citation.as_str()) {
            continue;
        }
        let pattern = match Regex::new(&escape_literal(citation)) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(%citation, error = %e, "citation not highlightable");
                continue;
            }
        };
        highlighted = pattern
            .replace_all(&highlighted, |caps: &Captures| {
                format!("{}{}{}", marker.open, &caps[0], marker.close)
            })
            .into_owned();
    }

    highlighted
}
