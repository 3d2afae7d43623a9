//! Skill content loading with a character budget.
//!
//! Oversized documents are cut at a structural boundary where possible: a
//! markdown heading in the last 30% of the budget, else the last blank line,
//! else the raw budget.

use std::path::Path;

use tracing::debug;

/// Default character budget for one injected document.
pub const DEFAULT_CONTENT_BUDGET: usize = 8000;

/// Appended to content that was cut short.
pub const TRUNCATION_MARKER: &str = "\n\n[... truncated, read the full file for the rest ...]";

/// Content of a skill document, possibly truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedContent {
    /// Text to show. Ends with [`TRUNCATION_MARKER`] when `truncated`.
    pub text: String,
    pub truncated: bool,
    /// Character count of the document before truncation.
    pub total_chars: usize,
}

impl LoadedContent {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Reads skill documents and fits them into a character budget.
#[derive(Debug, Clone, Copy)]
pub struct ContentLoader {
    budget: usize,
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_BUDGET)
    }
}

impl ContentLoader {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Read and fit a document. An unreadable file yields empty content.
    pub fn load(&self, path: &Path) -> LoadedContent {
        match std::fs::read_to_string(path) {
            Ok(raw) => self.fit(strip_frontmatter(&raw)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skill content unreadable");
                LoadedContent::default()
            },
        }
    }

    /// Fit already-loaded text into the budget.
    pub fn fit(&self, text: &str) -> LoadedContent {
        let total_chars = text.chars().count();
        match cut_point(text, self.budget) {
            None => LoadedContent {
                text: text.to_string(),
                truncated: false,
                total_chars,
            },
            Some(cut) => {
                let mut truncated = text[..cut].trim_end().to_string();
                truncated.push_str(TRUNCATION_MARKER);
                LoadedContent {
                    text: truncated,
                    truncated: true,
                    total_chars,
                }
            },
        }
    }
}

/// Byte offset to cut `text` at, or `None` when it fits in `budget` chars.
fn cut_point(text: &str, budget: usize) -> Option<usize> {
    let limit = text.char_indices().nth(budget).map(|(i, _)| i)?;
    let window = &text[..limit];
    let heading_floor = budget * 7 / 10;

    if let Some(heading) = last_heading(window)
        && window[..heading].chars().count() > heading_floor
    {
        return Some(heading);
    }
    if let Some(paragraph) = window.rfind("\n\n").filter(|&i| i > 0) {
        return Some(paragraph);
    }
    Some(limit)
}

/// Offset of the newline that starts the last markdown heading in `window`.
fn last_heading(window: &str) -> Option<usize> {
    window
        .match_indices('\n')
        .rev()
        .map(|(i, _)| i)
        .find(|&i| is_heading_line(&window[i + 1..]))
}

fn is_heading_line(line: &str) -> bool {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with(' ')
}

/// Drop a leading `---` frontmatter block.
fn strip_frontmatter(raw: &str) -> &str {
    let Some(rest) = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))
    else {
        return raw;
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == "---" {
            return rest[offset..].trim_start_matches(['\r', '\n']);
        }
    }
    raw
}
