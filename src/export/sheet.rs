//! Worksheet naming
//!
//! Excel limits sheet names to 31 characters, forbids `/ \ ? * [ ] :`
//! and compares names case-insensitively. Layer names are mapped onto that
//! space and collisions within one workbook get a numeric suffix.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Maximum sheet name length accepted by Excel
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Name used when a layer name sanitizes to nothing
const BLANK_SHEET_NAME: &str = "Sheet";

/// Characters Excel rejects in sheet names
static INVALID_SHEET_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\?*\[\]:]").expect("Invalid sheet name regex"));

/// Replace forbidden characters with `_` and truncate to the length limit
pub fn sanitize_sheet_name(layer: &str) -> String {
    let replaced = INVALID_SHEET_CHARS.replace_all(layer, "_");
    let truncated: String = replaced.chars().take(MAX_SHEET_NAME_LEN).collect();

    // Excel also rejects names that start or end with an apostrophe
    let trimmed = truncated.trim_matches('\'');
    if trimmed.trim().is_empty() {
        BLANK_SHEET_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Hands out unique sheet names for one workbook
#[derive(Debug, Default)]
pub struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheet name for `layer`, unique among the names handed out so far
    pub fn assign(&mut self, layer: &str) -> String {
        let candidate = sanitize_sheet_name(layer);
        if self.claim(&candidate) {
            return candidate;
        }

        let mut n = 2usize;
        loop {
            let suffix = format!("_{}", n);
            let stem: String = candidate
                .chars()
                .take(MAX_SHEET_NAME_LEN - suffix.chars().count())
                .collect();
            let name = format!("{}{}", stem, suffix);
            if self.claim(&name) {
                return name;
            }
            n += 1;
        }
    }

    fn claim(&mut self, name: &str) -> bool {
        self.used.insert(name.to_lowercase())
    }
}
