// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Worksheet naming.

use rustc_hash::FxHashSet;

/// Longest worksheet name the format accepts, in characters.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

const INVALID_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// First 31 characters of `name`.
pub fn truncate_sheet_name(name: &str) -> String {
    truncate_chars(name, MAX_SHEET_NAME_CHARS)
}

fn truncate_chars(name: &str, max: usize) -> String {
    name.chars().take(max).collect()
}

/// Hands out valid, unique worksheet names for one workbook.
///
/// Names are compared case-insensitively, as spreadsheet applications do.
#[derive(Debug, Default)]
pub struct SheetNamer {
    used: FxHashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A worksheet name for `raw` that no earlier call has returned.
    pub fn name_for(&mut self, raw: &str) -> String {
        let base = sanitize(raw);

        let mut candidate = base.clone();
        let mut n = 2usize;
        while self.used.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({})", n);
            let room = MAX_SHEET_NAME_CHARS - suffix.chars().count();
            candidate = format!("{}{}", truncate_chars(&base, room).trim_end(), suffix);
            n += 1;
        }

        self.used.insert(candidate.to_lowercase());
        candidate
    }
}

fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) || c.is_control() { '_' } else { c })
        .collect();

    let trimmed = truncate_sheet_name(replaced.trim().trim_matches('\''));
    let trimmed = trimmed.trim_end().trim_end_matches('\'').to_string();

    if trimmed.is_empty() {
        "Sheet".to_string()
    } else if trimmed.eq_ignore_ascii_case("history") {
        "History_".to_string()
    } else {
        trimmed
    }
}
