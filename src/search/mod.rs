//! Search functionality.
//!
//! Case-insensitive substring search over the document's plain text, in
//! character positions:
//! - Forward search finds the first match starting at or after `from`
//! - Backward search finds the last match starting before `from`

use std::ops::Range;

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Find `needle` in `haystack`, ignoring case.
///
/// Returns the character range of the match, or `None` when there is none in
/// the searched direction. An empty needle never matches.
pub fn find(haystack: &str, needle: &str, from: usize, direction: Direction) -> Option<Range<usize>> {
    let hay: Vec<char> = haystack.chars().collect();
    let pat: Vec<char> = needle.chars().collect();
    if pat.is_empty() || pat.len() > hay.len() {
        return None;
    }
    let last_start = hay.len() - pat.len();
    let matches_at = |start: usize| {
        hay[start..start + pat.len()]
            .iter()
            .zip(&pat)
            .all(|(&a, &b)| chars_match(a, b))
    };

    let found = match direction {
        Direction::Forward => (from.min(last_start + 1)..=last_start).find(|&s| matches_at(s)),
        Direction::Backward => {
            let upper = from.min(last_start + 1);
            (0..upper).rev().find(|&s| matches_at(s))
        }
    };
    found.map(|start| start..start + pat.len())
}

fn chars_match(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
