//! Search functionality for resolving names typed by the user.
//!
//! This module encapsulates the matching logic, allowing the underlying
//! implementation to be changed without affecting the rest of the codebase.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// A matcher for fuzzy searching text.
#[derive(Default)]
pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Matcher {
    /// Get the match score for ranking results.
    ///
    /// The matching is case-insensitive and allows non-consecutive characters.
    /// Higher scores indicate better matches, `None` means no match.
    fn score(&self, text: &str, pattern: &str) -> Option<i64> {
        let pattern_lower = pattern.to_lowercase();
        self.inner.fuzzy_match(text, &pattern_lower)
    }

    /// Position of the candidate that best matches the pattern.
    ///
    /// An exact (case-insensitive) match always wins. Ties keep the earliest
    /// candidate.
    pub fn best_match<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a str>,
        pattern: &str,
    ) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (index, candidate) in candidates.into_iter().enumerate() {
            if candidate.eq_ignore_ascii_case(pattern) {
                return Some(index);
            }
            if let Some(score) = self.score(candidate, pattern)
                && best.is_none_or(|(_, top)| score > top)
            {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }
}
