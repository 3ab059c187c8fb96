//! Pluggable ranking for fuzzy global filtering.

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

/// Scores a haystack against a query.
///
/// `Some(score)` is a passing rank, `None` means the haystack does not match.
pub trait Ranker {
    /// Rank `haystack` against `query`.
    fn rank(&mut self, query: &str, haystack: &str) -> Option<u32>;
}

impl<F> Ranker for F
where
    F: FnMut(&str, &str) -> Option<u32>,
{
    fn rank(&mut self, query: &str, haystack: &str) -> Option<u32> {
        self(query, haystack)
    }
}

/// Default fuzzy ranker using nucleo-matcher.
///
/// The compiled pattern is cached for the last query so a filter pass over a
/// large row set only parses the query once.
pub struct FuzzyRanker {
    matcher: Matcher,
    pattern: Option<(String, Pattern)>,
    buf: Vec<char>,
}

impl FuzzyRanker {
    /// Create a ranker with the default matcher configuration.
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            pattern: None,
            buf: Vec::new(),
        }
    }

    fn ensure_pattern(&mut self, query: &str) {
        if matches!(&self.pattern, Some((cached, _)) if cached == query) {
            return;
        }
        let pattern = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );
        self.pattern = Some((query.to_string(), pattern));
    }
}

impl Default for FuzzyRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ranker for FuzzyRanker {
    fn rank(&mut self, query: &str, haystack: &str) -> Option<u32> {
        if query.is_empty() {
            return Some(0);
        }
        self.ensure_pattern(query);
        let Some((_, pattern)) = &self.pattern else {
            return None;
        };
        let haystack = Utf32Str::new(haystack, &mut self.buf);
        pattern.score(haystack, &mut self.matcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_matches_subsequence() {
        let mut ranker = FuzzyRanker::new();
        assert!(ranker.rank("nrth", "North Ridge POP").is_some());
        assert!(ranker.rank("xyz", "North Ridge POP").is_none());
    }

    #[test]
    fn test_fuzzy_ignores_case() {
        let mut ranker = FuzzyRanker::new();
        assert!(ranker.rank("NORTH", "north-core-01").is_some());
    }

    #[test]
    fn test_closure_ranker() {
        let mut exact = |q: &str, h: &str| (q == h).then_some(1u32);
        assert_eq!(exact.rank("a", "a"), Some(1));
        assert_eq!(exact.rank("a", "b"), None);
    }
}
