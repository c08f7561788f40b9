// loginsight - core/filter.rs
//
// Composable line filter engine. Every predicate in a set must pass (AND);
// an empty set passes every line.
// Core layer: pure logic over text already in memory.

use crate::core::model::LinePredicate;
use crate::util::constants;
use crate::util::error::FilterError;
use regex::{Regex, RegexBuilder};

/// A predicate compiled for repeated evaluation.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    test: MatchTest,
    negate: bool,
}

#[derive(Debug, Clone)]
enum MatchTest {
    Regex(Regex),
    /// Needle is pre-lowercased when `case_sensitive` is false.
    Substring { needle: String, case_sensitive: bool },
}

impl LineMatcher {
    /// Compile a predicate. Regex patterns are validated here, before any
    /// line is evaluated.
    pub fn compile(predicate: &LinePredicate) -> Result<Self, FilterError> {
        let test = if predicate.is_regex {
            if predicate.pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
                return Err(FilterError::RegexTooLong {
                    length: predicate.pattern.len(),
                    max_length: constants::MAX_REGEX_PATTERN_LENGTH,
                });
            }
            let regex = RegexBuilder::new(&predicate.pattern)
                .case_insensitive(!predicate.case_sensitive)
                .build()
                .map_err(|e| FilterError::InvalidRegex {
                    pattern: predicate.pattern.clone(),
                    source: e,
                })?;
            MatchTest::Regex(regex)
        } else if predicate.case_sensitive {
            MatchTest::Substring {
                needle: predicate.pattern.clone(),
                case_sensitive: true,
            }
        } else {
            MatchTest::Substring {
                needle: predicate.pattern.to_lowercase(),
                case_sensitive: false,
            }
        };

        Ok(Self {
            test,
            negate: predicate.negate,
        })
    }

    /// Evaluate against one line. Negation is applied last.
    pub fn is_match(&self, line: &str) -> bool {
        let hit = match &self.test {
            MatchTest::Regex(re) => re.is_match(line),
            MatchTest::Substring {
                needle,
                case_sensitive: true,
            } => line.contains(needle.as_str()),
            MatchTest::Substring {
                needle,
                case_sensitive: false,
            } => line.to_lowercase().contains(needle.as_str()),
        };
        hit != self.negate
    }
}

/// A compiled, AND-combined set of predicates.
#[derive(Debug, Clone, Default)]
pub struct PredicateSet {
    matchers: Vec<LineMatcher>,
}

impl PredicateSet {
    pub fn compile(predicates: &[LinePredicate]) -> Result<Self, FilterError> {
        let matchers = predicates
            .iter()
            .map(LineMatcher::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    /// Returns true if no predicates are active.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// True when every predicate passes.
    pub fn matches_all(&self, line: &str) -> bool {
        self.matchers.iter().all(|m| m.is_match(line))
    }

    /// Keep the passing lines of `text`, each terminated with `\n`.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::new();
        let mut kept = 0usize;
        for line in text.lines() {
            if self.matches_all(line) {
                out.push_str(line);
                out.push('\n');
                kept += 1;
            }
        }
        tracing::debug!(predicates = self.matchers.len(), kept, "Filtered text");
        out
    }
}

/// Evaluate one predicate against one line.
pub fn matches(line: &str, predicate: &LinePredicate) -> Result<bool, FilterError> {
    Ok(LineMatcher::compile(predicate)?.is_match(line))
}

/// Keep the lines passing every predicate, in input order.
pub fn filter_lines<'a, I>(lines: I, predicates: &[LinePredicate]) -> Result<Vec<&'a str>, FilterError>
where
    I: IntoIterator<Item = &'a str>,
{
    let set = PredicateSet::compile(predicates)?;
    Ok(lines.into_iter().filter(|line| set.matches_all(line)).collect())
}

/// Filter a block of text line by line. Each kept line is terminated with
/// `\n`; no lines kept yields an empty string.
pub fn filter_text(text: &str, predicates: &[LinePredicate]) -> Result<String, FilterError> {
    Ok(PredicateSet::compile(predicates)?.apply(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: [&str; 5] = [
        "Error: x",
        "an error occurred",
        "ERR x",
        "192.168.5.10 GET /index",
        "all good",
    ];

    #[test]
    fn test_case_insensitive_substring() {
        let p = LinePredicate::substring("error").case_insensitive();
        let kept = filter_lines(LINES, &[p]).unwrap();
        assert_eq!(kept, vec!["Error: x", "an error occurred"]);
    }

    #[test]
    fn test_case_sensitive_substring() {
        let p = LinePredicate::substring("Error");
        assert!(matches("Error: x", &p).unwrap());
        assert!(!matches("an error occurred", &p).unwrap());
    }

    #[test]
    fn test_regex_is_a_search_not_a_full_match() {
        let p = LinePredicate::regex(r"\d+\.\d+");
        assert!(matches("192.168.5.10 GET /index", &p).unwrap());
        assert!(!matches("no digits", &p).unwrap());
    }

    #[test]
    fn test_regex_case_insensitive() {
        let p = LinePredicate::regex("^err").case_insensitive();
        let kept = filter_lines(LINES, &[p]).unwrap();
        assert_eq!(kept, vec!["Error: x", "ERR x"]);
    }

    #[test]
    fn test_negation_inverts_every_line() {
        for pattern in ["error", "x", "zzz", ""] {
            for is_regex in [false, true] {
                let mut plain = LinePredicate::substring(pattern);
                plain.is_regex = is_regex;
                let negated = plain.clone().negated();
                for line in LINES {
                    assert_eq!(
                        matches(line, &negated).unwrap(),
                        !matches(line, &plain).unwrap(),
                        "pattern {pattern:?} line {line:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_empty_predicate_set_keeps_everything_in_order() {
        assert_eq!(filter_lines(LINES, &[]).unwrap(), LINES.to_vec());
    }

    #[test]
    fn test_predicates_are_and_combined() {
        let preds = [
            LinePredicate::substring("x"),
            LinePredicate::substring("ERR").negated(),
        ];
        assert_eq!(
            filter_lines(LINES, &preds).unwrap(),
            vec!["Error: x", "192.168.5.10 GET /index"]
        );

        let preds = [
            LinePredicate::substring("x"),
            LinePredicate::regex(r"^\d").negated(),
            LinePredicate::substring("ERR").negated(),
        ];
        assert_eq!(filter_lines(LINES, &preds).unwrap(), vec!["Error: x"]);

        let set = PredicateSet::compile(&[]).unwrap();
        assert!(set.is_empty());
        assert!(!PredicateSet::compile(&preds).unwrap().is_empty());
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let preds = [LinePredicate::regex("[a-z]{3}").case_insensitive()];
        let text = LINES.join("\n");
        let once = filter_text(&text, &preds).unwrap();
        let twice = filter_text(&once, &preds).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_text_terminates_lines() {
        let out = filter_text("a1\nb2\na3", &[LinePredicate::substring("a")]).unwrap();
        assert_eq!(out, "a1\na3\n");
        assert_eq!(filter_text("b", &[LinePredicate::substring("a")]).unwrap(), "");
    }

    #[test]
    fn test_invalid_regex() {
        let err = matches("x", &LinePredicate::regex("[invalid")).unwrap_err();
        assert!(matches!(err, FilterError::InvalidRegex { .. }));
    }

    #[test]
    fn test_regex_too_long() {
        let long = "a".repeat(constants::MAX_REGEX_PATTERN_LENGTH + 1);
        let err = PredicateSet::compile(&[LinePredicate::regex(long)]).unwrap_err();
        assert!(matches!(err, FilterError::RegexTooLong { .. }));
    }
}
