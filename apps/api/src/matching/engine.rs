//! Tiered option matching — picks which option label an answer refers to.
//!
//! Tiers run in strict order and the first tier with any hit wins:
//! 1. Exact: normalized equality or a shared synonym class
//! 2. Partial: normalized containment in either direction
//! 3. Fuzzy: word-level equality, containment, or edit distance
//!
//! Within a tier the earliest option wins.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::matching::levenshtein;
use crate::matching::normalize::normalize;
use crate::matching::synonyms::is_semantic_match;

/// Words ignored by the fuzzy tier.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Edit-distance ratio below which two words count as the same.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Partial,
    Fuzzy,
}

impl MatchTier {
    pub const ALL: [MatchTier; 3] = [MatchTier::Exact, MatchTier::Partial, MatchTier::Fuzzy];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionMatch {
    pub index: usize,
    pub tier: MatchTier,
}

/// Heuristic constants for the fuzzy tier.
#[derive(Debug, Clone)]
pub struct FuzzyConfig {
    pub stop_words: &'static [&'static str],
    /// Tokens must be longer than this to be considered at all.
    pub min_token_len: usize,
    /// Both tokens longer than this → substring containment counts.
    pub containment_min_len: usize,
    /// Both tokens longer than this → edit distance is consulted.
    pub edit_distance_min_len: usize,
    pub similarity_threshold: f64,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS,
            min_token_len: 2,
            containment_min_len: 3,
            edit_distance_min_len: 4,
            similarity_threshold: SIMILARITY_THRESHOLD,
        }
    }
}

/// Pure decision logic over an answer and a list of option labels.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    pub fuzzy: FuzzyConfig,
}

impl Matcher {
    pub fn new(fuzzy: FuzzyConfig) -> Self {
        Self { fuzzy }
    }

    /// Best single option for `answer`, or `None` if no tier matches.
    pub fn best_match(&self, answer: &str, options: &[String]) -> Option<OptionMatch> {
        let answer_key = normalize(answer);
        MatchTier::ALL.into_iter().find_map(|tier| {
            options
                .iter()
                .position(|option| self.matches_at(tier, answer, &answer_key, option))
                .map(|index| OptionMatch { index, tier })
        })
    }

    /// Every option matched by at least one comma/semicolon-separated part of
    /// `answer`. Used for checkbox sets.
    pub fn match_all(&self, answer: &str, options: &[String]) -> BTreeSet<usize> {
        let parts: Vec<(&str, String)> = split_answer_parts(answer)
            .into_iter()
            .map(|p| (p, normalize(p)))
            .collect();

        options
            .iter()
            .enumerate()
            .filter(|(_, option)| {
                parts.iter().any(|(part, part_key)| {
                    MatchTier::ALL
                        .into_iter()
                        .any(|tier| self.matches_at(tier, part, part_key, option))
                })
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether `answer` matches `option` at exactly `tier`.
    pub fn tier_matches(&self, tier: MatchTier, answer: &str, option: &str) -> bool {
        self.matches_at(tier, answer, &normalize(answer), option)
    }

    fn matches_at(&self, tier: MatchTier, answer: &str, answer_key: &str, option: &str) -> bool {
        match tier {
            MatchTier::Exact => {
                let option_key = normalize(option);
                (!answer_key.is_empty() && answer_key == option_key)
                    || is_semantic_match(answer, option)
            }
            MatchTier::Partial => {
                let option_key = normalize(option);
                // An empty key is contained in everything.
                !answer_key.is_empty()
                    && !option_key.is_empty()
                    && (answer_key.contains(&option_key) || option_key.contains(answer_key))
            }
            MatchTier::Fuzzy => self.is_fuzzy_match(answer, option),
        }
    }

    fn is_fuzzy_match(&self, answer: &str, option: &str) -> bool {
        let answer_lower = answer.to_lowercase();
        let option_lower = option.to_lowercase();
        let answer_words = self.significant_words(&answer_lower);
        let option_words = self.significant_words(&option_lower);

        answer_words
            .iter()
            .any(|a| option_words.iter().any(|o| self.words_match(a, o)))
    }

    fn significant_words<'s>(&self, text: &'s str) -> Vec<&'s str> {
        text.split_whitespace()
            .filter(|w| !self.fuzzy.stop_words.iter().any(|s| s == w))
            .filter(|w| w.chars().count() > self.fuzzy.min_token_len)
            .collect()
    }

    fn words_match(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let (a_len, b_len) = (a.chars().count(), b.chars().count());
        let cfg = &self.fuzzy;

        if a_len > cfg.containment_min_len
            && b_len > cfg.containment_min_len
            && (a.contains(b) || b.contains(a))
        {
            return true;
        }

        a_len > cfg.edit_distance_min_len
            && b_len > cfg.edit_distance_min_len
            && levenshtein::is_similar(a, b, cfg.similarity_threshold)
    }
}

/// Splits a multi-value answer on `,` or `;`, trimming and dropping blanks.
pub fn split_answer_parts(answer: &str) -> Vec<&str> {
    answer
        .split([',', ';'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
