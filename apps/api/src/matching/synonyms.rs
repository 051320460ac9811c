//! Domain synonym table used by the exact matching tier.
//!
//! Classes overlap on purpose ("yes" appears under both affirmative and
//! experience). Triggers are matched as lower-case substrings, so short
//! triggers such as "us" or "m" fire inside longer words too.

/// A canonical concept and the phrases that signal it.
#[derive(Debug, Clone, Copy)]
pub struct SynonymClass {
    pub name: &'static str,
    pub triggers: &'static [&'static str],
}

impl SynonymClass {
    /// True if any trigger occurs in `text_lower` (already lower-cased).
    fn fires_in(&self, text_lower: &str) -> bool {
        self.triggers.iter().any(|t| text_lower.contains(t))
    }
}

pub const SYNONYM_CLASSES: &[SynonymClass] = &[
    SynonymClass {
        name: "yes",
        triggers: &[
            "yes", "true", "correct", "agree", "accept", "affirmative", "definitely", "absolutely",
            "sure",
        ],
    },
    SynonymClass {
        name: "no",
        triggers: &[
            "no", "false", "incorrect", "disagree", "decline", "negative", "never", "not really",
        ],
    },
    SynonymClass {
        name: "male",
        triggers: &["male", "man", "m", "gentleman", "guy"],
    },
    SynonymClass {
        name: "female",
        triggers: &["female", "woman", "f", "lady", "girl"],
    },
    SynonymClass {
        name: "bachelor",
        triggers: &["bachelor", "bs", "ba", "undergraduate", "bachelors", "college degree"],
    },
    SynonymClass {
        name: "master",
        triggers: &["master", "ms", "ma", "graduate", "masters", "masters degree"],
    },
    SynonymClass {
        name: "phd",
        triggers: &["phd", "doctorate", "doctoral", "doctor", "ph.d"],
    },
    SynonymClass {
        name: "experience",
        triggers: &["experienced", "yes", "have experience", "work experience", "professional"],
    },
    SynonymClass {
        name: "no experience",
        triggers: &[
            "no experience", "entry level", "fresher", "beginner", "new graduate",
            "recent graduate",
        ],
    },
    SynonymClass {
        name: "full time",
        triggers: &["full time", "fulltime", "full-time", "permanent", "regular"],
    },
    SynonymClass {
        name: "part time",
        triggers: &["part time", "parttime", "part-time", "temporary", "contract"],
    },
    SynonymClass {
        name: "united states",
        triggers: &["usa", "us", "america", "united states", "u.s.", "u.s.a"],
    },
    SynonymClass {
        name: "canada",
        triggers: &["canada", "ca", "canadian"],
    },
    SynonymClass {
        name: "india",
        triggers: &["india", "indian", "in"],
    },
    SynonymClass {
        name: "authorized",
        triggers: &["authorized", "eligible", "permitted", "allowed", "legal"],
    },
];

/// First class whose triggers fire in both strings, if any.
pub fn shared_class(answer: &str, option_text: &str) -> Option<&'static SynonymClass> {
    let answer_lower = answer.to_lowercase();
    let option_lower = option_text.to_lowercase();
    SYNONYM_CLASSES
        .iter()
        .find(|class| class.fires_in(&answer_lower) && class.fires_in(&option_lower))
}

pub fn is_semantic_match(answer: &str, option_text: &str) -> bool {
    shared_class(answer, option_text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_matches_agree() {
        assert_eq!(shared_class("Yes", "Agree").map(|c| c.name), Some("yes"));
    }

    #[test]
    fn test_no_matches_decline() {
        assert!(is_semantic_match("No", "I decline"));
    }

    #[test]
    fn test_degree_aliases() {
        assert!(is_semantic_match("Bachelor's Degree", "Undergraduate"));
        assert!(is_semantic_match("PhD", "Doctorate"));
    }

    #[test]
    fn test_country_aliases_case_insensitive() {
        assert!(is_semantic_match("USA", "United States of America"));
        assert!(is_semantic_match("Canadian", "CANADA"));
    }

    #[test]
    fn test_unrelated_terms_do_not_match() {
        assert!(!is_semantic_match("Python", "Java"));
        assert!(!is_semantic_match("SQL", "Go"));
    }

    #[test]
    fn test_class_names_are_unique() {
        let mut names: Vec<_> = SYNONYM_CLASSES.iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SYNONYM_CLASSES.len());
    }
}
