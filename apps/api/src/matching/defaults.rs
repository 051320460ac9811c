//! Smart defaults: keyword-triggered answers for questions the upstream left out.

use crate::models::field::FieldKind;

#[derive(Debug, Clone, Copy)]
pub struct SmartDefault {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub value: &'static str,
}

/// Checked in order; the first entry with a keyword in the question wins.
pub const SMART_DEFAULTS: &[SmartDefault] = &[
    SmartDefault {
        name: "yes_no",
        keywords: &["experience", "willing", "available", "authorized", "eligible", "interested"],
        value: "Yes",
    },
    SmartDefault {
        name: "education",
        keywords: &["education", "degree", "qualification", "study"],
        value: "Bachelor's Degree",
    },
    SmartDefault {
        name: "employment",
        keywords: &["employment", "status", "currently working"],
        value: "Employed",
    },
    SmartDefault {
        name: "location",
        keywords: &["country", "location", "where", "city", "state"],
        value: "United States",
    },
];

/// Kinds a default may be written into. Dates, contact fields and checkbox
/// sets are left for the user instead of guessed.
fn accepts_defaults(kind: FieldKind) -> bool {
    matches!(
        kind,
        FieldKind::Text | FieldKind::Textarea | FieldKind::Radio | FieldKind::Dropdown
    )
}

/// Infers a default answer from keywords in `question`, or `None` if the field
/// should be skipped.
pub fn resolve_default(question: &str, kind: FieldKind) -> Option<&'static str> {
    if !accepts_defaults(kind) {
        return None;
    }
    let question_lower = question.to_lowercase();
    SMART_DEFAULTS
        .iter()
        .find(|d| d.keywords.iter().any(|k| question_lower.contains(k)))
        .map(|d| d.value)
}
