use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Semantic category of a form field, as detected by the page scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Radio,
    Checkbox,
    Dropdown,
    Date,
    Email,
    Url,
    Phone,
}

impl FieldKind {
    /// Kinds whose value is typed rather than chosen from a list.
    pub fn is_free_text(self) -> bool {
        matches!(
            self,
            FieldKind::Text
                | FieldKind::Textarea
                | FieldKind::Date
                | FieldKind::Email
                | FieldKind::Url
                | FieldKind::Phone
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Date => "date",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Phone => "phone",
        }
    }
}

/// One question scraped from the page. Identity is its position in the pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub question: String,
    pub field_kind: FieldKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl FieldDescriptor {
    pub fn new(question: impl Into<String>, field_kind: FieldKind, options: Vec<String>) -> Self {
        Self {
            question: question.into(),
            field_kind,
            options,
            required: false,
        }
    }

    /// Cleans up scraped question text: first line only, trailing asterisks removed.
    /// A trailing asterisk marks the field as required.
    pub fn sanitized(mut self) -> Self {
        let first_line = self.question.lines().next().unwrap_or("").trim_end();
        let stripped = first_line.trim_end_matches('*');
        if stripped.len() != first_line.len() {
            self.required = true;
        }
        self.question = stripped.trim().to_string();
        self
    }
}

/// Question text → answer text, as returned by one batch upstream call.
pub type AnswerMap = HashMap<String, String>;

/// What the filler should do with one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum MatchDecision {
    Fill(String),
    Select(usize),
    SelectMany(BTreeSet<usize>),
    NoMatch,
}

impl MatchDecision {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, MatchDecision::NoMatch)
    }
}
