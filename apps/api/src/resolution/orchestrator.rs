//! Field Resolution — drives one pass over a page's fields.
//!
//! Flow: request_answers (once) → per field, in order:
//!   answer from the map, else smart default, else skipped →
//!   walk the field kind's fallback chain until a strategy resolves it.
//!
//! Every field yields exactly one `FieldResolution`. Per-field misses are
//! counted as skipped; only an exhausted upstream call fails the pass.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::answers::requester::request_answers;
use crate::llm_client::{ChatTransport, LlmError, LlmSettings};
use crate::matching::dates::normalize_date;
use crate::matching::defaults::resolve_default;
use crate::matching::engine::Matcher;
use crate::models::field::{AnswerMap, FieldDescriptor, FieldKind, MatchDecision};

/// One way of turning an answer into a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Write the answer as text (dates normalized).
    FreeText,
    /// Tiered match to a single option.
    SingleChoice,
    /// Split the answer and match each part (checkbox sets).
    MultiChoice,
    /// Pick the first option of a mandatory radio group.
    MandatoryFirst,
}

/// Priority list of strategies per field kind. Fields without options always
/// resolve as free text.
pub fn fallback_chain(kind: FieldKind, has_options: bool) -> &'static [Strategy] {
    if !has_options {
        return &[Strategy::FreeText];
    }
    match kind {
        FieldKind::Radio => &[Strategy::SingleChoice, Strategy::MandatoryFirst],
        FieldKind::Dropdown => &[Strategy::SingleChoice],
        FieldKind::Checkbox => &[Strategy::MultiChoice, Strategy::SingleChoice],
        FieldKind::Text
        | FieldKind::Textarea
        | FieldKind::Date
        | FieldKind::Email
        | FieldKind::Url
        | FieldKind::Phone => &[Strategy::FreeText],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Upstream,
    SmartDefault,
    Missing,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldResolution {
    pub index: usize,
    pub field: FieldDescriptor,
    pub answer_source: AnswerSource,
    pub answer: Option<String>,
    pub strategy: Option<Strategy>,
    pub decision: MatchDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcome {
    Success,
    Partial,
    Poor,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub pass_id: Uuid,
    pub resolutions: Vec<FieldResolution>,
    pub filled: usize,
    pub skipped: usize,
    pub total: usize,
    /// 0 – 100
    pub success_rate: u32,
    pub outcome: PassOutcome,
}

impl ResolutionReport {
    pub fn from_resolutions(pass_id: Uuid, resolutions: Vec<FieldResolution>) -> Self {
        let total = resolutions.len();
        let filled = resolutions
            .iter()
            .filter(|r| r.decision.is_resolved())
            .count();
        let success_rate = if total == 0 {
            0
        } else {
            ((filled as f64 * 100.0) / total as f64).round() as u32
        };
        let outcome = if success_rate >= 80 {
            PassOutcome::Success
        } else if success_rate >= 60 {
            PassOutcome::Partial
        } else {
            PassOutcome::Poor
        };

        Self {
            pass_id,
            resolutions,
            filled,
            skipped: total - filled,
            total,
            success_rate,
            outcome,
        }
    }
}

/// Runs one full pass: a single batched upstream call, then sequential
/// per-field resolution.
pub async fn run_pass(
    transport: &dyn ChatTransport,
    settings: &LlmSettings,
    matcher: &Matcher,
    resume_text: &str,
    fields: Vec<FieldDescriptor>,
) -> Result<ResolutionReport, LlmError> {
    let pass_id = Uuid::new_v4();
    info!("Pass {pass_id}: resolving {} fields", fields.len());

    let answers = request_answers(transport, settings, resume_text, &fields).await?;
    let resolutions = resolve_fields(matcher, fields, &answers);
    let report = ResolutionReport::from_resolutions(pass_id, resolutions);

    info!(
        "Pass {pass_id} complete: filled {}/{} fields, skipped {}",
        report.filled, report.total, report.skipped
    );
    Ok(report)
}

/// Resolves every field against an already-obtained answer map.
pub fn resolve_fields(
    matcher: &Matcher,
    fields: Vec<FieldDescriptor>,
    answers: &AnswerMap,
) -> Vec<FieldResolution> {
    fields
        .into_iter()
        .enumerate()
        .map(|(index, field)| resolve_field(matcher, index, field, answers))
        .collect()
}

pub fn resolve_field(
    matcher: &Matcher,
    index: usize,
    field: FieldDescriptor,
    answers: &AnswerMap,
) -> FieldResolution {
    let upstream = answers
        .get(&field.question)
        .map(|a| a.trim())
        .filter(|a| !a.is_empty());

    let (answer_source, answer) = match upstream {
        Some(a) => (AnswerSource::Upstream, Some(a.to_string())),
        None => match resolve_default(&field.question, field.field_kind) {
            Some(d) => {
                debug!("No answer for '{}', using smart default '{d}'", field.question);
                (AnswerSource::SmartDefault, Some(d.to_string()))
            }
            None => (AnswerSource::Missing, None),
        },
    };

    let (strategy, decision) = match answer.as_deref() {
        Some(a) => decide(matcher, &field, a),
        None => (None, MatchDecision::NoMatch),
    };

    debug!(
        "[{}] '{}' ({:?}) → {:?}",
        field.field_kind.as_str(),
        field.question,
        answer_source,
        decision
    );

    FieldResolution {
        index,
        field,
        answer_source,
        answer,
        strategy,
        decision,
    }
}

/// Walks the field's fallback chain; the first strategy that resolves wins.
pub fn decide(
    matcher: &Matcher,
    field: &FieldDescriptor,
    answer: &str,
) -> (Option<Strategy>, MatchDecision) {
    fallback_chain(field.field_kind, !field.options.is_empty())
        .iter()
        .map(|&strategy| (strategy, apply(matcher, strategy, field, answer)))
        .find(|(_, decision)| decision.is_resolved())
        .map(|(strategy, decision)| (Some(strategy), decision))
        .unwrap_or((None, MatchDecision::NoMatch))
}

fn apply(
    matcher: &Matcher,
    strategy: Strategy,
    field: &FieldDescriptor,
    answer: &str,
) -> MatchDecision {
    match strategy {
        Strategy::FreeText => {
            let text = if field.field_kind == FieldKind::Date {
                normalize_date(answer)
            } else {
                answer.to_string()
            };
            MatchDecision::Fill(text)
        }
        Strategy::SingleChoice => match matcher.best_match(answer, &field.options) {
            Some(found) if field.field_kind == FieldKind::Checkbox => {
                MatchDecision::SelectMany([found.index].into_iter().collect())
            }
            Some(found) => MatchDecision::Select(found.index),
            None => MatchDecision::NoMatch,
        },
        Strategy::MultiChoice => {
            let selected = matcher.match_all(answer, &field.options);
            if selected.is_empty() {
                MatchDecision::NoMatch
            } else {
                MatchDecision::SelectMany(selected)
            }
        }
        Strategy::MandatoryFirst => {
            if field.required || field.options.len() == 1 {
                MatchDecision::Select(0)
            } else {
                MatchDecision::NoMatch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn answers(pairs: &[(&str, &str)]) -> AnswerMap {
        pairs
            .iter()
            .map(|(q, a)| (q.to_string(), a.to_string()))
            .collect()
    }

    #[test]
    fn test_free_text_is_filled_verbatim() {
        let field = FieldDescriptor::new("Full name", FieldKind::Text, vec![]);
        let map = answers(&[("Full name", "Jane Doe")]);
        let r = resolve_field(&Matcher::default(), 0, field, &map);
        assert_eq!(r.decision, MatchDecision::Fill("Jane Doe".to_string()));
        assert_eq!(r.answer_source, AnswerSource::Upstream);
    }

    #[test]
    fn test_empty_options_fill_even_for_choice_kinds() {
        let field = FieldDescriptor::new("Name", FieldKind::Radio, vec![]);
        let map = answers(&[("Name", "Jane Doe")]);
        let r = resolve_field(&Matcher::default(), 0, field, &map);
        assert_eq!(r.decision, MatchDecision::Fill("Jane Doe".to_string()));
        assert_eq!(r.strategy, Some(Strategy::FreeText));
    }

    #[test]
    fn test_date_field_normalized() {
        let field = FieldDescriptor::new("Start date", FieldKind::Date, vec![]);
        let map = answers(&[("Start date", "03/15/2024")]);
        let r = resolve_field(&Matcher::default(), 0, field, &map);
        assert_eq!(r.decision, MatchDecision::Fill("2024-03-15".to_string()));
    }

    #[test]
    fn test_radio_semantic_selection() {
        let field =
            FieldDescriptor::new("Do you agree?", FieldKind::Radio, opts(&["Agree", "Disagree"]));
        let map = answers(&[("Do you agree?", "Yes")]);
        let r = resolve_field(&Matcher::default(), 0, field, &map);
        assert_eq!(r.decision, MatchDecision::Select(0));
        assert_eq!(r.strategy, Some(Strategy::SingleChoice));
    }

    #[test]
    fn test_checkbox_select_many() {
        let options = opts(&["Python", "Java", "SQL", "Go"]);
        let field = FieldDescriptor::new("Skills", FieldKind::Checkbox, options);
        let map = answers(&[("Skills", "Python, SQL; Go")]);
        let r = resolve_field(&Matcher::default(), 0, field, &map);
        assert_eq!(
            r.decision,
            MatchDecision::SelectMany([0, 2, 3].into_iter().collect())
        );
        assert_eq!(r.strategy, Some(Strategy::MultiChoice));
    }

    #[test]
    fn test_missing_answer_uses_smart_default_then_matches() {
        let question = "What country are you located in?";
        let options = opts(&["United States", "Canada", "Other"]);
        let field = FieldDescriptor::new(question, FieldKind::Dropdown, options);
        let r = resolve_field(&Matcher::default(), 3, field, &AnswerMap::new());
        assert_eq!(r.answer_source, AnswerSource::SmartDefault);
        assert_eq!(r.answer.as_deref(), Some("United States"));
        assert_eq!(r.decision, MatchDecision::Select(0));
        assert_eq!(r.index, 3);
    }

    #[test]
    fn test_blank_answer_treated_as_missing() {
        let field = FieldDescriptor::new("Favourite colour", FieldKind::Text, vec![]);
        let map = answers(&[("Favourite colour", "  ")]);
        let r = resolve_field(&Matcher::default(), 0, field, &map);
        assert_eq!(r.answer_source, AnswerSource::Missing);
        assert_eq!(r.decision, MatchDecision::NoMatch);
    }

    #[test]
    fn test_required_radio_falls_back_to_first_option() {
        let mut field = FieldDescriptor::new("Pick one", FieldKind::Radio, opts(&["Red", "Blue"]));
        field.required = true;
        let map = answers(&[("Pick one", "Purple")]);
        let r = resolve_field(&Matcher::default(), 0, field, &map);
        assert_eq!(r.decision, MatchDecision::Select(0));
        assert_eq!(r.strategy, Some(Strategy::MandatoryFirst));
    }

    #[test]
    fn test_optional_radio_without_match_is_skipped() {
        let field = FieldDescriptor::new("Pick one", FieldKind::Radio, opts(&["Red", "Blue"]));
        let map = answers(&[("Pick one", "Purple")]);
        let r = resolve_field(&Matcher::default(), 0, field, &map);
        assert_eq!(r.decision, MatchDecision::NoMatch);
        assert_eq!(r.strategy, None);
    }

    #[test]
    fn test_fallback_chain_order() {
        assert_eq!(
            fallback_chain(FieldKind::Radio, true),
            &[Strategy::SingleChoice, Strategy::MandatoryFirst]
        );
        assert_eq!(
            fallback_chain(FieldKind::Checkbox, true),
            &[Strategy::MultiChoice, Strategy::SingleChoice]
        );
        assert_eq!(fallback_chain(FieldKind::Checkbox, false), &[Strategy::FreeText]);
        assert_eq!(fallback_chain(FieldKind::Email, true), &[Strategy::FreeText]);
    }

    #[test]
    fn test_report_counts_every_field_once() {
        let fields = vec![
            FieldDescriptor::new("Full name", FieldKind::Text, vec![]),
            FieldDescriptor::new("Favourite colour", FieldKind::Text, vec![]),
            FieldDescriptor::new("Full name", FieldKind::Text, vec![]),
        ];
        let map = answers(&[("Full name", "Jane")]);
        let resolutions = resolve_fields(&Matcher::default(), fields, &map);
        let report = ResolutionReport::from_resolutions(Uuid::new_v4(), resolutions);
        assert_eq!(report.total, 3);
        assert_eq!(report.filled, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.success_rate, 67);
        assert_eq!(report.outcome, PassOutcome::Partial);
        let indices: Vec<_> = report.resolutions.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_report() {
        let report = ResolutionReport::from_resolutions(Uuid::new_v4(), vec![]);
        assert_eq!(report.success_rate, 0);
        assert_eq!(report.outcome, PassOutcome::Poor);
    }
}
