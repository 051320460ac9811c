//! Answer Requester — turns a page's questions plus the resume into an `AnswerMap`.
//!
//! One request per pass. A response that fails to parse is treated exactly like
//! a failed HTTP call: the whole batch is retried, never partially accepted.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::answers::prompts::FORM_FILL_SYSTEM;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{
    strip_json_fences, ChatMessage, ChatRequest, ChatTransport, LlmError, LlmSettings,
};
use crate::models::field::{AnswerMap, FieldDescriptor, FieldKind};

#[derive(Debug, Serialize)]
struct QuestionPayload<'a> {
    question: &'a str,
    #[serde(rename = "fieldType")]
    field_type: FieldKind,
}

#[derive(Debug, Serialize)]
struct UserPayload<'a> {
    resume: &'a str,
    questions: Vec<QuestionPayload<'a>>,
}

/// Builds the single chat request for a batch. Repeated questions are sent once.
pub fn build_request(
    settings: &LlmSettings,
    resume_text: &str,
    fields: &[FieldDescriptor],
) -> Result<ChatRequest, LlmError> {
    let mut seen = HashSet::new();
    let questions = fields
        .iter()
        .filter(|f| seen.insert(f.question.as_str()))
        .map(|f| QuestionPayload {
            question: &f.question,
            field_type: f.field_kind,
        })
        .collect();

    let payload = serde_json::to_string(&UserPayload {
        resume: resume_text,
        questions,
    })?;
    let system = format!("{FORM_FILL_SYSTEM}\n\n{JSON_ONLY_INSTRUCTION}");

    Ok(settings.request(vec![ChatMessage::system(system), ChatMessage::user(payload)]))
}

/// Parses the model output into an `AnswerMap`.
///
/// Scalars are stringified, arrays are joined with ", " (checkbox answers),
/// nulls are dropped. `0` and `false` are real answers, not gaps. Anything
/// other than a flat JSON object is malformed.
pub fn parse_answer_map(text: &str) -> Result<AnswerMap, LlmError> {
    let value: Value = serde_json::from_str(strip_json_fences(text))?;
    let Value::Object(entries) = value else {
        return Err(LlmError::Malformed("expected a JSON object".to_string()));
    };

    let mut answers = AnswerMap::with_capacity(entries.len());
    for (question, raw) in entries {
        if let Some(answer) = answer_text(&question, raw)? {
            answers.insert(question, answer);
        }
    }
    Ok(answers)
}

fn answer_text(question: &str, raw: Value) -> Result<Option<String>, LlmError> {
    let text = match raw {
        Value::Null => return Ok(None),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                Value::Bool(_) | Value::Number(_) => Ok(item.to_string()),
                _ => Err(LlmError::Malformed(format!(
                    "answer for '{question}' has a nested value"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?
            .join(", "),
        Value::Object(_) => {
            return Err(LlmError::Malformed(format!(
                "answer for '{question}' is an object"
            )))
        }
    };
    Ok(Some(text))
}

/// Requests answers for every field in one batch, retrying per `settings.retry`.
pub async fn request_answers(
    transport: &dyn ChatTransport,
    settings: &LlmSettings,
    resume_text: &str,
    fields: &[FieldDescriptor],
) -> Result<AnswerMap, LlmError> {
    let request = build_request(settings, resume_text, fields)?;
    debug!(
        "Answer request: model={}, questions={}, resume_chars={}",
        request.model,
        fields.len(),
        resume_text.len()
    );

    let answers = settings
        .retry
        .run(|attempt| {
            let request = &request;
            async move {
                debug!("Answer request attempt {attempt}");
                let text = transport.complete(request).await?;
                parse_answer_map(&text)
            }
        })
        .await?;

    info!(
        "Received {} answers for {} questions",
        answers.len(),
        fields.len()
    );
    Ok(answers)
}
