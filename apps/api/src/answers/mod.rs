// Answer generation: one batched LLM call per page, retried as a whole.
// All LLM calls go through llm_client; nothing here talks HTTP directly.

pub mod prompts;
pub mod requester;
