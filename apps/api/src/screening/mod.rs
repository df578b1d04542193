// Resume screening: document text extraction, job catalog, LLM scoring pipeline.
// All LLM calls go through llm_client::TextModel.

pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod requirements;
pub mod screener;
