// Employee feedback sentiment: classification, engagement recommendations,
// attrition-risk scoring, single and batch handlers.

pub mod analyzer;
pub mod handlers;
pub mod prompts;
