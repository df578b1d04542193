// Sentiment and engagement prompt templates.
// Placeholders are substituted with llm_client::prompts::render.

pub const SENTIMENT_SYSTEM: &str = "\
You are an HR analytics specialist. Classify employee feedback sentiment and \
assess attrition risk from the text and employee context only. Quote concerns \
in the employee's own terms. You MUST respond with valid JSON only.";

pub const SENTIMENT_PROMPT: &str = r#"Analyze the sentiment of this employee feedback.

EMPLOYEE CONTEXT:
{employee_context}

FEEDBACK:
{feedback_text}

OUTPUT SCHEMA:
{
  "sentiment": "positive" | "neutral" | "negative",
  "confidence_score": 0.0-1.0,
  "attrition_risk": "low" | "medium" | "high",
  "key_concerns": ["string"],
  "positive_indicators": ["string"],
  "emotional_tone": "string"
}"#;

pub const ENGAGEMENT_SYSTEM: &str = "\
You are an employee engagement consultant. Recommend concrete, actionable \
retention steps a manager can take. You MUST respond with valid JSON only.";

pub const ENGAGEMENT_PROMPT: &str = r#"Recommend engagement strategies for this employee.

EMPLOYEE CONTEXT:
{employee_context}

SENTIMENT ANALYSIS:
{sentiment_analysis}

FEEDBACK:
{feedback_text}

OUTPUT SCHEMA:
{
  "immediate_actions": [{"action": "string", "priority": "high" | "medium" | "low"}],
  "short_term_strategies": [{"action": "string", "timeline": "string"}],
  "long_term_initiatives": [{"action": "string", "timeline": "string"}]
}"#;
