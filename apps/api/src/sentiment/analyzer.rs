//! Feedback analysis: classify → recommend → score attrition risk.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::{call_json, prompts::render, TextModel};
use crate::sentiment::prompts::{
    ENGAGEMENT_PROMPT, ENGAGEMENT_SYSTEM, SENTIMENT_PROMPT, SENTIMENT_SYSTEM,
};

const MAX_RECOMMENDED_ACTIONS: usize = 10;
/// Short-term and long-term items folded into `recommended_actions`.
const FOLLOW_UPS_PER_HORIZON: usize = 2;
const MAX_CONCERN_BOOST: f64 = 0.2;

fn unknown() -> String {
    "Unknown".to_string()
}

fn default_tenure() -> u32 {
    12
}

fn default_rating() -> u8 {
    3
}

/// One piece of employee feedback plus the context used for risk scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRequest {
    pub feedback_text: String,
    pub employee_id: String,
    #[serde(default = "unknown")]
    pub department: String,
    #[serde(default = "unknown")]
    pub position: String,
    #[serde(default = "default_tenure")]
    pub tenure_months: u32,
    #[serde(default = "default_rating")]
    pub manager_rating: u8,
    #[serde(default = "default_rating")]
    pub performance_rating: u8,
}

impl SentimentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.feedback_text.trim().is_empty() {
            return Err(AppError::Validation(
                "feedback_text must not be empty".to_string(),
            ));
        }
        for (name, rating) in [
            ("manager_rating", self.manager_rating),
            ("performance_rating", self.performance_rating),
        ] {
            if !(1..=5).contains(&rating) {
                return Err(AppError::Validation(format!(
                    "{name} must be between 1 and 5, got {rating}"
                )));
            }
        }
        Ok(())
    }
}

/// Employee context as shown to the model; the feedback text is sent separately.
#[derive(Serialize)]
struct EmployeeContext<'a> {
    employee_id: &'a str,
    department: &'a str,
    position: &'a str,
    tenure_months: u32,
    manager_rating: u8,
    performance_rating: u8,
}

impl<'a> From<&'a SentimentRequest> for EmployeeContext<'a> {
    fn from(req: &'a SentimentRequest) -> Self {
        Self {
            employee_id: &req.employee_id,
            department: &req.department,
            position: &req.position,
            tenure_months: req.tenure_months,
            manager_rating: req.manager_rating,
            performance_rating: req.performance_rating,
        }
    }
}

fn neutral() -> String {
    "neutral".to_string()
}

fn medium() -> String {
    "medium".to_string()
}

/// Sentiment classification as returned by the model.
/// List items may be plain strings or objects; see [`flatten_item`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default = "neutral")]
    pub sentiment: String,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default = "medium")]
    pub attrition_risk: String,
    #[serde(default)]
    pub key_concerns: Vec<Value>,
    #[serde(default)]
    pub positive_indicators: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngagementPlan {
    #[serde(default)]
    pub immediate_actions: Vec<Value>,
    #[serde(default)]
    pub short_term_strategies: Vec<Value>,
    #[serde(default)]
    pub long_term_initiatives: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score <= 0.3 {
            Self::Low
        } else if score <= 0.7 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentResult {
    pub success: bool,
    pub employee_id: String,
    pub sentiment: String,
    pub confidence_score: f64,
    pub attrition_risk: Option<RiskLevel>,
    pub attrition_risk_score: f64,
    pub key_concerns: Vec<String>,
    pub positive_indicators: Vec<String>,
    pub recommended_actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SentimentResult {
    /// Placeholder for a batch entry that could not be analyzed.
    pub fn failed(employee_id: String, error: String) -> Self {
        Self {
            success: false,
            employee_id,
            sentiment: "unknown".to_string(),
            confidence_score: 0.0,
            attrition_risk: None,
            attrition_risk_score: 0.0,
            key_concerns: Vec::new(),
            positive_indicators: Vec::new(),
            recommended_actions: Vec::new(),
            error: Some(error),
        }
    }
}

/// Renders a model list item as text. Objects yield their `key` field when
/// present, otherwise their JSON form.
pub fn flatten_item(item: &Value, key: &str) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => item.to_string(),
        },
        other => other.to_string(),
    }
}

fn sentiment_value(sentiment: &str) -> f64 {
    match sentiment {
        "positive" => 1.0,
        "negative" => 0.0,
        _ => 0.5,
    }
}

fn model_risk_adjustment(risk: &str) -> f64 {
    match risk.trim().to_ascii_lowercase().as_str() {
        "low" => -0.2,
        "high" => 0.3,
        _ => 0.0,
    }
}

/// Attrition risk in [0, 1] from the classification and employee context.
pub fn attrition_risk_score(classification: &Classification, req: &SentimentRequest) -> f64 {
    let mut score = 1.0 - sentiment_value(&normalize_label(&classification.sentiment));
    score += model_risk_adjustment(&classification.attrition_risk);

    if req.tenure_months < 6 {
        score += 0.1;
    } else if req.tenure_months > 36 {
        score -= 0.1;
    }

    if req.manager_rating <= 2 {
        score += 0.2;
    } else if req.manager_rating >= 4 {
        score -= 0.1;
    }

    score += (classification.key_concerns.len() as f64 * 0.05).min(MAX_CONCERN_BOOST);
    score.clamp(0.0, 1.0)
}

/// Every immediate action, then the first few short-term and long-term items
/// tagged with their horizon.
pub fn recommended_actions(plan: &EngagementPlan) -> Vec<String> {
    let mut actions: Vec<String> = plan
        .immediate_actions
        .iter()
        .map(|a| flatten_item(a, "action"))
        .collect();

    for (label, items) in [
        ("Short Term Strategies", &plan.short_term_strategies),
        ("Long Term Initiatives", &plan.long_term_initiatives),
    ] {
        actions.extend(
            items
                .iter()
                .take(FOLLOW_UPS_PER_HORIZON)
                .map(|a| format!("[{label}] {}", flatten_item(a, "action"))),
        );
    }

    actions.truncate(MAX_RECOMMENDED_ACTIONS);
    actions
}

fn normalize_label(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}

fn pretty(value: &impl Serialize) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Internal(e.into()))
}

/// Analyzes one feedback entry. Validation failures surface as 400s.
pub async fn analyze_feedback(
    model: &dyn TextModel,
    req: &SentimentRequest,
) -> Result<SentimentResult, AppError> {
    req.validate()?;
    info!(employee_id = %req.employee_id, "Analyzing feedback");

    let employee_context = pretty(&EmployeeContext::from(req))?;

    debug!("Classifying sentiment");
    let classification: Classification = call_json(
        model,
        &render(
            SENTIMENT_PROMPT,
            &[
                ("employee_context", employee_context.as_str()),
                ("feedback_text", req.feedback_text.as_str()),
            ],
        ),
        SENTIMENT_SYSTEM,
    )
    .await?;

    debug!("Generating engagement recommendations");
    let sentiment_analysis = pretty(&classification)?;
    let plan: EngagementPlan = call_json(
        model,
        &render(
            ENGAGEMENT_PROMPT,
            &[
                ("employee_context", employee_context.as_str()),
                ("sentiment_analysis", sentiment_analysis.as_str()),
                ("feedback_text", req.feedback_text.as_str()),
            ],
        ),
        ENGAGEMENT_SYSTEM,
    )
    .await?;

    let risk_score = attrition_risk_score(&classification, req);
    let risk_level = RiskLevel::from_score(risk_score);
    let sentiment = normalize_label(&classification.sentiment);
    info!(
        employee_id = %req.employee_id,
        %sentiment,
        risk = risk_level.as_str(),
        "Feedback analyzed"
    );

    Ok(SentimentResult {
        success: true,
        employee_id: req.employee_id.clone(),
        sentiment,
        confidence_score: classification.confidence_score.clamp(0.0, 1.0),
        attrition_risk: Some(risk_level),
        attrition_risk_score: risk_score,
        key_concerns: classification
            .key_concerns
            .iter()
            .map(|c| flatten_item(c, "concern"))
            .collect(),
        positive_indicators: classification
            .positive_indicators
            .iter()
            .map(|i| flatten_item(i, "indicator"))
            .collect(),
        recommended_actions: recommended_actions(&plan),
        error: None,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::llm_client::{testing::ScriptedModel, LlmError};
    use crate::sentiment::prompts::{ENGAGEMENT_SYSTEM, SENTIMENT_SYSTEM};

    pub const CLASSIFICATION_JSON: &str = r#"{
        "sentiment": "Negative",
        "confidence_score": 0.9,
        "attrition_risk": "high",
        "key_concerns": ["workload", {"concern": "no promotion path"}],
        "positive_indicators": [{"indicator": "likes the team"}]
    }"#;

    pub const PLAN_JSON: &str = r#"{
        "immediate_actions": [{"action": "Schedule a 1:1", "priority": "high"}, "Review workload"],
        "short_term_strategies": ["Mentoring", "Training budget", "Flexible hours"],
        "long_term_initiatives": [{"action": "Career ladder"}]
    }"#;

    /// Answers both sentiment prompts; `None` for any other system prompt.
    pub fn sentiment_reply(system: &str) -> Option<Result<String, LlmError>> {
        if system == SENTIMENT_SYSTEM {
            Some(Ok(CLASSIFICATION_JSON.to_string()))
        } else if system == ENGAGEMENT_SYSTEM {
            Some(Ok(PLAN_JSON.to_string()))
        } else {
            None
        }
    }

    pub fn sentiment_model() -> ScriptedModel {
        ScriptedModel::new(|_, system| {
            sentiment_reply(system).unwrap_or_else(|| Err(LlmError::EmptyContent))
        })
    }
}
