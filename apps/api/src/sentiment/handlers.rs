use std::collections::BTreeMap;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::sentiment::analyzer::{analyze_feedback, SentimentRequest, SentimentResult};
use crate::state::AppState;

pub const MAX_BATCH_ENTRIES: usize = 50;

const SAMPLE_FEEDBACK: &str = "I really enjoy working here and love the team collaboration, \
but sometimes the workload feels overwhelming.";

#[derive(Debug, Deserialize)]
pub struct BatchSentimentRequest {
    pub feedback_entries: Vec<SentimentRequest>,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub sentiment_distribution: BTreeMap<String, usize>,
    pub risk_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct BatchSentimentResult {
    pub success: bool,
    pub total_entries: usize,
    pub successful_analyses: usize,
    pub failed_analyses: usize,
    pub summary: BatchSummary,
    pub results: Vec<SentimentResult>,
}

impl BatchSentimentResult {
    fn from_results(results: Vec<SentimentResult>) -> Self {
        let mut summary = BatchSummary::default();
        for result in results.iter().filter(|r| r.success) {
            *summary
                .sentiment_distribution
                .entry(result.sentiment.clone())
                .or_default() += 1;
            if let Some(risk) = result.attrition_risk {
                *summary
                    .risk_distribution
                    .entry(risk.as_str().to_string())
                    .or_default() += 1;
            }
        }

        let successful_analyses = results.iter().filter(|r| r.success).count();
        Self {
            success: true,
            total_entries: results.len(),
            successful_analyses,
            failed_analyses: results.len() - successful_analyses,
            summary,
            results,
        }
    }
}

/// POST /analyze-sentiment
pub async fn handle_analyze_sentiment(
    State(state): State<AppState>,
    payload: Result<Json<SentimentRequest>, JsonRejection>,
) -> Result<Json<SentimentResult>, AppError> {
    let Json(req) = payload?;
    let result = analyze_feedback(state.llm.as_ref(), &req).await?;
    Ok(Json(result))
}

/// POST /analyze-sentiment-batch
/// Entries are analyzed in order. A failing entry is reported in place; a
/// provider rate limit aborts the whole batch.
pub async fn handle_analyze_sentiment_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchSentimentRequest>, JsonRejection>,
) -> Result<Json<BatchSentimentResult>, AppError> {
    let Json(batch) = payload?;
    let total = batch.feedback_entries.len();
    if total == 0 || total > MAX_BATCH_ENTRIES {
        return Err(AppError::Validation(format!(
            "feedback_entries must contain between 1 and {MAX_BATCH_ENTRIES} entries, got {total}"
        )));
    }
    info!(entries = total, "Batch sentiment analysis started");

    let mut results = Vec::with_capacity(total);
    for (index, entry) in batch.feedback_entries.into_iter().enumerate() {
        match analyze_feedback(state.llm.as_ref(), &entry).await {
            Ok(result) => results.push(result),
            Err(AppError::ProviderRateLimited) => {
                warn!(index, "Provider rate limit hit, aborting batch");
                return Err(AppError::ProviderRateLimited);
            }
            Err(e) => {
                warn!(index, employee_id = %entry.employee_id, error = %e, "Batch entry failed");
                results.push(SentimentResult::failed(entry.employee_id, e.to_string()));
            }
        }
    }

    let response = BatchSentimentResult::from_results(results);
    info!(
        successful = response.successful_analyses,
        failed = response.failed_analyses,
        "Batch sentiment analysis finished"
    );
    Ok(Json(response))
}

/// GET /test-sample-sentiment
pub async fn handle_test_sample_sentiment(
    State(state): State<AppState>,
) -> Result<Json<SentimentResult>, AppError> {
    let sample = SentimentRequest {
        feedback_text: SAMPLE_FEEDBACK.to_string(),
        employee_id: "DEMO001".to_string(),
        department: "Engineering".to_string(),
        position: "Software Engineer".to_string(),
        tenure_months: 18,
        manager_rating: 4,
        performance_rating: 4,
    };
    let result = analyze_feedback(state.llm.as_ref(), &sample).await?;
    Ok(Json(result))
}
