//! Screening pipeline: parse → extract skills → analyze experience → match → score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::{call_json, prompts::render, TextModel};
use crate::screening::parser::parse_resume;
use crate::screening::prompts::{
    EXPERIENCE_ANALYSIS_PROMPT, EXPERIENCE_ANALYSIS_SYSTEM, JOB_MATCHING_PROMPT,
    JOB_MATCHING_SYSTEM, SKILL_EXTRACTION_PROMPT, SKILL_EXTRACTION_SYSTEM,
};
use crate::screening::requirements::JobRequirements;

/// Resume characters forwarded to the job-matching prompt.
const MATCH_PROMPT_RESUME_CHARS: usize = 2000;

#[derive(Debug, Clone, Serialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub additional: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.40,
            experience: 0.35,
            education: 0.15,
            additional: 0.10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

/// Job-matching verdict as returned by the model. Scores are 0-100.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobMatch {
    #[serde(default)]
    pub skills_match_score: f64,
    #[serde(default)]
    pub experience_match_score: f64,
    #[serde(default)]
    pub education_match_score: f64,
    #[serde(default)]
    pub overall_match_score: f64,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub interview_recommendation: bool,
    #[serde(default)]
    pub detailed_analysis: DetailedAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongHire,
    Hire,
    Maybe,
    Pass,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub skills_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub overall_match_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionContext {
    pub department: String,
    pub position: String,
    pub screening_date: DateTime<Utc>,
}

/// Response body of the screening endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResult {
    pub success: bool,
    pub candidate_name: Option<String>,
    pub candidate_email: Option<String>,
    pub candidate_phone: Option<String>,
    pub final_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub recommendation: Recommendation,
    pub interview_recommended: bool,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub missing_skills: Vec<String>,
    pub resume_word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_context: Option<PositionContext>,
}

/// Weighted 0-100 score from the model's per-dimension scores.
pub fn compute_final_score(job_match: &JobMatch, weights: &ScoringWeights) -> f64 {
    let weighted = job_match.skills_match_score * weights.skills
        + job_match.experience_match_score * weights.experience
        + job_match.education_match_score * weights.education
        + job_match.overall_match_score * weights.additional;
    weighted.clamp(0.0, 100.0)
}

/// The model's own verdict wins when the score backs it up; otherwise the
/// score alone decides.
pub fn recommend(score: f64, model_recommendation: &str) -> Recommendation {
    match model_recommendation.trim().to_ascii_lowercase().as_str() {
        "strong_match" if score >= 80.0 => Recommendation::StrongHire,
        "good_match" if score >= 65.0 => Recommendation::Hire,
        "partial_match" if score >= 50.0 => Recommendation::Maybe,
        _ if score >= 80.0 => Recommendation::StrongHire,
        _ if score >= 65.0 => Recommendation::Hire,
        _ if score >= 50.0 => Recommendation::Maybe,
        _ => Recommendation::Pass,
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn pretty(value: &impl Serialize) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Internal(e.into()))
}

/// Screens extracted resume text against `requirements`.
pub async fn screen_resume(
    model: &dyn TextModel,
    raw_text: &str,
    requirements: &JobRequirements,
) -> Result<ScreeningResult, AppError> {
    let parsed = parse_resume(raw_text);
    let resume_text = parsed.cleaned_text.as_str();
    info!(words = parsed.word_count, "Screening resume");

    debug!("Extracting skills");
    let skills: Value = call_json(
        model,
        &render(SKILL_EXTRACTION_PROMPT, &[("resume_text", resume_text)]),
        SKILL_EXTRACTION_SYSTEM,
    )
    .await?;

    debug!("Analyzing experience");
    let experience: Value = call_json(
        model,
        &render(EXPERIENCE_ANALYSIS_PROMPT, &[("resume_text", resume_text)]),
        EXPERIENCE_ANALYSIS_SYSTEM,
    )
    .await?;

    debug!("Matching against job requirements");
    let job_requirements = pretty(requirements)?;
    let extracted_skills = pretty(&skills)?;
    let extracted_experience = pretty(&experience)?;
    let job_match: JobMatch = call_json(
        model,
        &render(
            JOB_MATCHING_PROMPT,
            &[
                ("job_requirements", job_requirements.as_str()),
                ("extracted_skills", extracted_skills.as_str()),
                ("extracted_experience", extracted_experience.as_str()),
                (
                    "resume_text",
                    truncate_chars(resume_text, MATCH_PROMPT_RESUME_CHARS),
                ),
            ],
        ),
        JOB_MATCHING_SYSTEM,
    )
    .await?;

    let final_score = compute_final_score(&job_match, &ScoringWeights::default());
    let recommendation = recommend(final_score, &job_match.recommendation);
    info!(final_score, ?recommendation, "Screening complete");

    let JobMatch {
        skills_match_score,
        experience_match_score,
        education_match_score,
        overall_match_score,
        interview_recommendation,
        detailed_analysis,
        ..
    } = job_match;

    Ok(ScreeningResult {
        success: true,
        candidate_name: parsed.basic_info.name,
        candidate_email: parsed.basic_info.email,
        candidate_phone: parsed.basic_info.phone,
        final_score,
        score_breakdown: ScoreBreakdown {
            skills_score: skills_match_score,
            experience_score: experience_match_score,
            education_score: education_match_score,
            overall_match_score,
        },
        recommendation,
        interview_recommended: interview_recommendation,
        strengths: detailed_analysis.strengths,
        concerns: detailed_analysis.concerns,
        missing_skills: detailed_analysis.missing_skills,
        resume_word_count: parsed.word_count,
        position_context: None,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::llm_client::{testing::ScriptedModel, LlmError};
    use crate::screening::requirements::JobCatalog;

    const RESUME: &str = "John Smith\njohn@example.com\n555-123-4567\nPython developer, 5 years.";

    fn job_match(scores: [f64; 4], recommendation: &str) -> JobMatch {
        JobMatch {
            skills_match_score: scores[0],
            experience_match_score: scores[1],
            education_match_score: scores[2],
            overall_match_score: scores[3],
            recommendation: recommendation.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_final_score_weighting() {
        // 0.40*90 + 0.35*80 + 0.15*70 + 0.10*85 = 36 + 28 + 10.5 + 8.5 = 83
        let score = compute_final_score(
            &job_match([90.0, 80.0, 70.0, 85.0], ""),
            &ScoringWeights::default(),
        );
        assert!((score - 83.0).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_weights_and_recommendation_serialize_for_results() {
        let weights = serde_json::to_value(ScoringWeights::default()).unwrap();
        assert_eq!(weights["skills"], 0.40);
        assert_eq!(weights["additional"], 0.10);
        assert_eq!(
            serde_json::to_value(Recommendation::StrongHire).unwrap(),
            "strong_hire"
        );
    }

    #[test]
    fn test_final_score_clamped() {
        let score = compute_final_score(
            &job_match([500.0, 500.0, 500.0, 500.0], ""),
            &ScoringWeights::default(),
        );
        assert_eq!(score, 100.0);
        let score = compute_final_score(
            &job_match([-10.0, 0.0, 0.0, 0.0], ""),
            &ScoringWeights::default(),
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_recommend_trusts_model_when_score_agrees() {
        assert_eq!(recommend(82.0, "strong_match"), Recommendation::StrongHire);
        assert_eq!(recommend(66.0, "Good_Match"), Recommendation::Hire);
        assert_eq!(recommend(55.0, "partial_match"), Recommendation::Maybe);
    }

    #[test]
    fn test_recommend_falls_back_to_score() {
        // Model is more optimistic than the score supports.
        assert_eq!(recommend(70.0, "strong_match"), Recommendation::Hire);
        assert_eq!(recommend(40.0, "good_match"), Recommendation::Pass);
        assert_eq!(recommend(85.0, "poor_match"), Recommendation::StrongHire);
        assert_eq!(recommend(50.0, ""), Recommendation::Maybe);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_job_match_tolerates_missing_fields() {
        let m: JobMatch = serde_json::from_str(r#"{"skills_match_score": 40}"#).unwrap();
        assert_eq!(m.skills_match_score, 40.0);
        assert!(!m.interview_recommendation);
        assert!(m.detailed_analysis.strengths.is_empty());
    }

    #[tokio::test]
    async fn test_screen_resume_end_to_end() {
        let model = screening_model();
        let catalog = JobCatalog::builtin();
        let result = screen_resume(&model, RESUME, catalog.default_requirements())
            .await
            .unwrap();

        assert_eq!(model.calls(), 3);
        assert!(result.success);
        assert_eq!(result.candidate_name.as_deref(), Some("John Smith"));
        assert_eq!(result.candidate_email.as_deref(), Some("john@example.com"));
        assert!((result.final_score - 83.0).abs() < 1e-9);
        assert_eq!(result.recommendation, Recommendation::StrongHire);
        assert!(result.interview_recommended);
        assert_eq!(result.missing_skills, vec!["Kubernetes".to_string()]);
    }

    #[tokio::test]
    async fn test_matching_prompt_carries_requirements() {
        let model = ScriptedModel::new(|prompt, system| {
            if system == JOB_MATCHING_SYSTEM {
                assert!(prompt.contains("\"min_years\": 3"));
                assert!(prompt.contains("Return ONLY a valid JSON object"));
            }
            screening_reply(system).unwrap_or_else(|| Err(LlmError::EmptyContent))
        });
        let catalog = JobCatalog::builtin();
        screen_resume(&model, RESUME, catalog.default_requirements())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_provider_rate_limit_propagates() {
        let model = ScriptedModel::new(|_, _| Err(LlmError::RateLimited));
        let catalog = JobCatalog::builtin();
        let err = screen_resume(&model, RESUME, catalog.default_requirements())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProviderRateLimited));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_match_is_llm_error() {
        let model = ScriptedModel::new(|_, system| {
            if system == JOB_MATCHING_SYSTEM {
                Ok("The candidate looks fine.".to_string())
            } else {
                screening_reply(system).unwrap_or_else(|| Err(LlmError::EmptyContent))
            }
        });
        let catalog = JobCatalog::builtin();
        let err = screen_resume(&model, RESUME, catalog.default_requirements())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
