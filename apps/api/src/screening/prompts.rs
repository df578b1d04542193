// Resume screening prompt templates.
// Placeholders are substituted with llm_client::prompts::render.

pub const SKILL_EXTRACTION_SYSTEM: &str = "\
You are an expert technical recruiter. Extract technical skills from resumes \
accurately. Only list skills the resume actually mentions; never infer skills \
from job titles alone. You MUST respond with valid JSON only.";

pub const SKILL_EXTRACTION_PROMPT: &str = r#"Extract all technical skills from the resume below.

RESUME:
{resume_text}

OUTPUT SCHEMA:
{
  "programming_languages": ["string"],
  "frameworks": ["string"],
  "databases": ["string"],
  "cloud_platforms": ["string"],
  "tools": ["string"],
  "other_skills": ["string"]
}"#;

pub const EXPERIENCE_ANALYSIS_SYSTEM: &str = "\
You are an experienced hiring manager. Analyze work history precisely and \
compute years of experience from stated dates. You MUST respond with valid JSON only.";

pub const EXPERIENCE_ANALYSIS_PROMPT: &str = r#"Analyze the work experience in the resume below.

RESUME:
{resume_text}

OUTPUT SCHEMA:
{
  "total_years_experience": number,
  "seniority_level": "junior" | "mid" | "senior" | "lead",
  "roles": [{"title": "string", "company": "string", "duration_years": number}],
  "education": {"highest_degree": "string", "field": "string"},
  "key_achievements": ["string"]
}"#;

pub const JOB_MATCHING_SYSTEM: &str = "\
You are a fair, evidence-driven resume screener. Score candidates against job \
requirements using only the evidence provided. Scores are integers from 0 to 100. \
You MUST respond with valid JSON only.";

pub const JOB_MATCHING_PROMPT: &str = r#"Evaluate how well the candidate matches the job requirements.

JOB REQUIREMENTS:
{job_requirements}

EXTRACTED SKILLS:
{extracted_skills}

EXTRACTED EXPERIENCE:
{extracted_experience}

RESUME (may be truncated):
{resume_text}

OUTPUT SCHEMA:
{
  "skills_match_score": 0-100,
  "experience_match_score": 0-100,
  "education_match_score": 0-100,
  "overall_match_score": 0-100,
  "recommendation": "strong_match" | "good_match" | "partial_match" | "poor_match",
  "interview_recommendation": true | false,
  "detailed_analysis": {
    "strengths": ["string"],
    "concerns": ["string"],
    "missing_skills": ["string"]
  }
}"#;
