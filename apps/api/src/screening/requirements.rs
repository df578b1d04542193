//! Job requirements and the built-in position catalog.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_DEPARTMENT: &str = "Engineering";
pub const DEFAULT_POSITION: &str = "Software Engineer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRequirement {
    pub min_years: u32,
    pub max_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRequirement {
    pub degree: String,
    pub field: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u32,
    pub max: u32,
}

/// What a position asks for. Sent verbatim to the job-matching prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    /// Skill category (e.g. "frameworks") to accepted skills.
    pub required_skills: BTreeMap<String, Vec<String>>,
    pub required_experience: ExperienceRequirement,
    pub required_education: EducationRequirement,
    pub salary_range: SalaryRange,
}

impl JobRequirements {
    /// Parses the `job_requirements` form field of `/screen-resume-with-job`.
    pub fn from_form_json(raw: &str) -> Result<Self, AppError> {
        let requirements: JobRequirements = serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("Invalid job requirements format: {e}")))?;
        if requirements.required_experience.min_years > requirements.required_experience.max_years
        {
            return Err(AppError::Validation(
                "required_experience.min_years exceeds max_years".to_string(),
            ));
        }
        Ok(requirements)
    }
}

/// department -> position -> requirements
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct JobCatalog(BTreeMap<String, BTreeMap<String, JobRequirements>>);

impl JobCatalog {
    pub fn get(&self, department: &str, position: &str) -> Option<&JobRequirements> {
        self.0.get(department).and_then(|p| p.get(position))
    }

    /// Requirements for `/screen-resume`: Engineering / Software Engineer.
    pub fn default_requirements(&self) -> &JobRequirements {
        self.get(DEFAULT_DEPARTMENT, DEFAULT_POSITION)
            .unwrap_or(&SOFTWARE_ENGINEER)
    }

    pub fn total_departments(&self) -> usize {
        self.0.len()
    }

    pub fn total_positions(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn builtin() -> Self {
        let mut catalog: BTreeMap<String, BTreeMap<String, JobRequirements>> = BTreeMap::new();

        let engineering = catalog.entry(DEFAULT_DEPARTMENT.to_string()).or_default();
        engineering.insert(DEFAULT_POSITION.to_string(), SOFTWARE_ENGINEER.clone());
        engineering.insert(
            "Senior Software Engineer".to_string(),
            requirements(
                vec![
                    ("programming_languages", vec!["Python", "Java", "JavaScript", "Go", "Rust"]),
                    (
                        "frameworks",
                        vec!["React", "Node.js", "Django", "Spring Boot", "Microservices"],
                    ),
                    ("databases", vec!["MySQL", "PostgreSQL", "MongoDB", "Redis"]),
                    ("cloud_platforms", vec!["AWS", "Azure", "Google Cloud"]),
                    ("tools", vec!["Git", "Docker", "Kubernetes", "Jenkins", "Terraform"]),
                ],
                (5, 10),
                "Bachelor's",
                &["Computer Science", "Software Engineering", "Information Technology"],
                (120_000, 180_000),
            ),
        );

        catalog.entry("Data Science".to_string()).or_default().insert(
            "Data Scientist".to_string(),
            requirements(
                vec![
                    ("programming_languages", vec!["Python", "R", "SQL"]),
                    (
                        "frameworks",
                        vec!["Pandas", "NumPy", "Scikit-learn", "TensorFlow", "PyTorch"],
                    ),
                    ("databases", vec!["MySQL", "PostgreSQL", "MongoDB", "BigQuery"]),
                    ("cloud_platforms", vec!["AWS", "Azure", "Google Cloud"]),
                    ("tools", vec!["Jupyter", "Git", "Tableau", "Power BI"]),
                ],
                (3, 7),
                "Master's",
                &["Data Science", "Statistics", "Mathematics", "Computer Science"],
                (90_000, 140_000),
            ),
        );

        Self(catalog)
    }
}

static SOFTWARE_ENGINEER: Lazy<JobRequirements> = Lazy::new(|| {
    requirements(
        vec![
            ("programming_languages", vec!["Python", "Java", "JavaScript"]),
            ("frameworks", vec!["React", "Node.js", "Django", "Spring Boot"]),
            ("databases", vec!["MySQL", "PostgreSQL", "MongoDB"]),
            ("cloud_platforms", vec!["AWS", "Azure", "Google Cloud"]),
            ("tools", vec!["Git", "Docker", "Kubernetes", "Jenkins"]),
        ],
        (3, 7),
        "Bachelor's",
        &["Computer Science", "Software Engineering", "Information Technology"],
        (80_000, 120_000),
    )
});

fn requirements(
    skills: Vec<(&str, Vec<&str>)>,
    years: (u32, u32),
    degree: &str,
    fields: &[&str],
    salary: (u32, u32),
) -> JobRequirements {
    JobRequirements {
        required_skills: skills
            .into_iter()
            .map(|(category, items)| {
                (
                    category.to_string(),
                    items.into_iter().map(str::to_string).collect(),
                )
            })
            .collect(),
        required_experience: ExperienceRequirement {
            min_years: years.0,
            max_years: years.1,
        },
        required_education: EducationRequirement {
            degree: degree.to_string(),
            field: fields.iter().map(|s| s.to_string()).collect(),
        },
        salary_range: SalaryRange {
            min: salary.0,
            max: salary.1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_totals() {
        let catalog = JobCatalog::builtin();
        assert_eq!(catalog.total_departments(), 2);
        assert_eq!(catalog.total_positions(), 3);
    }

    #[test]
    fn test_default_is_software_engineer() {
        let catalog = JobCatalog::builtin();
        let req = catalog.default_requirements();
        assert_eq!(req.required_experience.min_years, 3);
        assert_eq!(req.salary_range.max, 120_000);
        assert!(req.required_skills["tools"].contains(&"Docker".to_string()));
    }

    #[test]
    fn test_lookup_unknown_position() {
        let catalog = JobCatalog::builtin();
        assert!(catalog.get("Engineering", "Astronaut").is_none());
        assert!(catalog.get("Data Science", "Data Scientist").is_some());
    }

    #[test]
    fn test_catalog_serializes_as_nested_map() {
        let json = serde_json::to_value(JobCatalog::builtin()).unwrap();
        assert_eq!(
            json["Data Science"]["Data Scientist"]["required_education"]["degree"],
            "Master's"
        );
    }

    #[test]
    fn test_form_json_parses() {
        let raw = r#"{
            "required_skills": {"languages": ["Rust"]},
            "required_experience": {"min_years": 2, "max_years": 5},
            "required_education": {"degree": "Bachelor's", "field": ["CS"]},
            "salary_range": {"min": 1, "max": 2}
        }"#;
        let req = JobRequirements::from_form_json(raw).unwrap();
        assert_eq!(req.required_skills["languages"], vec!["Rust".to_string()]);
    }

    #[test]
    fn test_form_json_rejects_malformed() {
        assert!(matches!(
            JobRequirements::from_form_json("{not json"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_form_json_rejects_inverted_experience() {
        let raw = r#"{
            "required_skills": {},
            "required_experience": {"min_years": 9, "max_years": 5},
            "required_education": {"degree": "Bachelor's", "field": []},
            "salary_range": {"min": 1, "max": 2}
        }"#;
        assert!(JobRequirements::from_form_json(raw).is_err());
    }
}
