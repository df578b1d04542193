use std::collections::HashMap;
use std::path::Path;

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::BytesMut;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::screening::parser::{extract_text, DocumentKind};
use crate::screening::requirements::{JobCatalog, JobRequirements};
use crate::screening::screener::{screen_resume, PositionContext, ScreeningResult};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// The uploaded resume, already type-checked and size-checked.
struct Upload {
    file_name: String,
    kind: DocumentKind,
    data: Vec<u8>,
}

/// All parts of a resume form: the file plus any plain text fields.
struct ResumeForm {
    upload: Upload,
    fields: HashMap<String, String>,
}

impl ResumeForm {
    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    fn required_text(&self, name: &str) -> Result<&str, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("Missing form field: {name}")))
    }
}

#[derive(Serialize)]
pub struct JobPositionsResponse {
    pub success: bool,
    pub positions: JobCatalog,
    pub total_departments: usize,
    pub total_positions: usize,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// Streams the file part, failing as soon as it grows past `max_bytes`.
async fn read_upload(mut field: Field<'_>, max_bytes: usize) -> Result<Upload, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let kind = DocumentKind::detect(
        Some(file_name.as_str()).filter(|n| !n.is_empty()),
        field.content_type(),
    )?;

    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} MB upload limit",
                max_bytes / (1024 * 1024)
            )));
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    Ok(Upload {
        file_name,
        kind,
        data: data.to_vec(),
    })
}

async fn read_form(mut multipart: Multipart, max_bytes: usize) -> Result<ResumeForm, AppError> {
    let mut upload = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == FILE_FIELD {
            upload = Some(read_upload(field, max_bytes).await?);
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.insert(name, value);
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    Ok(ResumeForm { upload, fields })
}

async fn screen_upload(
    state: &AppState,
    upload: Upload,
    requirements: &JobRequirements,
) -> Result<ScreeningResult, AppError> {
    info!(
        file = %upload.file_name,
        kind = ?upload.kind,
        bytes = upload.data.len(),
        "Resume received"
    );
    let text = extract_text(upload.kind, upload.data).await?;
    screen_resume(state.llm.as_ref(), &text, requirements).await
}

/// POST /screen-resume
/// Screens the uploaded resume against the default position.
pub async fn handle_screen_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScreeningResult>, AppError> {
    let form = read_form(multipart, state.config.max_upload_bytes).await?;
    let result =
        screen_upload(&state, form.upload, state.catalog.default_requirements()).await?;
    Ok(Json(result))
}

/// POST /screen-resume-with-job
/// Requirements come from the `job_requirements` field when given, else the
/// catalog entry for `department`/`position`, else the default position.
pub async fn handle_screen_resume_with_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScreeningResult>, AppError> {
    let form = read_form(multipart, state.config.max_upload_bytes).await?;
    let department = form.required_text("department")?.to_string();
    let position = form.required_text("position")?.to_string();

    let requirements = match form.text("job_requirements") {
        Some(raw) => JobRequirements::from_form_json(raw)?,
        None => state
            .catalog
            .get(&department, &position)
            .unwrap_or_else(|| state.catalog.default_requirements())
            .clone(),
    };

    let mut result = screen_upload(&state, form.upload, &requirements).await?;
    result.position_context = Some(PositionContext {
        department,
        position,
        screening_date: Utc::now(),
    });
    Ok(Json(result))
}

/// GET /get-job-positions
pub async fn handle_get_job_positions(State(state): State<AppState>) -> Json<JobPositionsResponse> {
    Json(JobPositionsResponse {
        success: true,
        positions: state.catalog.as_ref().clone(),
        total_departments: state.catalog.total_departments(),
        total_positions: state.catalog.total_positions(),
    })
}

/// GET /test-sample-resume
/// Screens the bundled sample resume against the default position.
pub async fn handle_test_sample_resume(
    State(state): State<AppState>,
) -> Result<Json<ScreeningResult>, AppError> {
    let path = Path::new(&state.config.sample_resume_path);
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Sample resume not found".to_string()));
        }
        Err(e) => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Failed to read sample resume {}: {e}",
                path.display()
            )));
        }
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let upload = Upload {
        kind: DocumentKind::detect(Some(file_name.as_str()), None)?,
        file_name,
        data,
    };
    let result = screen_upload(&state, upload, state.catalog.default_requirements()).await?;
    Ok(Json(result))
}
