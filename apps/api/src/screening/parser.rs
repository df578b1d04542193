//! Resume text extraction and contact-info parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::errors::AppError;

/// Upload formats the screener can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

pub const ALLOWED_EXTENSIONS: &str = ".pdf, .docx, .txt";

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" | "text" => Some(Self::Txt),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence {
            "application/pdf" => Some(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            "text/plain" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Resolves the kind from the file name's extension. The declared MIME
    /// type is only consulted when the name carries no extension at all.
    pub fn detect(file_name: Option<&str>, mime: Option<&str>) -> Result<Self, AppError> {
        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_string());

        let kind = match &extension {
            Some(ext) => Self::from_extension(ext),
            None => mime.and_then(Self::from_mime),
        };

        kind.ok_or_else(|| {
            let received = extension
                .map(|e| format!(".{}", e.to_ascii_lowercase()))
                .or_else(|| mime.map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string());
            AppError::UnsupportedMediaType(format!(
                "Unsupported file type: {received}. Allowed: {ALLOWED_EXTENSIONS}"
            ))
        })
    }
}

/// Contact details pulled from the raw resume text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedResume {
    pub cleaned_text: String,
    pub basic_info: BasicInfo,
    pub word_count: usize,
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\.,;:\(\)\-\+@#]").unwrap());
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONES: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").unwrap(),
        Regex::new(r"\(\d{3}\)\s*\d{3}[-.]?\d{4}").unwrap(),
        Regex::new(r"\b\d{10}\b").unwrap(),
    ]
});
static NAME_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s\.]+$").unwrap());

/// Extracts plain text from an uploaded document.
/// PDF extraction is CPU-bound and may panic on malformed input, so it runs
/// on the blocking pool.
pub async fn extract_text(kind: DocumentKind, data: Vec<u8>) -> Result<String, AppError> {
    let text = match kind {
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data).map_err(|e| e.to_string())
        })
        .await
        .map_err(|_| AppError::UnprocessableEntity("PDF could not be read".to_string()))?
        .map_err(|e| AppError::UnprocessableEntity(format!("Error reading PDF: {e}")))?,
        DocumentKind::Docx => extract_text_from_docx(&data)?,
        DocumentKind::Txt => String::from_utf8_lossy(&data).into_owned(),
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the uploaded file".to_string(),
        ));
    }
    Ok(text)
}

fn extract_text_from_docx(data: &[u8]) -> Result<String, AppError> {
    use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

    let docx = read_docx(data)
        .map_err(|e| AppError::UnprocessableEntity(format!("Error reading DOCX: {e}")))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            for paragraph_child in p.children {
                if let ParagraphChild::Run(run) = paragraph_child {
                    for run_child in run.children {
                        if let RunChild::Text(t) = run_child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Collapses whitespace and replaces characters the prompts do not need.
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    DISALLOWED
        .replace_all(collapsed.trim(), " ")
        .into_owned()
}

pub fn extract_basic_info(raw_text: &str) -> BasicInfo {
    let email = EMAIL.find(raw_text).map(|m| m.as_str().to_string());

    let phone = PHONES
        .iter()
        .find_map(|re| re.find(raw_text))
        .map(|m| m.as_str().to_string());

    let name = raw_text
        .lines()
        .take(3)
        .map(str::trim)
        .find(|line| {
            line.len() > 2 && line.split_whitespace().count() <= 4 && NAME_LINE.is_match(line)
        })
        .map(str::to_string);

    BasicInfo { name, email, phone }
}

pub fn parse_resume(raw_text: &str) -> ParsedResume {
    let cleaned_text = clean_text(raw_text);
    let basic_info = extract_basic_info(raw_text);
    let word_count = cleaned_text.split_whitespace().count();
    ParsedResume {
        cleaned_text,
        basic_info,
        word_count,
    }
}

#[cfg(test)]
pub(crate) fn docx_fixture(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    let doc = paragraphs.iter().fold(Docx::new(), |doc, text| {
        doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });
    let mut buf = Cursor::new(Vec::new());
    doc.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

/// One-page PDF with the resume lines drawn in Helvetica.
#[cfg(test)]
pub(crate) const PDF_FIXTURE: &[u8] = include_bytes!("../../data/fixtures/resume.pdf");
