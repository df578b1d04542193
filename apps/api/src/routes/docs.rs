use axum::{extract::State, response::Html, Json};
use serde_json::{json, Map, Value};

use crate::sentiment::handlers::MAX_BATCH_ENTRIES;
use crate::state::AppState;

const SERVICE_NAME: &str = "HR Tech AI API";
const SERVICE_DESCRIPTION: &str = "AI-powered resume screening and employee sentiment analysis";

/// One public route, shared by the root index and the OpenAPI document.
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub key: &'static str,
    pub tag: &'static str,
    pub summary: &'static str,
    pub rate_limited: bool,
}

pub const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method: "post",
        path: "/screen-resume",
        key: "resume_screening",
        tag: "screening",
        summary: "Screen a resume (PDF, DOCX or TXT) against the default position",
        rate_limited: true,
    },
    Endpoint {
        method: "post",
        path: "/screen-resume-with-job",
        key: "resume_screening_with_job",
        tag: "screening",
        summary: "Screen a resume against a catalog position or custom requirements",
        rate_limited: true,
    },
    Endpoint {
        method: "get",
        path: "/get-job-positions",
        key: "job_positions",
        tag: "screening",
        summary: "List the built-in job positions and their requirements",
        rate_limited: true,
    },
    Endpoint {
        method: "post",
        path: "/analyze-sentiment",
        key: "sentiment_analysis",
        tag: "sentiment",
        summary: "Classify one feedback entry and score attrition risk",
        rate_limited: true,
    },
    Endpoint {
        method: "post",
        path: "/analyze-sentiment-batch",
        key: "batch_sentiment",
        tag: "sentiment",
        summary: "Analyze up to 50 feedback entries in order",
        rate_limited: true,
    },
    Endpoint {
        method: "get",
        path: "/test-sample-resume",
        key: "sample_resume",
        tag: "samples",
        summary: "Screen the bundled sample resume",
        rate_limited: true,
    },
    Endpoint {
        method: "get",
        path: "/test-sample-sentiment",
        key: "sample_sentiment",
        tag: "samples",
        summary: "Analyze a built-in sample feedback entry",
        rate_limited: true,
    },
    Endpoint {
        method: "get",
        path: "/health",
        key: "health",
        tag: "meta",
        summary: "Component health; always 200",
        rate_limited: false,
    },
    Endpoint {
        method: "get",
        path: "/docs",
        key: "docs",
        tag: "meta",
        summary: "Interactive API documentation",
        rate_limited: false,
    },
    Endpoint {
        method: "get",
        path: "/openapi.json",
        key: "openapi",
        tag: "meta",
        summary: "OpenAPI 3 document",
        rate_limited: false,
    },
];

/// GET /
pub async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    let endpoints: Map<String, Value> = ENDPOINTS
        .iter()
        .map(|e| (e.key.to_string(), Value::from(e.path)))
        .collect();

    Json(json!({
        "message": SERVICE_NAME,
        "description": SERVICE_DESCRIPTION,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
        "documentation": "/docs",
        "rate_limit": format!("{} requests per minute per IP", state.config.rate_limit_per_minute),
    }))
}

/// GET /openapi.json
pub async fn openapi_handler(State(state): State<AppState>) -> Json<Value> {
    Json(openapi_document(state.config.rate_limit_per_minute))
}

/// GET /docs
pub async fn docs_handler() -> Html<&'static str> {
    Html(DOCS_PAGE)
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Error"}}}
    })
}

fn responses(endpoint: &Endpoint) -> Value {
    let mut responses = Map::new();
    responses.insert("200".to_string(), json!({"description": "Success"}));

    match endpoint.path {
        "/screen-resume" | "/screen-resume-with-job" => {
            responses.insert("400".into(), error_response("Missing or empty file"));
            responses.insert("413".into(), error_response("File larger than the upload limit"));
            responses.insert("415".into(), error_response("File type is not PDF, DOCX or TXT"));
            responses.insert("422".into(), error_response("No text could be extracted"));
        }
        "/analyze-sentiment" | "/analyze-sentiment-batch" => {
            responses.insert("400".into(), error_response("Invalid feedback entry"));
        }
        "/test-sample-resume" => {
            responses.insert("404".into(), error_response("Sample resume not found"));
        }
        _ => {}
    }

    if endpoint.rate_limited {
        responses.insert(
            "429".into(),
            error_response("Client or AI provider rate limit exceeded"),
        );
        responses.insert("502".into(), error_response("AI provider failure"));
    }
    Value::Object(responses)
}

fn request_body(path: &str) -> Option<Value> {
    match path {
        "/screen-resume" => Some(json!({
            "required": true,
            "content": {"multipart/form-data": {"schema": {
                "type": "object",
                "required": ["file"],
                "properties": {"file": {"type": "string", "format": "binary"}}
            }}}
        })),
        "/screen-resume-with-job" => Some(json!({
            "required": true,
            "content": {"multipart/form-data": {"schema": {
                "type": "object",
                "required": ["file", "department", "position"],
                "properties": {
                    "file": {"type": "string", "format": "binary"},
                    "department": {"type": "string"},
                    "position": {"type": "string"},
                    "job_requirements": {
                        "type": "string",
                        "description": "JSON-encoded job requirements overriding the catalog"
                    }
                }
            }}}
        })),
        "/analyze-sentiment" => Some(json!({
            "required": true,
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/SentimentRequest"}}}
        })),
        "/analyze-sentiment-batch" => Some(json!({
            "required": true,
            "content": {"application/json": {"schema": {
                "type": "object",
                "required": ["feedback_entries"],
                "properties": {"feedback_entries": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": MAX_BATCH_ENTRIES,
                    "items": {"$ref": "#/components/schemas/SentimentRequest"}
                }}
            }}}
        })),
        _ => None,
    }
}

pub fn openapi_document(rate_limit_per_minute: u32) -> Value {
    let mut paths = Map::new();
    for endpoint in ENDPOINTS {
        let mut operation = json!({
            "summary": endpoint.summary,
            "tags": [endpoint.tag],
            "responses": responses(endpoint),
        });
        if let Some(body) = request_body(endpoint.path) {
            operation["requestBody"] = body;
        }

        let item = paths
            .entry(endpoint.path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        item[endpoint.method] = operation;
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": SERVICE_NAME,
            "description": format!(
                "{SERVICE_DESCRIPTION}. Rate limited to {rate_limit_per_minute} requests per minute per client IP."
            ),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": paths,
        "components": {"schemas": {
            "Error": {
                "type": "object",
                "properties": {"error": {
                    "type": "object",
                    "properties": {
                        "code": {"type": "string"},
                        "message": {"type": "string"}
                    }
                }}
            },
            "SentimentRequest": {
                "type": "object",
                "required": ["feedback_text", "employee_id"],
                "properties": {
                    "feedback_text": {"type": "string"},
                    "employee_id": {"type": "string"},
                    "department": {"type": "string", "default": "Unknown"},
                    "position": {"type": "string", "default": "Unknown"},
                    "tenure_months": {"type": "integer", "default": 12, "minimum": 0},
                    "manager_rating": {"type": "integer", "default": 3, "minimum": 1, "maximum": 5},
                    "performance_rating": {"type": "integer", "default": 3, "minimum": 1, "maximum": 5}
                }
            }
        }}
    })
}

const DOCS_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>HR Tech AI API - Docs</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;
