// Chef service: plain-language explanations of results and recipe extraction from photos.
//
// One prompt, one reply. The calls block, so they are made from the background worker.

use crate::Utils::config::ServiceSettings;
use crate::cafe::evaluator::{CalculationKind, ResultBundle};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Error from the chef service
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// API key variable is not set
    MissingKey(String),
    /// Network error
    Network(String),
    /// API error response
    Api { status: u16, message: String },
    /// Failed to parse response
    Parse(String),
    /// Reply had no text in it
    EmptyReply,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::MissingKey(var) => write!(f, "API key not configured (set {})", var),
            ServiceError::Network(msg) => write!(f, "Network error: {}", msg),
            ServiceError::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            ServiceError::Parse(msg) => write!(f, "Failed to parse response: {}", msg),
            ServiceError::EmptyReply => write!(f, "The chef had nothing to say"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// What the session needs from a text/vision model.
pub trait ChefService: Send + Sync {
    /// HTML explanation of `results` computed for `expression`.
    fn explain(
        &self,
        kind: CalculationKind,
        expression: &str,
        results: &ResultBundle,
    ) -> Result<String, ServiceError>;

    /// Raw model reply for the photo of a function; see [`clean_extracted_expression`].
    fn analyze_image(&self, image_base64: &str, mime: &str) -> Result<String, ServiceError>;
}

// ============================================================================
// Gemini API types
// ============================================================================

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    fn image(mime: &str, data: &str) -> Self {
        Part {
            inline_data: Some(InlineData {
                mime_type: mime.to_string(),
                data: data.to_string(),
            }),
            ..Default::default()
        }
    }
}

// ============================================================================
// Prompts
// ============================================================================

pub fn build_explanation_prompt(
    kind: CalculationKind,
    expression: &str,
    results: &ResultBundle,
) -> String {
    let numbers = serde_json::to_string(results).unwrap_or_default();
    let mut prompt = String::new();
    prompt.push_str(
        "You are the head chef of the MatchaBerry Cafe, a cozy bakery where calculus is served \
         with matcha and strawberries. Explain the result below to a curious student.\n\n",
    );
    prompt.push_str(&format!("CALCULATION: {}\n", kind));
    prompt.push_str(&format!("FUNCTION: f(x, y) = {}\n", expression));
    prompt.push_str(&format!("RESULTS: {}\n\n", numbers));
    prompt.push_str(
        "Use short HTML (<p>, <b>, <i>, <ul>, <li> only, no <html> or <body>). \
         Keep it under 120 words, use one baking metaphor, and say what the sign \
         and size of each number mean for the shape of the surface.",
    );
    prompt
}

pub const IMAGE_PROMPT: &str = "This image shows a mathematical function of two variables x and y. \
Extract it and reply with ONLY the expression in plain calculator syntax \
(use ^ for powers, * for products, sin, cos, tan, exp, ln, sqrt). \
No words, no LaTeX, no code blocks. Example reply: x^2 - y^2";

/// Strips code fences, backticks and a leading `f(x,y) =` or `z =` from a model reply.
pub fn clean_extracted_expression(reply: &str) -> String {
    let mut text = reply.trim();
    if text.starts_with("```") {
        text = text.trim_start_matches('`');
        // fence language tag
        text = match text.find('\n') {
            Some(pos) if !text[..pos].contains(['=', '(', '^', '*']) => &text[pos + 1..],
            _ => text,
        };
        text = text.trim_end().trim_end_matches('`');
    }
    let mut text = text.trim().trim_matches('`').trim();
    if let Some(pos) = text.find('=') {
        let lhs: String = text[..pos].chars().filter(|c| !c.is_whitespace()).collect();
        if matches!(lhs.as_str(), "f(x,y)" | "z" | "f") {
            text = text[pos + 1..].trim();
        }
    }
    text.trim_end_matches(['.', ';']).trim().to_string()
}

/// MIME type of an image from its extension; unknown extensions are sent as PNG.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

// ============================================================================
// Client
// ============================================================================

/// Blocking client of the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(settings: &ServiceSettings, api_key: String) -> Result<Self, ServiceError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        Ok(GeminiClient {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        })
    }

    /// Client with the key read from the environment variable named in `settings`.
    pub fn from_env(settings: &ServiceSettings) -> Result<Self, ServiceError> {
        let api_key = settings
            .api_key()
            .ok_or_else(|| ServiceError::MissingKey(settings.api_key_env.clone()))?;
        Self::new(settings, api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn generate(&self, parts: Vec<Part>) -> Result<String, ServiceError> {
        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };
        debug!("POST {}", self.endpoint());
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            let message = match serde_json::from_str::<GeminiError>(&error_text) {
                Ok(error) => error.error.message,
                Err(_) => error_text,
            };
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        let text: String = body
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();
        if text.trim().is_empty() {
            return Err(ServiceError::EmptyReply);
        }
        Ok(text)
    }
}

impl ChefService for GeminiClient {
    fn explain(
        &self,
        kind: CalculationKind,
        expression: &str,
        results: &ResultBundle,
    ) -> Result<String, ServiceError> {
        info!("asking the chef about {} of {}", kind, expression);
        self.generate(vec![Part::text(build_explanation_prompt(kind, expression, results))])
    }

    fn analyze_image(&self, image_base64: &str, mime: &str) -> Result<String, ServiceError> {
        info!("asking the chef to read a {} photo", mime);
        self.generate(vec![Part::text(IMAGE_PROMPT), Part::image(mime, image_base64)])
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn settings(base_url: &str) -> ServiceSettings {
        ServiceSettings {
            base_url: base_url.to_string(),
            model: "gemini-test".to_string(),
            timeout_secs: 5,
            api_key_env: "MATCHABERRY_TEST_KEY_UNSET".to_string(),
        }
    }

    fn partial_bundle() -> ResultBundle {
        ResultBundle::Partial {
            f_x: "2*x".to_string(),
            f_y: "-2*y".to_string(),
            val_x: 2.0,
            val_y: -4.0,
        }
    }

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        })
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::text("read this"), Part::image("image/png", "AAAA")],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "contents": [{"parts": [
                    {"text": "read this"},
                    {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
                ]}]
            })
        );
    }

    #[test]
    fn test_explanation_prompt_carries_kind_and_numbers() {
        let prompt = build_explanation_prompt(CalculationKind::Partial, "x^2 - y^2", &partial_bundle());
        assert!(prompt.contains("Partial Rate of Change"));
        assert!(prompt.contains("f(x, y) = x^2 - y^2"));
        assert!(prompt.contains("\"val_y\":-4.0"));
    }

    #[test]
    fn test_explain_posts_to_generate_content() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-test:generateContent")
                .query_param("key", "test-key")
                .header("content-type", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(reply("<p>Sweet <b>slope</b></p>"));
        });

        let client = GeminiClient::new(&settings(&server.base_url()), "test-key".to_string()).unwrap();
        let html = client
            .explain(CalculationKind::Partial, "x^2 - y^2", &partial_bundle())
            .unwrap();
        mock.assert();
        assert_eq!(html, "<p>Sweet <b>slope</b></p>");
    }

    #[test]
    fn test_http_error_is_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(403)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
                }));
        });

        let client = GeminiClient::new(&settings(&server.base_url()), "bad".to_string()).unwrap();
        let err = client.analyze_image("AAAA", "image/png").unwrap_err();
        assert_eq!(
            err,
            ServiceError::Api {
                status: 403,
                message: "API key not valid".to_string()
            }
        );
    }

    #[test]
    fn test_empty_candidates() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"candidates": []}));
        });

        let client = GeminiClient::new(&settings(&server.base_url()), "k".to_string()).unwrap();
        assert_eq!(client.analyze_image("AAAA", "image/png"), Err(ServiceError::EmptyReply));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).body("not json");
        });

        let client = GeminiClient::new(&settings(&server.base_url()), "k".to_string()).unwrap();
        assert!(matches!(
            client.analyze_image("AAAA", "image/png"),
            Err(ServiceError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_key() {
        let result = GeminiClient::from_env(&settings("http://localhost"));
        assert!(matches!(result, Err(ServiceError::MissingKey(var)) if var == "MATCHABERRY_TEST_KEY_UNSET"));
    }

    #[test]
    fn test_clean_extracted_expression() {
        assert_eq!(clean_extracted_expression("x^2 - y^2"), "x^2 - y^2");
        assert_eq!(clean_extracted_expression("`sin(x)*y`"), "sin(x)*y");
        assert_eq!(clean_extracted_expression("```\nx*y\n```"), "x*y");
        assert_eq!(clean_extracted_expression("```math\nexp(x) + y\n```\n"), "exp(x) + y");
        assert_eq!(clean_extracted_expression("f(x, y) = x^2 + y^2"), "x^2 + y^2");
        assert_eq!(clean_extracted_expression("z = x*y."), "x*y");
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("menu.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("board.webp")), "image/webp");
        assert_eq!(mime_from_path(Path::new("noext")), "image/png");
        assert_eq!(encode_image(b"hi"), "aGk=");
    }
}
