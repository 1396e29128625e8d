use crate::error::{PipelineError, Result};
use crate::models::ScreenType;
use reqwest::{header::HeaderMap, Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

/// Which raw shape the upstream response arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    OutputText,
    Choices,
    Unrecognized,
}

/// The one normalized view of an upstream response. Extractors only ever
/// see this, never the raw JSON.
#[derive(Debug, Clone)]
pub struct NormalizedResponse {
    pub kind: ResponseKind,
    pub text: String,
    /// Citation titles from web-search results, when the service returned
    /// any.
    pub citations: Vec<String>,
}

impl NormalizedResponse {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// What the on-device location collaborator supplied, if anything.
#[derive(Debug, Clone, Default)]
pub struct Location {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub model: Option<String>,
    pub temperature: f32,
    pub web_search: bool,
    pub location: Option<Location>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.3,
            web_search: false,
            location: None,
        }
    }
}

/// Client for the text-generation/web-search service.
#[derive(Debug, Clone)]
pub struct TextServiceClient {
    client: Client,
    base_url: String,
    default_model: String,
    default_city: String,
}

impl TextServiceClient {
    pub fn new(base_url: &str, api_key: &str, default_model: &str, default_city: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", api_key).parse().unwrap(),
        );
        headers.insert("Content-Type", "application/json".parse().unwrap());

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: default_model.to_string(),
            default_city: default_city.to_string(),
        }
    }

    /// A missing or partial location falls back to the configured default
    /// city rather than failing.
    pub fn location_hint(&self, location: Option<&Location>) -> String {
        let Some(location) = location else {
            return self.default_city.clone();
        };
        let Some(city) = location.city.as_deref() else {
            return self.default_city.clone();
        };
        let mut hint = city.to_string();
        for part in [location.region.as_deref(), location.country.as_deref()] {
            if let Some(part) = part {
                hint.push_str(", ");
                hint.push_str(part);
            }
        }
        hint
    }

    pub async fn generate(&self, prompt: &str, opts: &GenerateOptions) -> Result<NormalizedResponse> {
        let tools = if opts.web_search {
            json!([{
                "type": "web_search",
                "user_location": { "city": self.location_hint(opts.location.as_ref()) },
            }])
        } else {
            json!([])
        };
        let body = json!({
            "model": opts.model.as_deref().unwrap_or(&self.default_model),
            "input": prompt,
            "temperature": opts.temperature,
            "tools": tools,
        });

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::ExternalServiceError(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let raw: Value = response
                    .json()
                    .await
                    .map_err(|e| PipelineError::SerializationError(e.to_string()))?;
                let normalized = normalize_response(&raw);
                debug!(
                    "Text service returned {:?} shape, {} chars, {} citations",
                    normalized.kind,
                    normalized.text.len(),
                    normalized.citations.len()
                );
                Ok(normalized)
            }
            status => Err(PipelineError::ExternalServiceError(format!(
                "Unexpected status code: {}",
                status
            ))),
        }
    }

    /// Asks the service to classify a query into the closed screen-type
    /// set. Anything outside the set is discarded, not an error.
    pub async fn classify_screen_type(&self, user_text: &str) -> Result<Option<ScreenType>> {
        let prompt = format!(
            "Classify this movie-app request into a screen. Respond with exactly one of \
             MOVIE_GALLERY, MOVIE_DETAILS, CINEMA_GALLERY, CINEMA_DETAILS, MOVIE_SHOWTIMES, \
             START_SCREEN, or NONE. No other words.\n\nRequest: {}",
            user_text
        );
        let opts = GenerateOptions {
            temperature: 0.0,
            ..Default::default()
        };
        let response = self.generate(&prompt, &opts).await?;
        Ok(response.text.trim().parse::<ScreenType>().ok())
    }
}

/// Folds the raw shapes the service is known to produce into one view.
/// Anything unrecognizable becomes an empty Unrecognized response, which
/// downstream extraction treats as "nothing found".
pub fn normalize_response(raw: &Value) -> NormalizedResponse {
    let citations = collect_citations(raw);

    if let Some(text) = raw.get("output_text").and_then(Value::as_str) {
        return NormalizedResponse {
            kind: ResponseKind::OutputText,
            text: text.to_string(),
            citations,
        };
    }

    if let Some(text) = choices_text(raw) {
        return NormalizedResponse {
            kind: ResponseKind::Choices,
            text,
            citations,
        };
    }

    NormalizedResponse {
        kind: ResponseKind::Unrecognized,
        text: String::new(),
        citations,
    }
}

fn choices_text(raw: &Value) -> Option<String> {
    if let Some(content) = raw
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        return Some(content.to_string());
    }

    // "items" carries an array of messages whose content is either a plain
    // string or a list of text parts.
    let items = raw.get("items").and_then(Value::as_array)?;
    let mut text = String::new();
    for item in items {
        match item.get("content") {
            Some(Value::String(s)) => text.push_str(s),
            Some(Value::Array(parts)) => {
                for part in parts {
                    if let Some(s) = part.get("text").and_then(Value::as_str) {
                        text.push_str(s);
                    }
                }
            }
            _ => {}
        }
    }
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn collect_citations(raw: &Value) -> Vec<String> {
    let mut titles = Vec::new();
    if let Some(citations) = raw.get("citations").and_then(Value::as_array) {
        for citation in citations {
            let title = citation
                .get("title")
                .and_then(Value::as_str)
                .or_else(|| citation.as_str());
            if let Some(title) = title {
                titles.push(title.to_string());
            }
        }
    }
    titles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_text_shape_is_recognized() {
        let raw = json!({ "output_text": "Dune is playing nearby." });
        let normalized = normalize_response(&raw);
        assert_eq!(normalized.kind, ResponseKind::OutputText);
        assert_eq!(normalized.text, "Dune is playing nearby.");
    }

    #[test]
    fn choices_shape_is_recognized() {
        let raw = json!({
            "choices": [{ "message": { "content": "Here are some movies." } }]
        });
        let normalized = normalize_response(&raw);
        assert_eq!(normalized.kind, ResponseKind::Choices);
        assert_eq!(normalized.text, "Here are some movies.");
    }

    #[test]
    fn items_shape_concatenates_text_parts() {
        let raw = json!({
            "items": [
                { "content": [{ "text": "Part one. " }, { "text": "Part two." }] },
                { "content": "And a plain string." }
            ]
        });
        let normalized = normalize_response(&raw);
        assert_eq!(normalized.kind, ResponseKind::Choices);
        assert_eq!(normalized.text, "Part one. Part two.And a plain string.");
    }

    #[test]
    fn unrecognized_shape_is_empty_not_an_error() {
        let normalized = normalize_response(&json!({ "unexpected": 42 }));
        assert_eq!(normalized.kind, ResponseKind::Unrecognized);
        assert!(normalized.is_empty());
    }

    #[test]
    fn citations_prefer_title_fields() {
        let raw = json!({
            "output_text": "see below",
            "citations": [
                { "title": "AMC Empire 25", "url": "https://example.com" },
                "Regal Union Square"
            ]
        });
        let normalized = normalize_response(&raw);
        assert_eq!(
            normalized.citations,
            vec!["AMC Empire 25", "Regal Union Square"]
        );
    }

    #[test]
    fn location_hint_falls_back_to_default_city() {
        let client = TextServiceClient::new("https://svc.example.com", "key", "model", "New York");
        assert_eq!(client.location_hint(None), "New York");
        assert_eq!(
            client.location_hint(Some(&Location::default())),
            "New York"
        );
        let full = Location {
            city: Some("Austin".to_string()),
            region: Some("TX".to_string()),
            country: Some("US".to_string()),
        };
        assert_eq!(client.location_hint(Some(&full)), "Austin, TX, US");
    }
}
