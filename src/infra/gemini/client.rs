//! Gemini `generateContent` client used for cleaning answers and insights.

use reqwest::Url;
use serde::Deserialize;

use crate::domain::entities::record::{HeaderList, Record};
use crate::domain::entities::update::CleaningRequest;
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::model::{InsightGenerator, ValueDeterminer};

pub const SUPPORTED_MODELS: [&str; 2] = ["gemini-1.5-flash-latest", "gemini-1.5-pro-latest"];
pub const DEFAULT_MODEL: &str = SUPPORTED_MODELS[0];

/// Accepts a supported id, optionally with a `googleai/` prefix. Anything
/// else falls back to [`DEFAULT_MODEL`].
pub fn resolve_model(requested: &str) -> &'static str {
    let bare = requested.trim().trim_start_matches("googleai/");
    match SUPPORTED_MODELS.iter().find(|model| **model == bare) {
        Some(model) => model,
        None => {
            log::warn!("unsupported model {requested:?}, using {DEFAULT_MODEL}");
            DEFAULT_MODEL
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    api_key: Option<String>,
    model: &'static str,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::blocking::Client,
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: &str,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            api_key,
            model: resolve_model(model),
        }
    }

    pub fn model(&self) -> &str {
        self.model
    }

    /// Sends one prompt and returns the JSON object the model answered with.
    fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, PortError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                PortError::ConfigurationMissing("GEMINI_API_KEY is not set".to_string())
            })?;

        let mut url = Url::parse(&self.api_base)
            .map_err(|err| PortError::InvalidInput(format!("invalid gemini api base: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| PortError::InvalidInput("gemini api base cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v1beta", "models", &format!("{}:generateContent", self.model)]);

        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
            "safetySettings": [
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_ONLY_HIGH" }
            ],
        });

        log::debug!("POST generateContent model={}", self.model);
        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|err| PortError::External(format!("model request failed: {err}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            log::warn!("gemini returned {}: {message}", status.as_u16());
            return Err(PortError::External(format!(
                "model request failed ({}): {message}",
                status.as_u16()
            )));
        }

        let parsed: GenerateResponse = resp
            .json()
            .map_err(|err| PortError::Parse(format!("model response: {err}")))?;
        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(PortError::External(format!("model refused the prompt: {reason}")));
        }
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(PortError::Parse("model returned no text".to_string()));
        }
        parse_json_answer(&text)
    }
}

/// Models sometimes wrap JSON in a markdown fence.
fn parse_json_answer(text: &str) -> Result<serde_json::Value, PortError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim())
        .map_err(|err| PortError::Parse(format!("model answer is not json: {err}")))
}

fn string_field(answer: &serde_json::Value, key: &str) -> Result<String, PortError> {
    match &answer[key] {
        serde_json::Value::String(text) => Ok(text.clone()),
        scalar @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_)) => {
            Ok(scalar.to_string())
        }
        serde_json::Value::Null if answer.get(key).is_some() => Ok(String::new()),
        _ => Err(PortError::Parse(format!("model answer has no \"{key}\""))),
    }
}

pub fn cleaning_prompt(request: &CleaningRequest, record: &Record, headers: &HeaderList) -> String {
    let mut details = String::new();
    for (_, header) in headers.named_columns() {
        let value = record.get(header).trim();
        if !value.is_empty() {
            details.push_str(&format!("- {header}: {value}\n"));
        }
    }
    format!(
        "You are an expert data analyst and researcher. Fulfil the user's request for a single company.\n\n\
         User request: \"{}\"\n\n\
         Company information:\n{details}\n\
         Determine the new value for the column \"{}\".\n\n\
         Answer with a JSON object with the single key \"updatedValue\". If you cannot find the \
         information or are unsure, answer {{ \"updatedValue\": \"\" }}. Do not add explanations.",
        request.request, request.target_column
    )
}

pub fn insights_prompt(company_data: &str) -> String {
    format!(
        "You are an expert business analyst for the financial technology sector. Generate insights \
         from the following company data, given as JSON.\n\n\
         Data: {company_data}\n\n\
         Summarize the key trends, patterns and actionable insights: ecosystem category \
         distribution, common headquarters locations, funding (bootstrapped or venture-backed) and \
         employee count ranges. Answer with a JSON object with the single key \"insights\"."
    )
}

impl ValueDeterminer for GeminiClient {
    fn determine_value(
        &self,
        request: &CleaningRequest,
        record: &Record,
        headers: &HeaderList,
    ) -> Result<String, PortError> {
        let answer = self.generate_json(&cleaning_prompt(request, record, headers))?;
        string_field(&answer, "updatedValue")
    }
}

impl InsightGenerator for GeminiClient {
    fn generate_insights(&self, company_data: &str) -> Result<String, PortError> {
        let answer = self.generate_json(&insights_prompt(company_data))?;
        string_field(&answer, "insights")
    }
}
