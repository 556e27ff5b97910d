use log::{debug, error, info, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::settings::GuidanceConfig;
use crate::error::FetchError;
use crate::guidance::prompt::build_prompt;
use crate::http::build_http_client;
use crate::models::{History, PrayerType, Recommendation, RecommendationKind};

/// Client for the generative guidance service.
pub struct GuidanceClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GuidanceClient {
    pub fn new(config: &GuidanceConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(config.timeout())?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Recommendations for right now. Failures are logged and yield an empty list.
    pub async fn fetch(
        &self,
        history: &History,
        next_prayer: PrayerType,
        user_name: &str,
    ) -> Vec<Recommendation> {
        match self.try_fetch(history, next_prayer, user_name).await {
            Ok(recs) => recs,
            Err(FetchError::MissingApiKey) => {
                warn!("Guidance skipped: no API key configured");
                Vec::new()
            }
            Err(e) => {
                error!("Guidance request failed: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn try_fetch(
        &self,
        history: &History,
        next_prayer: PrayerType,
        user_name: &str,
    ) -> Result<Vec<Recommendation>, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;
        let prompt = build_prompt(history, next_prayer, user_name);
        let body = request_body(&prompt);

        // Key goes in a header so it never shows up in logged URLs
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        info!("Requesting guidance from {} (next prayer {})", self.model, next_prayer);
        debug!("Guidance prompt:\n{}", prompt);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), &text));
        }

        let recs = parse_reply(&text)?;
        info!("Received {} recommendations", recs.len());
        Ok(recs)
    }
}

fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

/// Declared output shape: an array of tagged recommendation objects.
pub fn response_schema() -> Value {
    let kinds: Vec<&str> = RecommendationKind::ALL.iter().map(|k| k.as_str()).collect();
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "type": { "type": "STRING", "enum": kinds },
                "title": { "type": "STRING" },
                "content": { "type": "STRING" },
                "arabic": { "type": "STRING" },
                "translation": { "type": "STRING" },
                "source": { "type": "STRING" },
                "reasoning": {
                    "type": "STRING",
                    "description": "Why this suits the person given their recent prayer history"
                }
            },
            "required": ["type", "title", "content", "reasoning"]
        }
    })
}

/// Extract the structured list from a generateContent reply.
pub fn parse_reply(body: &str) -> Result<Vec<Recommendation>, FetchError> {
    let reply: GenerateReply = serde_json::from_str(body)?;
    let text: String = reply
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let payload = strip_code_fence(text.trim());
    if payload.is_empty() {
        return Err(FetchError::Parse("reply contained no text".to_string()));
    }
    Ok(serde_json::from_str(payload)?)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_port_url, serve_once};
    use chrono::NaiveDate;

    const RECS: &str = r#"[
        {"type":"dua","title":"Dua for steadfastness","content":"Ask for a firm heart.","arabic":"يَا مُقَلِّبَ الْقُلُوبِ ثَبِّتْ قَلْبِي عَلَى دِينِكَ","translation":"O Turner of hearts, make my heart firm upon Your religion.","source":"Tirmidhi 2140","reasoning":"Fajr was missed yesterday."},
        {"type":"verse","title":"Seek help through patience","content":"Patience and prayer.","arabic":"وَاسْتَعِينُوا بِالصَّبْرِ وَالصَّلَاةِ","translation":"And seek help through patience and prayer.","source":"Qur'an 2:45","reasoning":"Encouragement to return."},
        {"type":"habit","title":"Set an alarm before Fajr","content":"Put your phone across the room.","reasoning":"Helps with the early prayer."}
    ]"#;

    fn reply_with(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    fn client(base_url: String, api_key: Option<&str>) -> GuidanceClient {
        GuidanceClient::new(&GuidanceConfig {
            base_url,
            model: "test-model".to_string(),
            api_key: api_key.map(str::to_string),
            api_key_env: "MIQAT_TEST_UNSET_VARIABLE".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn sample_history() -> History {
        let mut history = History::new();
        history.toggle(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), PrayerType::Dhuhr);
        history
    }

    #[test]
    fn parses_structured_reply() {
        let recs = parse_reply(&reply_with(RECS)).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].kind, RecommendationKind::Dua);
        assert_eq!(recs[1].source.as_deref(), Some("Qur'an 2:45"));
        assert!(recs[2].arabic.is_none());
    }

    #[test]
    fn fenced_reply_is_accepted() {
        let fenced = format!("```json\n{}\n```", RECS);
        assert_eq!(parse_reply(&reply_with(&fenced)).unwrap().len(), 3);
    }

    #[test]
    fn record_missing_required_field_fails_whole_reply() {
        let bad = r#"[{"type":"habit","title":"No reasoning","content":"x"}]"#;
        assert!(matches!(parse_reply(&reply_with(bad)), Err(FetchError::Parse(_))));
    }

    #[test]
    fn empty_candidates_fail() {
        assert!(parse_reply(r#"{"candidates": []}"#).is_err());
    }

    #[test]
    fn schema_lists_every_kind_and_required_fields() {
        let schema = response_schema();
        assert_eq!(
            schema["items"]["properties"]["type"]["enum"],
            json!(["dua", "verse", "habit", "quote"])
        );
        assert_eq!(
            schema["items"]["required"],
            json!(["type", "title", "content", "reasoning"])
        );
    }

    #[tokio::test]
    async fn fetch_posts_prompt_and_schema() {
        let (base, request) = serve_once(200, &reply_with(RECS)).await;
        let recs = client(base, Some("secret"))
            .fetch(&sample_history(), PrayerType::Asr, "Maryam")
            .await;
        assert_eq!(recs.len(), 3);

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /models/test-model:generateContent"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: secret"));
        assert!(request.contains("responseSchema"));
        assert!(request.contains("Maryam"));
        assert!(request.contains("2026-10-18: Dhuhr"));
    }

    #[tokio::test]
    async fn transport_failure_yields_empty_list() {
        let base = closed_port_url().await;
        let recs = client(base, Some("secret"))
            .fetch(&sample_history(), PrayerType::Fajr, "Guest")
            .await;
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn server_error_yields_empty_list() {
        let (base, _request) = serve_once(500, r#"{"error":{"message":"overloaded"}}"#).await;
        let recs = client(base, Some("secret"))
            .fetch(&sample_history(), PrayerType::Fajr, "Guest")
            .await;
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn malformed_reply_yields_empty_list() {
        let (base, _request) = serve_once(200, &reply_with("not json at all")).await;
        let recs = client(base, Some("secret"))
            .fetch(&sample_history(), PrayerType::Fajr, "Guest")
            .await;
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn missing_key_never_touches_the_network() {
        let c = client("http://127.0.0.1:1".to_string(), None);
        assert!(!c.is_configured());
        assert!(matches!(
            c.try_fetch(&History::new(), PrayerType::Fajr, "Guest").await,
            Err(FetchError::MissingApiKey)
        ));
        assert!(c.fetch(&History::new(), PrayerType::Fajr, "Guest").await.is_empty());
    }
}
