//! Report extraction pipeline: free-text report in, data module out.

use crate::contract::{
    emphasis_segments, enforce_positions, system_prompt, user_prompt, SERVER_OWNED_KEYS,
};
use crate::defaults::merge_onto_defaults;
use crate::literal::parse_literal;
use crate::openrouter::{CompletionProvider, Message};
use crate::payload::render_data_module;
use crate::retry::UpstreamError;
use crate::schema::{validate, MetadataInput, ReportData, ReportMetadata};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("LLM request failed: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("LLM response could not be used: {0}")]
    Unparseable(String),
}

/// A validated extraction request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    pub report_text: String,
    pub metadata: ReportMetadata,
}

impl ExtractRequest {
    /// Validate a raw request body (`{reportText, metadata}`).
    ///
    /// Checks run in a fixed order so the first problem is the one reported:
    /// report text, metadata object, presence of every metadata field, then
    /// field types and enum values.
    pub fn from_body(body: &Value) -> Result<Self, ExtractError> {
        let report_text = body
            .get("reportText")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ExtractError::Validation("reportText is required and must be a string".to_string())
            })?;

        let metadata = body
            .get("metadata")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ExtractError::Validation("metadata is required and must be an object".to_string())
            })?;

        let metadata = MetadataInput::from_object(metadata)
            .and_then(ReportMetadata::try_from)
            .map_err(|e| ExtractError::Validation(e.to_string()))?;

        Ok(Self {
            report_text: report_text.to_string(),
            metadata,
        })
    }
}

/// Result of one extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub request_id: Uuid,
    /// SHA-256 of the report text, hex encoded.
    pub content_hash: String,
    pub data: ReportData,
    pub data_ts: String,
    pub violations: Vec<String>,
}

/// Extraction pipeline orchestrator.
#[derive(Clone)]
pub struct ExtractionService {
    provider: Arc<dyn CompletionProvider>,
}

impl ExtractionService {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn extract(&self, request: &ExtractRequest) -> Result<Extraction, ExtractError> {
        let request_id = Uuid::new_v4();
        let metadata = &request.metadata;

        let content_hash = {
            let mut hasher = Sha256::new();
            hasher.update(request.report_text.as_bytes());
            format!("{:x}", hasher.finalize())
        };

        info!(
            "Starting extraction {} for {} ({} chars, theme={}, provider={}, hash={})",
            request_id,
            metadata.handle,
            request.report_text.len(),
            metadata.theme.as_str(),
            self.provider.name(),
            &content_hash[..12]
        );

        let messages = vec![
            Message::system(system_prompt()),
            Message::user(user_prompt(&request.report_text, metadata)),
        ];

        let response = self.provider.complete_json(messages).await?;
        debug!("Raw LLM response length: {} chars", response.len());

        let mut extracted = parse_llm_object(&response)?;

        if let Some(obj) = extracted.as_object_mut() {
            for key in SERVER_OWNED_KEYS {
                if obj.remove(key).is_some() {
                    warn!("Discarded LLM-supplied {}", key);
                }
            }
        }

        if let Some(obj) = extracted.as_object_mut() {
            let links = serde_json::to_value(metadata.external_links())
                .map_err(|e| ExtractError::Unparseable(e.to_string()))?;
            obj.insert("externalLinks".to_string(), links);
            obj.insert("reportTheme".to_string(), metadata.theme.as_str().into());
        }

        // Sections that fell back to defaults need the report's cycle too.
        let mut merged = merge_onto_defaults(&extracted);
        enforce_positions(&mut merged, metadata.theme);
        let data: ReportData = serde_json::from_value(merged.clone())
            .map_err(|e| ExtractError::Unparseable(e.to_string()))?;

        let violations = validate(&data);
        for violation in &violations {
            warn!("Extraction {}: {}", request_id, violation);
        }
        if emphasis_count(&data) == 0 {
            warn!("Extraction {}: no 'keyword' emphasis in prose fields", request_id);
        }

        let data_ts = render_data_module(&merged);

        info!(
            "Extraction {} complete: {} match points, {} content ideas, {} violations",
            request_id,
            data.match_points.len(),
            data.content_ideas.len(),
            violations.len()
        );

        Ok(Extraction {
            request_id,
            content_hash,
            data,
            data_ts,
            violations,
        })
    }
}

/// Number of `'keyword'` emphases in the prose fields the dashboard highlights.
fn emphasis_count(data: &ReportData) -> usize {
    let prose = std::iter::once(data.product_definition.description.as_str())
        .chain(data.match_points.iter().map(|p| p.logic.as_str()))
        .chain(
            data.content_ideas
                .iter()
                .flat_map(|c| [c.rationale.as_str(), c.synergy.as_str()]),
        );
    prose
        .map(|text| emphasis_segments(text).iter().filter(|s| s.emphasis).count())
        .sum()
}

/// Recover a JSON object from an LLM completion.
///
/// Markdown code fences are stripped, then the body is parsed with the
/// object-literal parser, which accepts strict JSON as well as the looser
/// syntax models sometimes produce.
fn parse_llm_object(response: &str) -> Result<Value, ExtractError> {
    let body = strip_code_fences(response);
    let value = parse_literal(body).map_err(|e| {
        ExtractError::Unparseable(format!(
            "{e}: {}",
            body.chars().take(200).collect::<String>()
        ))
    })?;
    if !value.is_object() {
        return Err(ExtractError::Unparseable(
            "expected a JSON object at the top level".to_string(),
        ));
    }
    Ok(value)
}

fn strip_code_fences(response: &str) -> &str {
    if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(response)
            .trim()
    } else if response.contains("```") {
        response.split("```").nth(1).unwrap_or(response).trim()
    } else {
        response.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::defaults;
    use crate::payload::parse_report;
    use crate::theme::{ItemTheme, ReportTheme};
    use serde_json::json;
    use std::sync::Mutex;

    /// Provider that returns a canned completion and records what it was sent.
    struct FakeProvider {
        response: Result<String, UpstreamError>,
        seen: Mutex<Vec<Message>>,
    }

    impl FakeProvider {
        fn replying(response: Result<String, UpstreamError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl CompletionProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete_json(&self, messages: Vec<Message>) -> Result<String, UpstreamError> {
            self.seen.lock().unwrap().extend(messages);
            self.response.clone()
        }
    }

    fn body(theme: &str) -> Value {
        json!({
            "reportText": "Chef Kim runs a cooking channel focused on honest reviews.",
            "metadata": {
                "handle": "@chef_kim",
                "platform": "youtube",
                "profileUrl": "https://youtube.com/@chef_kim",
                "category": "food",
                "theme": theme,
                "productStoreUrl": "https://store.example.com",
                "campaignPlanUrl": "https://plan.example.com",
                "channelReportUrl": "https://report.example.com"
            }
        })
    }

    fn request(theme: &str) -> ExtractRequest {
        ExtractRequest::from_body(&body(theme)).unwrap()
    }

    fn llm_output() -> String {
        json!({
            "celebData": {"name": "Chef Kim", "handle": "@chef_kim"},
            "matchScore": {"score": 91, "summary": "Strong fit"},
            "strategicPillars": [
                {"id": 7, "title": "A", "theme": "teal"},
                {"id": 8, "title": "B"},
                {"id": 9, "title": "C", "theme": "purple"}
            ],
            "contentIdeas": [
                {"id": "x", "title": "One"},
                {"id": "y", "title": "Two"},
                {"id": "z", "title": "Three"},
                {"id": "w", "title": "Four"}
            ],
            "externalLinks": [{"label": "evil", "url": "https://evil.example.com", "icon": "Link", "color": ""}],
            "reportTheme": "beauty"
        })
        .to_string()
    }

    #[test]
    fn test_request_validation_order() {
        let err = ExtractRequest::from_body(&json!({"metadata": {}})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: reportText is required and must be a string");

        let err = ExtractRequest::from_body(&json!({"reportText": 5})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: reportText is required and must be a string");

        let err = ExtractRequest::from_body(&json!({"reportText": "r", "metadata": "m"})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: metadata is required and must be an object");

        let mut b = body("food");
        b["metadata"].as_object_mut().unwrap().remove("campaignPlanUrl");
        let err = ExtractRequest::from_body(&b).unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: metadata.campaignPlanUrl is required");

        let mut b = body("food");
        b["metadata"]["platform"] = json!("tiktok");
        let err = ExtractRequest::from_body(&b).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid request: metadata.platform must be \"instagram\" or \"youtube\""
        );

        let mut b = body("food");
        b["metadata"]["handle"] = json!(42);
        let err = ExtractRequest::from_body(&b).unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: metadata.handle must be a string");

        // A missing field wins over a mistyped one earlier in the object.
        let err = ExtractRequest::from_body(&json!({
            "reportText": "r",
            "metadata": {"platform": 5}
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: metadata.handle is required");
    }

    #[test]
    fn test_korean_theme_alias_is_accepted() {
        assert_eq!(request("뷰티").metadata.theme, ReportTheme::Beauty);
    }

    #[tokio::test]
    async fn test_pipeline_builds_complete_report() {
        let provider = FakeProvider::replying(Ok(llm_output()));
        let service = ExtractionService::new(provider.clone());
        let extraction = service.extract(&request("food")).await.unwrap();
        let data = &extraction.data;

        assert_eq!(data.celeb_data.name, "Chef Kim");
        assert_eq!(data.match_score.score, 91.0);
        assert_eq!(data.report_theme, ReportTheme::Food);
        assert_eq!(data.product_definition, defaults().product_definition);

        // Links come from metadata, never from the model.
        assert_eq!(data.external_links.len(), 3);
        assert_eq!(data.external_links[0].url, "https://store.example.com");
        assert!(data.external_links.iter().all(|l| !l.url.contains("evil")));

        let pillar_themes: Vec<_> = data.strategic_pillars.iter().map(|p| p.theme).collect();
        assert_eq!(pillar_themes, [ItemTheme::Green, ItemTheme::Blue, ItemTheme::Pink]);
        let pillar_ids: Vec<_> = data.strategic_pillars.iter().map(|p| p.id).collect();
        assert_eq!(pillar_ids, [0, 1, 2]);

        let idea_ids: Vec<_> = data.content_ideas.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(idea_ids, ["01", "02", "03", "04"]);
        assert_eq!(data.content_ideas[3].theme, data.content_ideas[0].theme);

        assert_eq!(extraction.content_hash.len(), 64);
        assert!(extraction.data_ts.starts_with("import type {"));

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].content.contains("honest reviews"));
        assert!(seen[1].content.contains("green -> blue -> pink"));
    }

    #[tokio::test]
    async fn test_data_module_round_trips() {
        let service = ExtractionService::new(FakeProvider::replying(Ok(llm_output())));
        let extraction = service.extract(&request("beauty")).await.unwrap();
        let reparsed = parse_report(&extraction.data_ts).unwrap();
        assert_eq!(reparsed, extraction.data);
        assert_eq!(reparsed.report_theme, ReportTheme::Beauty);
        assert_eq!(reparsed.strategic_pillars[0].theme, ItemTheme::Purple);
    }

    #[tokio::test]
    async fn test_fenced_response_is_accepted() {
        let fenced = format!("Here you go:\n```json\n{}\n```", llm_output());
        let service = ExtractionService::new(FakeProvider::replying(Ok(fenced)));
        let extraction = service.extract(&request("food")).await.unwrap();
        assert_eq!(extraction.data.celeb_data.name, "Chef Kim");
    }

    #[tokio::test]
    async fn test_empty_object_yields_defaults_with_links() {
        let service = ExtractionService::new(FakeProvider::replying(Ok("{}".to_string())));
        let extraction = service.extract(&request("food")).await.unwrap();
        assert_eq!(extraction.data.strategic_pillars, defaults().strategic_pillars);
        assert_eq!(extraction.data.external_links[2].url, "https://report.example.com");
        assert!(extraction.violations.is_empty());
    }

    #[tokio::test]
    async fn test_defaulted_sections_follow_beauty_cycle() {
        let service = ExtractionService::new(FakeProvider::replying(Ok("{}".to_string())));
        let extraction = service.extract(&request("beauty")).await.unwrap();
        let data = &extraction.data;

        let cycle = [ItemTheme::Purple, ItemTheme::Blue, ItemTheme::Pink];
        let pillar_themes: Vec<_> = data.strategic_pillars.iter().map(|p| p.theme).collect();
        assert_eq!(pillar_themes, cycle);
        let concept_themes: Vec<_> = data
            .product_definition
            .key_concepts
            .iter()
            .map(|c| c.theme)
            .collect();
        assert_eq!(concept_themes, cycle);
        for (i, idea) in data.content_ideas.iter().enumerate() {
            assert_eq!(idea.theme, cycle[i % 3]);
        }
        assert!(extraction.violations.is_empty(), "{:?}", extraction.violations);
    }

    #[tokio::test]
    async fn test_null_match_point_does_not_discard_the_rest() {
        let point = |feature: &str, core: bool| {
            json!({
                "feature": feature,
                "connection": "c",
                "title": "t",
                "logic": "l",
                "isCore": core
            })
        };
        let response = json!({
            "matchPoints": [
                point("Clean label", true),
                point("Fast prep", true),
                point("Local farms", true),
                null
            ]
        })
        .to_string();

        let service = ExtractionService::new(FakeProvider::replying(Ok(response)));
        let data = service.extract(&request("food")).await.unwrap().data;

        let features: Vec<_> = data.match_points.iter().map(|p| p.feature.as_str()).collect();
        assert_eq!(features, ["Clean label", "Fast prep", "Local farms"]);
        let ids: Vec<_> = data.match_points.iter().map(|p| p.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unusable_responses() {
        for response in ["[1, 2, 3]", "not json at all", "{\"a\": "] {
            let service = ExtractionService::new(FakeProvider::replying(Ok(response.to_string())));
            let err = service.extract(&request("food")).await.unwrap_err();
            assert!(matches!(err, ExtractError::Unparseable(_)), "{response}: {err}");
        }
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let service = ExtractionService::new(FakeProvider::replying(Err(UpstreamError::Timeout(
            std::time::Duration::from_secs(180),
        ))));
        let err = service.extract(&request("food")).await.unwrap_err();
        assert!(matches!(err, ExtractError::Upstream(UpstreamError::Timeout(_))));
    }

    #[test]
    fn test_emphasis_count() {
        assert!(emphasis_count(defaults()) > 0);

        let mut data = defaults().clone();
        data.product_definition.description = "plain".to_string();
        for point in &mut data.match_points {
            point.logic = "plain".to_string();
        }
        for idea in &mut data.content_ideas {
            idea.rationale = "plain".to_string();
            idea.synergy = "one 'keyword' here".to_string();
        }
        assert_eq!(emphasis_count(&data), data.content_ideas.len());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }
}
