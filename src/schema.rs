//! Report data model.
//!
//! These types are the shape the dashboard renderer consumes. [`report_shape`]
//! describes the same structure as a [`Shape`] so untrusted extraction output
//! can be merged onto the defaults before it is deserialized here.

use crate::contract::{
    CORE_MATCH_POINT_COUNT, DNA_LABELS, EXTERNAL_LINK_COUNT, FLOW_STEP_COUNT, ICON_NAMES,
    IDENTITY_COUNT, KEY_CONCEPT_COUNT, KEY_POINT_COUNT, KEYWORD_COUNT, PILLAR_COUNT, TAG_COUNT,
};
use crate::shape::{field, Shape};
use crate::theme::{ItemTheme, ReportTheme, ITEM_THEME_TOKENS, REPORT_THEME_TOKENS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

pub const PLATFORM_TOKENS: &[&str] = &["instagram", "youtube"];
pub const CATEGORY_TOKENS: &[&str] = &["general", "beauty", "food"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Youtube,
}

impl Platform {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "instagram" => Some(Self::Instagram),
            "youtube" => Some(Self::Youtube),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
        }
    }
}

/// Creator category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "일반")]
    General,
    #[serde(alias = "뷰티")]
    Beauty,
    #[serde(alias = "푸드")]
    Food,
}

impl Category {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "general" | "일반" => Some(Self::General),
            "beauty" | "뷰티" => Some(Self::Beauty),
            "food" | "푸드" => Some(Self::Food),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Beauty => "beauty",
            Self::Food => "food",
        }
    }
}

// ============================================================================
// Request metadata
// ============================================================================

/// Metadata fields in wire order.
pub const METADATA_FIELDS: [&str; 8] = [
    "handle",
    "platform",
    "profileUrl",
    "category",
    "theme",
    "productStoreUrl",
    "campaignPlanUrl",
    "channelReportUrl",
];

/// Metadata as it arrives on the wire, before validation.
#[derive(Debug, Clone, Default)]
pub struct MetadataInput {
    pub handle: Option<String>,
    pub platform: Option<String>,
    pub profile_url: Option<String>,
    pub category: Option<String>,
    pub theme: Option<String>,
    pub product_store_url: Option<String>,
    pub campaign_plan_url: Option<String>,
    pub channel_report_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("metadata.{0} is required")]
    Missing(&'static str),
    #[error("metadata.{0} must be a string")]
    NotText(&'static str),
    #[error("metadata.platform must be \"instagram\" or \"youtube\"")]
    Platform,
    #[error("metadata.category must be \"general\", \"beauty\", or \"food\"")]
    Category,
    #[error("metadata.theme must be \"beauty\" or \"food\"")]
    Theme,
}

/// Validated operator metadata for one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub handle: String,
    pub platform: Platform,
    pub profile_url: String,
    pub category: Category,
    pub theme: ReportTheme,
    pub product_store_url: String,
    pub campaign_plan_url: String,
    pub channel_report_url: String,
}

fn required(value: Option<String>, name: &'static str) -> Result<String, MetadataError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(MetadataError::Missing(name)),
    }
}

impl MetadataInput {
    /// Read metadata from a raw request object.
    ///
    /// Every field is checked for presence before any is checked for type, so
    /// a missing field is reported ahead of a mistyped one. Enum fields that
    /// are not strings are kept as their JSON text and fail the enum check.
    pub fn from_object(metadata: &Map<String, Value>) -> Result<Self, MetadataError> {
        for name in METADATA_FIELDS {
            let present = match metadata.get(name) {
                None | Some(Value::Null) | Some(Value::Bool(false)) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(MetadataError::Missing(name));
            }
        }

        let text = |name: &'static str| match metadata.get(name) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            _ => Err(MetadataError::NotText(name)),
        };
        let token = |name: &'static str| {
            metadata.get(name).map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        };

        Ok(Self {
            handle: text("handle")?,
            platform: token("platform"),
            profile_url: text("profileUrl")?,
            category: token("category"),
            theme: token("theme"),
            product_store_url: text("productStoreUrl")?,
            campaign_plan_url: text("campaignPlanUrl")?,
            channel_report_url: text("channelReportUrl")?,
        })
    }
}

impl TryFrom<MetadataInput> for ReportMetadata {
    type Error = MetadataError;

    fn try_from(input: MetadataInput) -> Result<Self, Self::Error> {
        // Presence first, in wire order, so the first missing field is reported.
        let handle = required(input.handle, "handle")?;
        let platform = required(input.platform, "platform")?;
        let profile_url = required(input.profile_url, "profileUrl")?;
        let category = required(input.category, "category")?;
        let theme = required(input.theme, "theme")?;
        let product_store_url = required(input.product_store_url, "productStoreUrl")?;
        let campaign_plan_url = required(input.campaign_plan_url, "campaignPlanUrl")?;
        let channel_report_url = required(input.channel_report_url, "channelReportUrl")?;

        Ok(Self {
            handle,
            platform: Platform::from_token(&platform).ok_or(MetadataError::Platform)?,
            profile_url,
            category: Category::from_token(&category).ok_or(MetadataError::Category)?,
            theme: ReportTheme::from_token(&theme).ok_or(MetadataError::Theme)?,
            product_store_url,
            campaign_plan_url,
            channel_report_url,
        })
    }
}

impl ReportMetadata {
    /// The three dashboard links, built from operator URLs. Never LLM-authored.
    pub fn external_links(&self) -> Vec<ExternalLink> {
        let colors = self.theme.link_colors();
        vec![
            ExternalLink {
                label: "Product Store".to_string(),
                url: self.product_store_url.clone(),
                icon: "ShoppingBag".to_string(),
                color: colors.primary.to_string(),
            },
            ExternalLink {
                label: "Campaign Plan".to_string(),
                url: self.campaign_plan_url.clone(),
                icon: "FileSpreadsheet".to_string(),
                color: colors.secondary.to_string(),
            },
            ExternalLink {
                label: "Channel Report".to_string(),
                url: self.channel_report_url.clone(),
                icon: "LayoutDashboard".to_string(),
                color: colors.tertiary.to_string(),
            },
        ]
    }
}

// ============================================================================
// Report data
// ============================================================================

/// Everything the dashboard renders. Built once per extraction, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub celeb_data: CelebProfile,
    pub match_score: MatchScore,
    pub product_definition: ProductDefinition,
    pub match_points: Vec<MatchPoint>,
    pub content_ideas: Vec<ContentIdea>,
    pub strategic_pillars: Vec<StrategicPillar>,
    pub external_links: Vec<ExternalLink>,
    pub report_theme: ReportTheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CelebProfile {
    pub name: String,
    pub handle: String,
    pub platform: Platform,
    pub profile_url: String,
    pub category: Category,
    pub tagline: String,
    pub identity: Vec<String>,
    pub dna: Vec<DnaEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnaEntry {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub score: f64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDefinition {
    pub headline: String,
    pub highlight: String,
    pub description: String,
    pub quote: String,
    pub key_concepts: Vec<KeyConcept>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyConcept {
    pub icon: String,
    pub title: String,
    pub description: String,
    pub theme: ItemTheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPoint {
    pub id: u32,
    pub feature: String,
    pub connection: String,
    pub title: String,
    pub logic: String,
    pub is_core: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicPillar {
    pub id: u32,
    pub tab_title: String,
    pub icon: String,
    pub title: String,
    pub subtitle: String,
    pub context: PillarContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge: Option<String>,
    pub solution: PillarSolution,
    pub theme: ItemTheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PillarContext {
    pub label: String,
    pub headline: String,
    pub sub_headline: String,
    pub description: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PillarSolution {
    pub label: String,
    pub headline: String,
    pub description: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIdea {
    pub id: String,
    pub title: String,
    pub sub_title: String,
    pub tags: Vec<String>,
    pub concept: String,
    pub flow: Vec<String>,
    pub rationale: String,
    pub synergy: String,
    pub theme: ItemTheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub label: String,
    pub url: String,
    pub icon: String,
    pub color: String,
}

// ============================================================================
// Shape
// ============================================================================

fn texts(len: usize) -> Shape {
    Shape::fixed_list(Shape::Text, len)
}

fn build_report_shape() -> Shape {
    let item_theme = || Shape::Enum(ITEM_THEME_TOKENS);

    let celeb = Shape::record(vec![
        field("name", Shape::Text),
        field("handle", Shape::Text),
        field("platform", Shape::Enum(PLATFORM_TOKENS)),
        field("profileUrl", Shape::Text),
        field("category", Shape::Enum(CATEGORY_TOKENS)),
        field("tagline", Shape::Text),
        field("identity", texts(IDENTITY_COUNT)),
        field(
            "dna",
            Shape::fixed_list(
                Shape::record(vec![field("label", Shape::Text), field("value", Shape::Number)]),
                DNA_LABELS.len(),
            ),
        ),
    ]);

    let match_score = Shape::record(vec![
        field("score", Shape::Number),
        field("summary", Shape::Text),
    ]);

    let product = Shape::record(vec![
        field("headline", Shape::Text),
        field("highlight", Shape::Text),
        field("description", Shape::Text),
        field("quote", Shape::Text),
        field(
            "keyConcepts",
            Shape::fixed_list(
                Shape::record(vec![
                    field("icon", Shape::Text),
                    field("title", Shape::Text),
                    field("description", Shape::Text),
                    field("theme", item_theme()),
                ]),
                KEY_CONCEPT_COUNT,
            ),
        ),
    ]);

    let match_point = Shape::record(vec![
        field("id", Shape::Integer),
        field("feature", Shape::Text),
        field("connection", Shape::Text),
        field("title", Shape::Text),
        field("logic", Shape::Text),
        field("isCore", Shape::Bool),
    ]);

    let content_idea = Shape::record(vec![
        field("id", Shape::Text),
        field("title", Shape::Text),
        field("subTitle", Shape::Text),
        field("tags", texts(TAG_COUNT)),
        field("concept", Shape::Text),
        field("flow", texts(FLOW_STEP_COUNT)),
        field("rationale", Shape::Text),
        field("synergy", Shape::Text),
        field("theme", item_theme()),
    ]);

    let pillar = Shape::record(vec![
        field("id", Shape::Integer),
        field("tabTitle", Shape::Text),
        field("icon", Shape::Text),
        field("title", Shape::Text),
        field("subtitle", Shape::Text),
        field(
            "context",
            Shape::record(vec![
                field("label", Shape::Text),
                field("headline", Shape::Text),
                field("subHeadline", Shape::Text),
                field("description", Shape::Text),
                field("keywords", texts(KEYWORD_COUNT)),
            ]),
        ),
        field("bridge", Shape::optional(Shape::Text)),
        field(
            "solution",
            Shape::record(vec![
                field("label", Shape::Text),
                field("headline", Shape::Text),
                field("description", Shape::Text),
                field("keyPoints", texts(KEY_POINT_COUNT)),
            ]),
        ),
        field("theme", item_theme()),
    ]);

    let link = Shape::record(vec![
        field("label", Shape::Text),
        field("url", Shape::Text),
        field("icon", Shape::Text),
        field("color", Shape::Text),
    ]);

    Shape::record(vec![
        field("celebData", celeb),
        field("matchScore", match_score),
        field("productDefinition", product),
        field("matchPoints", Shape::list(match_point)),
        field("contentIdeas", Shape::list(content_idea)),
        field("strategicPillars", Shape::fixed_list(pillar, PILLAR_COUNT)),
        field("externalLinks", Shape::fixed_list(link, EXTERNAL_LINK_COUNT)),
        field("reportTheme", Shape::Enum(REPORT_THEME_TOKENS)),
    ])
}

/// The structure of [`ReportData`], built once.
pub fn report_shape() -> &'static Shape {
    static SHAPE: OnceLock<Shape> = OnceLock::new();
    SHAPE.get_or_init(build_report_shape)
}

// ============================================================================
// Validation
// ============================================================================

/// List every place the report breaks the data contract.
///
/// Violations are informational: a report with violations still renders.
pub fn validate(report: &ReportData) -> Vec<String> {
    let mut out = Vec::new();
    let theme = report.report_theme;

    let celeb = &report.celeb_data;
    if celeb.identity.len() != IDENTITY_COUNT {
        out.push(format!(
            "celebData.identity: expected {IDENTITY_COUNT} entries, found {}",
            celeb.identity.len()
        ));
    }
    if celeb.dna.len() != DNA_LABELS.len() {
        out.push(format!(
            "celebData.dna: expected {} entries, found {}",
            DNA_LABELS.len(),
            celeb.dna.len()
        ));
    }
    for (i, entry) in celeb.dna.iter().enumerate() {
        if let Some(expected) = DNA_LABELS.get(i) {
            if entry.label != *expected {
                out.push(format!("celebData.dna[{i}].label: expected \"{expected}\", found \"{}\"", entry.label));
            }
        }
        if !(0.0..=100.0).contains(&entry.value) {
            out.push(format!("celebData.dna[{i}].value: {} outside 0-100", entry.value));
        }
    }

    let concepts = &report.product_definition.key_concepts;
    if concepts.len() != KEY_CONCEPT_COUNT {
        out.push(format!(
            "productDefinition.keyConcepts: expected {KEY_CONCEPT_COUNT} entries, found {}",
            concepts.len()
        ));
    }
    for (i, concept) in concepts.iter().enumerate() {
        let path = format!("productDefinition.keyConcepts[{i}]");
        check_icon(&concept.icon, &path, &mut out);
        check_theme(concept.theme, theme, i, &path, &mut out);
    }

    let core = report.match_points.iter().filter(|p| p.is_core).count();
    if core != CORE_MATCH_POINT_COUNT {
        out.push(format!("matchPoints: expected {CORE_MATCH_POINT_COUNT} core entries, found {core}"));
    }
    for (i, point) in report.match_points.iter().enumerate() {
        if point.id as usize != i + 1 {
            out.push(format!("matchPoints[{i}].id: expected {}, found {}", i + 1, point.id));
        }
    }

    if report.strategic_pillars.len() != PILLAR_COUNT {
        out.push(format!(
            "strategicPillars: expected {PILLAR_COUNT} entries, found {}",
            report.strategic_pillars.len()
        ));
    }
    for (i, pillar) in report.strategic_pillars.iter().enumerate() {
        let path = format!("strategicPillars[{i}]");
        if pillar.id as usize != i {
            out.push(format!("{path}.id: expected {i}, found {}", pillar.id));
        }
        if pillar.context.keywords.len() != KEYWORD_COUNT {
            out.push(format!(
                "{path}.context.keywords: expected {KEYWORD_COUNT} entries, found {}",
                pillar.context.keywords.len()
            ));
        }
        if pillar.solution.key_points.len() != KEY_POINT_COUNT {
            out.push(format!(
                "{path}.solution.keyPoints: expected {KEY_POINT_COUNT} entries, found {}",
                pillar.solution.key_points.len()
            ));
        }
        check_icon(&pillar.icon, &path, &mut out);
        check_theme(pillar.theme, theme, i, &path, &mut out);
    }

    for (i, idea) in report.content_ideas.iter().enumerate() {
        let path = format!("contentIdeas[{i}]");
        let expected_id = content_idea_id(i);
        if idea.id != expected_id {
            out.push(format!("{path}.id: expected \"{expected_id}\", found \"{}\"", idea.id));
        }
        if idea.tags.len() != TAG_COUNT {
            out.push(format!("{path}.tags: expected {TAG_COUNT} entries, found {}", idea.tags.len()));
        }
        if idea.flow.len() != FLOW_STEP_COUNT {
            out.push(format!("{path}.flow: expected {FLOW_STEP_COUNT} entries, found {}", idea.flow.len()));
        }
        check_theme(idea.theme, theme, i, &path, &mut out);
    }

    if report.external_links.len() != EXTERNAL_LINK_COUNT {
        out.push(format!(
            "externalLinks: expected {EXTERNAL_LINK_COUNT} entries, found {}",
            report.external_links.len()
        ));
    }

    out
}

/// Zero-padded id for the content idea at `index` ("01", "02", ...).
pub fn content_idea_id(index: usize) -> String {
    format!("{:02}", index + 1)
}

fn check_icon(icon: &str, path: &str, out: &mut Vec<String>) {
    if !ICON_NAMES.contains(&icon) {
        out.push(format!("{path}.icon: unknown icon \"{icon}\""));
    }
}

fn check_theme(actual: ItemTheme, theme: ReportTheme, index: usize, path: &str, out: &mut Vec<String>) {
    let expected = theme.item_theme_at(index);
    if actual != expected {
        out.push(format!(
            "{path}.theme: expected \"{}\", found \"{}\"",
            expected.as_str(),
            actual.as_str()
        ));
    }
}
