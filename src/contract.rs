//! Extraction contract shared with the LLM.
//!
//! Field names, fixed cardinalities, the icon vocabulary and the theme cycle
//! are defined here once and used both to build the prompt and to
//! post-process what comes back, so the two can never disagree.

use crate::schema::{content_idea_id, ReportMetadata};
use crate::theme::ReportTheme;
use serde_json::Value;

pub const IDENTITY_COUNT: usize = 3;
pub const KEY_CONCEPT_COUNT: usize = 3;
pub const CORE_MATCH_POINT_COUNT: usize = 3;
pub const PILLAR_COUNT: usize = 3;
pub const KEYWORD_COUNT: usize = 3;
pub const KEY_POINT_COUNT: usize = 2;
pub const TAG_COUNT: usize = 3;
pub const FLOW_STEP_COUNT: usize = 3;
pub const EXTERNAL_LINK_COUNT: usize = 3;

/// Creator DNA axes, in display order. Only the values are extracted.
pub const DNA_LABELS: [&str; 5] = [
    "Persuasion",
    "Problem Solving",
    "Fandom Trust",
    "Informativeness",
    "Aesthetics",
];

/// Icon names the renderer knows how to draw.
pub const ICON_NAMES: &[&str] = &[
    "CheckCircle2",
    "Target",
    "Zap",
    "Search",
    "Lightbulb",
    "BarChart3",
    "User",
    "Instagram",
    "Youtube",
    "ArrowRight",
    "TrendingUp",
    "Brain",
    "Layers",
    "Quote",
    "Sparkles",
    "Link",
    "MessageCircle",
    "Puzzle",
    "Microscope",
    "ArrowRightLeft",
    "ChevronRight",
    "Maximize2",
    "Fingerprint",
    "HeartHandshake",
    "Scale",
    "Film",
    "BookOpen",
    "Calendar",
    "RefreshCw",
    "MousePointerClick",
    "ArrowDown",
    "PlayCircle",
    "Clapperboard",
    "ShoppingBag",
    "FileSpreadsheet",
    "LayoutDashboard",
];

/// Top-level keys the LLM must emit. `externalLinks` and `reportTheme` are
/// added by the server and are not part of this list.
pub const EXTRACTED_SECTIONS: [&str; 6] = [
    "celebData",
    "matchScore",
    "productDefinition",
    "matchPoints",
    "contentIdeas",
    "strategicPillars",
];

/// Keys the server owns; anything the LLM sends under these is discarded.
pub const SERVER_OWNED_KEYS: [&str; 2] = ["externalLinks", "reportTheme"];

/// System instruction for the extraction call.
pub fn system_prompt() -> String {
    let icons = ICON_NAMES
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let dna = DNA_LABELS
        .iter()
        .map(|label| format!("\"{label}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a data extractor. You read an influencer/product matching report and convert it into the data structure a dashboard already knows how to render.

HARD RULES:
- Output a single JSON object and nothing else.
- Do not write UI code, JSX, HTML, TypeScript, explanations or summaries.
- Do not output "externalLinks" or "reportTheme"; the server adds them.
- The object has exactly these keys: {sections}.

ICONS:
Icons are plain string names. Allowed names: {icons}

THEME CYCLE:
Themed lists take their "theme" from the report's 3-color cycle by position
(1st, 2nd, 3rd, then repeat). The cycle is given in the user message.
Applies to strategicPillars, productDefinition.keyConcepts and contentIdeas.

KEYWORD EMPHASIS:
Wrap salient terms (core concepts, product values, pain points, brand messages)
in single quotes, e.g. 'clean label'. Use 1-3 per sentence in: logic,
description, rationale, synergy, tagline, quote.

SCHEMA:

1. celebData:
{{
  name: string,            // handle without the leading @
  handle: string,
  platform: "instagram" | "youtube",
  profileUrl: string,
  category: "general" | "beauty" | "food",
  tagline: string,         // one-line channel summary, 40-80 chars
  identity: string[],      // exactly {identity} core traits
  dna: {{ label: string, value: number }}[]
                           // exactly {dna_count} entries, labels fixed and in order: {dna}
                           // value 0-100 scored from the report
}}

2. matchScore:
{{ score: number, summary: string }}

3. productDefinition:
{{
  headline: string,        // 30-60 chars
  highlight: string,       // emphasised word
  description: string,     // 150-300 chars
  quote: string,           // 120-200 chars
  keyConcepts: {{ icon: string, title: string, description: string, theme: string }}[]
                           // exactly {concepts}; description 80-150 chars
}}

4. matchPoints:
{{ id: number, feature: string, connection: string, title: string, logic: string, isCore: boolean }}[]
// title 20-40 chars, logic 80-150 chars.
// id counts from 1. Exactly {core} entries with isCore=true (the report's core
// selling points), then any number with isCore=false (sub points / extra strengths).
// Extract every selling point in the report.

5. strategicPillars: exactly {pillars} entries
{{
  id: number,              // 0, 1, 2
  tabTitle: string,
  icon: string,
  title: string,           // 20-40 chars
  subtitle: string,        // 25-50 chars
  context: {{ label: string, headline: string, subHeadline: string, description: string, keywords: string[] }},
                           // exactly {keywords} keywords; description 150-300 chars
  bridge: string,          // connecting question
  solution: {{ label: string, headline: string, description: string, keyPoints: string[] }},
                           // exactly {key_points} key points of 30-60 chars each;
                           // description 150-300 chars
  theme: string
}}

6. contentIdeas: one entry per content idea in the report
{{
  id: string,              // "01", "02", "03", ...
  title: string,           // 20-40 chars
  subTitle: string,        // 25-50 chars
  tags: string[],          // exactly {tags}
  concept: string,
  flow: string[],          // exactly {flow} steps of 120-200 chars each
  rationale: string,       // 150-300 chars
  synergy: string,         // 150-300 chars
  theme: string
}}

CHECKLIST:
- Every celebData field filled.
- Exactly {core} core match points.
- strategicPillars has {pillars} entries, themes follow the cycle.
- contentIdeas themes follow the cycle.
- Icons are names from the allowed list.
- Output is one JSON object."#,
        sections = EXTRACTED_SECTIONS.join(", "),
        icons = icons,
        identity = IDENTITY_COUNT,
        dna_count = DNA_LABELS.len(),
        dna = dna,
        concepts = KEY_CONCEPT_COUNT,
        core = CORE_MATCH_POINT_COUNT,
        pillars = PILLAR_COUNT,
        keywords = KEYWORD_COUNT,
        key_points = KEY_POINT_COUNT,
        tags = TAG_COUNT,
        flow = FLOW_STEP_COUNT,
    )
}

/// Per-request user message: profile meta, the theme cycle, then the report.
pub fn user_prompt(report_text: &str, metadata: &ReportMetadata) -> String {
    let [t1, t2, t3] = metadata.theme.cycle().map(|t| t.as_str());

    format!(
        r#"[Profile Meta]
Platform: {platform}
Category: {category}
Handle: {handle}
Profile URL: {profile_url}

[Theme cycle - mandatory]
Report theme {theme}: {t1} -> {t2} -> {t3}
- strategicPillars: 1st -> "{t1}", 2nd -> "{t2}", 3rd -> "{t3}"
- contentIdeas: 1 -> "{t1}", 2 -> "{t2}", 3 -> "{t3}", 4 -> "{t1}", ...
- keyConcepts: 1 -> "{t1}", 2 -> "{t2}", 3 -> "{t3}"

[Matching Report]
{report_text}

Extract the data from the report above and output it as one JSON object."#,
        platform = metadata.platform.as_str(),
        category = metadata.category.as_str(),
        handle = metadata.handle,
        profile_url = metadata.profile_url,
        theme = metadata.theme.as_str(),
    )
}

/// Rewrite the positional fields of an extracted object in place.
///
/// Themes follow the report's cycle, match point ids count from 1, pillar ids
/// from 0 and content idea ids are zero-padded from "01". Entries that are not
/// objects are left alone; the merge step deals with them.
pub fn enforce_positions(extracted: &mut Value, theme: ReportTheme) {
    if let Some(pillars) = extracted
        .get_mut("strategicPillars")
        .and_then(Value::as_array_mut)
    {
        for (i, pillar) in pillars.iter_mut().enumerate() {
            if let Some(obj) = pillar.as_object_mut() {
                obj.insert("id".to_string(), Value::from(i));
                obj.insert("theme".to_string(), theme.item_theme_at(i).as_str().into());
            }
        }
    }

    if let Some(concepts) = extracted
        .get_mut("productDefinition")
        .and_then(|p| p.get_mut("keyConcepts"))
        .and_then(Value::as_array_mut)
    {
        for (i, concept) in concepts.iter_mut().enumerate() {
            if let Some(obj) = concept.as_object_mut() {
                obj.insert("theme".to_string(), theme.item_theme_at(i).as_str().into());
            }
        }
    }

    if let Some(ideas) = extracted
        .get_mut("contentIdeas")
        .and_then(Value::as_array_mut)
    {
        for (i, idea) in ideas.iter_mut().enumerate() {
            if let Some(obj) = idea.as_object_mut() {
                obj.insert("id".to_string(), content_idea_id(i).into());
                obj.insert("theme".to_string(), theme.item_theme_at(i).as_str().into());
            }
        }
    }

    if let Some(points) = extracted
        .get_mut("matchPoints")
        .and_then(Value::as_array_mut)
    {
        for (i, point) in points.iter_mut().enumerate() {
            if let Some(obj) = point.as_object_mut() {
                obj.insert("id".to_string(), Value::from(i + 1));
            }
        }
    }
}

/// A run of text, emphasised when it was wrapped in single quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub emphasis: bool,
}

/// Split text on the `'keyword'` emphasis convention.
///
/// Quotes are matched left to right and non-greedily; an unmatched trailing
/// quote stays plain text.
pub fn emphasis_segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('\'') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('\'') else {
            break;
        };
        if open > 0 {
            out.push(Segment { text: &rest[..open], emphasis: false });
        }
        out.push(Segment { text: &after[..close], emphasis: true });
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        out.push(Segment { text: rest, emphasis: false });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Category, Platform};
    use serde_json::json;

    fn metadata(theme: ReportTheme) -> ReportMetadata {
        ReportMetadata {
            handle: "@chef_kim".to_string(),
            platform: Platform::Youtube,
            profile_url: "https://youtube.com/@chef_kim".to_string(),
            category: Category::Food,
            theme,
            product_store_url: "https://store.example.com".to_string(),
            campaign_plan_url: "https://plan.example.com".to_string(),
            channel_report_url: "https://report.example.com".to_string(),
        }
    }

    #[test]
    fn test_user_prompt_carries_theme_cycle() {
        let prompt = user_prompt("REPORT BODY", &metadata(ReportTheme::Food));
        assert!(prompt.contains("green -> blue -> pink"));
        assert!(prompt.contains("4 -> \"green\""));
        assert!(prompt.contains("Handle: @chef_kim"));
        assert!(prompt.ends_with("output it as one JSON object."));
        assert!(prompt.contains("REPORT BODY"));

        let beauty = user_prompt("x", &metadata(ReportTheme::Beauty));
        assert!(beauty.contains("purple -> blue -> pink"));
    }

    #[test]
    fn test_system_prompt_lists_contract() {
        let prompt = system_prompt();
        for label in DNA_LABELS {
            assert!(prompt.contains(label));
        }
        assert!(prompt.contains("\"LayoutDashboard\""));
        assert!(prompt.contains("Exactly 3 core match points."));
        assert!(prompt.contains("exactly 2 key points"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_system_prompt_carries_length_guidance() {
        let prompt = system_prompt();
        for guidance in [
            "title: string,           // 20-40 chars",
            "subtitle: string,        // 25-50 chars",
            "logic 80-150 chars",
            "description 80-150 chars",
            "description 150-300 chars",
            "key points of 30-60 chars each",
            "steps of 120-200 chars each",
        ] {
            assert!(prompt.contains(guidance), "missing {guidance:?}");
        }
    }

    #[test]
    fn test_enforce_positions_applies_cycle() {
        let mut value = json!({
            "strategicPillars": [{"theme": "teal"}, {}, {"id": 9}],
            "productDefinition": {"keyConcepts": [{}, {}, {}]},
            "contentIdeas": [{"id": "a"}, {}, {}, {"theme": "purple"}],
            "matchPoints": [{"id": 7}, "junk", {}]
        });
        enforce_positions(&mut value, ReportTheme::Food);

        assert_eq!(value["strategicPillars"][0]["theme"], json!("green"));
        assert_eq!(value["strategicPillars"][1]["theme"], json!("blue"));
        assert_eq!(value["strategicPillars"][2]["theme"], json!("pink"));
        assert_eq!(value["strategicPillars"][2]["id"], json!(2));
        assert_eq!(value["productDefinition"]["keyConcepts"][1]["theme"], json!("blue"));
        assert_eq!(value["contentIdeas"][0]["id"], json!("01"));
        assert_eq!(value["contentIdeas"][3]["theme"], value["contentIdeas"][0]["theme"]);
        assert_eq!(value["matchPoints"][0]["id"], json!(1));
        assert_eq!(value["matchPoints"][1], json!("junk"));
        assert_eq!(value["matchPoints"][2]["id"], json!(3));
    }

    #[test]
    fn test_enforce_positions_ignores_missing_sections() {
        let mut value = json!({"celebData": {"name": "x"}});
        enforce_positions(&mut value, ReportTheme::Beauty);
        assert_eq!(value, json!({"celebData": {"name": "x"}}));
    }

    #[test]
    fn test_emphasis_segments() {
        let segments = emphasis_segments("a 'bold' move and 'more'");
        assert_eq!(
            segments,
            vec![
                Segment { text: "a ", emphasis: false },
                Segment { text: "bold", emphasis: true },
                Segment { text: " move and ", emphasis: false },
                Segment { text: "more", emphasis: true },
            ]
        );
        assert_eq!(
            emphasis_segments("it's open"),
            vec![Segment { text: "it's open", emphasis: false }]
        );
    }
}
