//! Defaults registry: the fully populated fallback report.
//!
//! Every field the renderer reads has a placeholder here, and the value itself
//! satisfies every cardinality rule of the data contract. It is built once and
//! only ever read.

use crate::schema::{
    report_shape, CelebProfile, Category, ContentIdea, DnaEntry, ExternalLink, KeyConcept,
    MatchPoint, MatchScore, PillarContext, PillarSolution, Platform, ProductDefinition,
    ReportData, StrategicPillar,
};
use crate::shape::merge;
use crate::theme::{ItemTheme, ReportTheme};
use serde_json::Value;
use std::sync::OnceLock;

/// The defaults as typed data.
pub fn defaults() -> &'static ReportData {
    static DEFAULTS: OnceLock<ReportData> = OnceLock::new();
    DEFAULTS.get_or_init(build_defaults)
}

/// The defaults as JSON, the form the merge operates on.
pub fn defaults_value() -> &'static Value {
    static VALUE: OnceLock<Value> = OnceLock::new();
    VALUE.get_or_init(|| serde_json::to_value(defaults()).unwrap_or(Value::Null))
}

/// Merge an untrusted extracted object onto the defaults.
pub fn merge_onto_defaults(source: &Value) -> Value {
    merge(report_shape(), defaults_value(), source)
}

fn s(text: &str) -> String {
    text.to_string()
}

fn strings<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|t| t.to_string()).collect()
}

fn build_defaults() -> ReportData {
    ReportData {
        celeb_data: CelebProfile {
            name: s("Creator Name"),
            handle: s("@creator_handle"),
            platform: Platform::Youtube,
            profile_url: s("https://youtube.com/@creator_handle"),
            category: Category::Food,
            tagline: s("A channel that turns everyday cooking into 'honest, repeatable' routines viewers actually try."),
            identity: strings(["Core trait 1", "Core trait 2", "Core trait 3"]),
            dna: vec![
                DnaEntry { label: s("Persuasion"), value: 85.0 },
                DnaEntry { label: s("Problem Solving"), value: 72.0 },
                DnaEntry { label: s("Fandom Trust"), value: 90.0 },
                DnaEntry { label: s("Informativeness"), value: 78.0 },
                DnaEntry { label: s("Aesthetics"), value: 65.0 },
            ],
        },
        match_score: MatchScore {
            score: 92.0,
            summary: s("High alignment between the brand philosophy and the creator persona"),
        },
        product_definition: ProductDefinition {
            headline: s("This product is not just food, it is"),
            highlight: s("a redefined lifestyle"),
            description: s(
                "The essence of the product goes beyond function: it adds value to the consumer's day. \
                 Through the message of 'a healthy choice' the brand philosophy reaches people naturally.",
            ),
            quote: s(
                "Real value is not in the product itself but in the 'experience and connection' it creates.",
            ),
            key_concepts: vec![
                KeyConcept {
                    icon: s("Scale"),
                    title: s("Balanced approach"),
                    description: s("A product philosophy that satisfies 'health and taste' at the same time."),
                    theme: ItemTheme::Green,
                },
                KeyConcept {
                    icon: s("Puzzle"),
                    title: s("Lifestyle fit"),
                    description: s("A usage experience designed to blend into 'every moment' of the day."),
                    theme: ItemTheme::Blue,
                },
                KeyConcept {
                    icon: s("HeartHandshake"),
                    title: s("Trust first"),
                    description: s("Trust built through 'transparent sourcing' and steady quality work."),
                    theme: ItemTheme::Pink,
                },
            ],
        },
        match_points: vec![
            MatchPoint {
                id: 1,
                feature: s("Premium ingredients"),
                connection: s("Quality-focused content"),
                title: s("A shared belief in 'good ingredients'"),
                logic: s("The creator always stresses 'ingredient quality', which connects naturally with the product's premium message."),
                is_core: true,
            },
            MatchPoint {
                id: 2,
                feature: s("Easy to use"),
                connection: s("Practical philosophy"),
                title: s("The 'healthy choice in a busy day' narrative"),
                logic: s("The channel favours 'efficient, practical' living, a close fit for the product's convenience."),
                is_core: true,
            },
            MatchPoint {
                id: 3,
                feature: s("Brand story"),
                connection: s("Story-driven content"),
                title: s("A taste for 'products with a story'"),
                logic: s("Episodes are built as 'storytelling' rather than reviews, and the founding story gives them material."),
                is_core: true,
            },
            MatchPoint {
                id: 4,
                feature: s("Value for money"),
                connection: s("Sensible spending"),
                title: s("Beyond cheap: 'worth it'"),
                logic: s("Viewers care about sensible spending without giving up quality expectations."),
                is_core: false,
            },
        ],
        content_ideas: vec![
            ContentIdea {
                id: s("01"),
                title: s("One-week challenge: a healthy start every morning"),
                sub_title: s("Routine series"),
                tags: strings(["Challenge", "Morning routine", "Health"]),
                concept: s("Seven days of breakfast routines recorded with the product"),
                flow: strings([
                    "Days 1-2: 'a new morning habit', first unboxing and expectations",
                    "Days 3-5: 'the first changes', small differences shared on camera",
                    "Days 6-7: 'the routine sticks', an honest before and after",
                ]),
                rationale: s("Routine episodes are among the channel's 'most watched' formats and keep the product 'naturally on screen'."),
                synergy: s("A week-long journey reads as an 'authentic trial' rather than an ad and invites viewers to 'follow along'."),
                theme: ItemTheme::Green,
            },
            ContentIdea {
                id: s("02"),
                title: s("A conversation with the founder"),
                sub_title: s("Interview"),
                tags: strings(["Behind the scenes", "Interview", "Brand story"]),
                concept: s("An in-depth interview about the founder's philosophy and vision"),
                flow: strings([
                    "Opening: the creator's first impressions and open questions",
                    "Middle: 'why this product exists' and what makes it different",
                    "Close: the vision ahead and a message for viewers",
                ]),
                rationale: s("The interview format suits the creator's 'explorer' persona and builds an 'emotional connection'."),
                synergy: s("Depth sets it apart from 'plain PPL' and carries the founder's sincerity through a trusted voice."),
                theme: ItemTheme::Blue,
            },
            ContentIdea {
                id: s("03"),
                title: s("Viewer recipe battle"),
                sub_title: s("Community participation"),
                tags: strings(["Participation", "Recipes", "Community"]),
                concept: s("Cooking recipes proposed by viewers and ranking them"),
                flow: strings([
                    "Before: collect recipe ideas on social media",
                    "Main: cook the three selected recipes on camera",
                    "After: the winning recipe becomes an 'official recipe' on the brand channel",
                ]),
                rationale: s("Participation formats 'activate the community' and position the product as a 'creative tool'."),
                synergy: s("Fans get 'belonging and achievement', and winners sharing their entry drives a 'second wave' of reach."),
                theme: ItemTheme::Pink,
            },
        ],
        strategic_pillars: vec![
            StrategicPillar {
                id: 0,
                tab_title: s("Brand philosophy"),
                icon: s("Scale"),
                title: s("Brand fit: shared values"),
                subtitle: s("The core values the brand and the creator share"),
                context: PillarContext {
                    label: s("Creator insight"),
                    headline: s("Authenticity first"),
                    sub_headline: s("Consistent messages about quality and honesty"),
                    description: s("The creator rejects exaggerated claims and only recommends what was 'tried first-hand', matching the brand's 'transparent sourcing' policy."),
                    keywords: strings(["Authenticity", "Transparency", "Quality first"]),
                },
                bridge: Some(s("How does shared honesty turn into a partnership?")),
                solution: PillarSolution {
                    label: s("Strategic approach"),
                    headline: s("A trust-based partnership"),
                    description: s("Rather than a one-off placement, propose a 'brand ambassador' role so the creator becomes the 'face' of the brand over time."),
                    key_points: strings([
                        "Quarterly content produced together",
                        "Creator joins product tasting panels",
                    ]),
                },
                theme: ItemTheme::Green,
            },
            StrategicPillar {
                id: 1,
                tab_title: s("Fandom needs"),
                icon: s("HeartHandshake"),
                title: s("Fandom analysis: unmet needs"),
                subtitle: s("What viewers want but nobody has covered yet"),
                context: PillarContext {
                    label: s("Community analysis"),
                    headline: s("Hungry for healthy convenience"),
                    sub_headline: s("Hidden needs found in comments"),
                    description: s("Comments show 'busy office workers' repeatedly asking for meals that are 'healthy and quick'; past episodes mostly featured slow recipes."),
                    keywords: strings(["Office workers", "Quick meals", "Health"]),
                },
                bridge: Some(s("What if the answer took five minutes?")),
                solution: PillarSolution {
                    label: s("Needs strategy"),
                    headline: s("Five-minute healthy meals"),
                    description: s("Lead with the product's 'convenience' and tie it to 'busy mornings' and 'late-night dinners'."),
                    key_points: strings([
                        "A recipe series finished in under five minutes",
                        "Lunchbox and snack spin-offs",
                    ]),
                },
                theme: ItemTheme::Blue,
            },
            StrategicPillar {
                id: 2,
                tab_title: s("Growth"),
                icon: s("TrendingUp"),
                title: s("Blue ocean: open territory"),
                subtitle: s("A niche with little competition and room to grow"),
                context: PillarContext {
                    label: s("Market analysis"),
                    headline: s("A gap in premium healthy food"),
                    sub_headline: s("The opportunity competitors miss"),
                    description: s("'Premium plus easy' is a 'rare position': most brands pick either expensive and complex or cheap and simple."),
                    keywords: strings(["Premium", "Easy", "Differentiation"]),
                },
                bridge: Some(s("Can premium also mean effortless?")),
                solution: PillarSolution {
                    label: s("Positioning"),
                    headline: s("A new standard for premium convenience"),
                    description: s("Use the creator to define 'affordable premium' and 'effortless healthy' as a third option."),
                    key_points: strings([
                        "Value over price in every message",
                        "Uses anyone can copy at home",
                    ]),
                },
                theme: ItemTheme::Pink,
            },
        ],
        external_links: vec![
            ExternalLink {
                label: s("Product Store"),
                url: s("https://example.com/store"),
                icon: s("ShoppingBag"),
                color: s("text-olive-600 bg-olive-50 border-olive-200 hover:bg-olive-100"),
            },
            ExternalLink {
                label: s("Campaign Plan"),
                url: s("https://example.com/campaign"),
                icon: s("FileSpreadsheet"),
                color: s("text-emerald-600 bg-emerald-50 border-emerald-200 hover:bg-emerald-100"),
            },
            ExternalLink {
                label: s("Channel Report"),
                url: s("https://example.com/report"),
                icon: s("LayoutDashboard"),
                color: s("text-olive-600 bg-olive-50 border-olive-200 hover:bg-olive-100"),
            },
        ],
        report_theme: ReportTheme::Food,
    }
}
