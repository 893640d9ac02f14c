//! Theme and color lookup tables.
//!
//! Two fixed tables drive the dashboard palette: the category theme (page-level
//! tokens, keyed by [`ReportTheme`]) and the item theme (per pillar / concept /
//! content idea, keyed by [`ItemTheme`]). Lookups never fail: unknown tokens
//! resolve to the food / green entries.

use serde::{Deserialize, Serialize};

/// Top-level report palette selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTheme {
    #[serde(alias = "뷰티")]
    Beauty,
    #[default]
    #[serde(alias = "푸드")]
    Food,
}

/// Wire tokens for report themes. The first entry is the fallback.
pub const REPORT_THEME_TOKENS: &[&str] = &["food", "beauty"];

impl ReportTheme {
    /// Parse a wire token (English or the Korean label). Returns `None` when unknown.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "beauty" | "뷰티" => Some(Self::Beauty),
            "food" | "푸드" => Some(Self::Food),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beauty => "beauty",
            Self::Food => "food",
        }
    }

    pub fn category_theme(self) -> &'static CategoryTheme {
        match self {
            Self::Beauty => &BEAUTY_THEME,
            Self::Food => &FOOD_THEME,
        }
    }

    /// The 3-element item-theme rotation for this report theme.
    pub fn cycle(self) -> [ItemTheme; 3] {
        match self {
            Self::Beauty => [ItemTheme::Purple, ItemTheme::Blue, ItemTheme::Pink],
            Self::Food => [ItemTheme::Green, ItemTheme::Blue, ItemTheme::Pink],
        }
    }

    /// Item theme for the element at `index` (0-based) of a themed sequence.
    pub fn item_theme_at(self, index: usize) -> ItemTheme {
        self.cycle()[index % 3]
    }

    pub fn link_colors(self) -> &'static ExternalLinkColors {
        match self {
            Self::Beauty => &BEAUTY_LINK_COLORS,
            Self::Food => &FOOD_LINK_COLORS,
        }
    }

    /// Deployment project name prefix.
    pub fn project_prefix(self) -> &'static str {
        self.category_theme().project_prefix
    }
}

/// Category theme for a raw token, falling back to food.
pub fn category_theme_for(token: &str) -> &'static CategoryTheme {
    ReportTheme::from_token(token)
        .unwrap_or_default()
        .category_theme()
}

/// Per-item palette token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemTheme {
    Purple,
    #[default]
    Green,
    Blue,
    Teal,
    Pink,
}

/// Wire tokens accepted for item themes. The first entry is the fallback.
pub const ITEM_THEME_TOKENS: &[&str] = &["green", "purple", "blue", "teal", "pink"];

impl ItemTheme {
    /// Resolve a token, degrading to [`ItemTheme::Green`] for anything unknown.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "purple" => Self::Purple,
            "green" => Self::Green,
            "blue" => Self::Blue,
            "teal" => Self::Teal,
            "pink" => Self::Pink,
            _ => Self::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purple => "purple",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Teal => "teal",
            Self::Pink => "pink",
        }
    }

    pub fn colors(self) -> &'static ItemThemeColors {
        match self {
            Self::Purple => &PURPLE_ITEM,
            Self::Green => &GREEN_ITEM,
            Self::Blue => &BLUE_ITEM,
            Self::Teal => &TEAL_ITEM,
            Self::Pink => &PINK_ITEM,
        }
    }
}

/// Item colors for a raw token; unknown tokens get the green entry.
pub fn item_theme_colors(token: &str) -> &'static ItemThemeColors {
    ItemTheme::from_token(token).colors()
}

/// Class list used for `'quoted'` keyword emphasis in a given color.
pub fn highlight_class(color: &str) -> &'static str {
    match color {
        "purple" => "text-purple-700 font-semibold",
        "blue" => "text-blue-700 font-semibold",
        "teal" => "text-teal-700 font-semibold",
        "pink" => "text-pink-700 font-semibold",
        "slate" => "text-slate-900 font-semibold",
        "white" => "text-white font-bold underline underline-offset-2",
        _ => "text-olive-700 font-semibold",
    }
}

// ============================================================================
// Category themes
// ============================================================================

/// Page-level presentation tokens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTheme {
    pub hex: &'static str,
    pub logo_text: &'static str,
    pub logo_color: &'static str,
    pub project_prefix: &'static str,
    pub page_title: &'static str,
    pub selection_bg: &'static str,
    pub selection_text: &'static str,
    pub gauge_fill: &'static str,
    pub excellent_badge: &'static str,
    pub section_bar: &'static str,
    pub hero_blob: &'static str,
    pub dark_blob: &'static str,
    pub headline_gradient: &'static str,
    pub sub_heading_color: &'static str,
    pub quote_icon_color: &'static str,
    pub strategic_badge: &'static str,
    pub name_gradient: &'static str,
    pub decoration_underline: &'static str,
    pub icon_accent: &'static str,
    pub identity_tag_hover: &'static str,
    pub tagline_bar: &'static str,
    pub profile_link_hover: &'static str,
    pub radar_stroke: &'static str,
    pub radar_fill: &'static str,
    pub core_bg: &'static str,
    pub core_border: &'static str,
    pub core_hover_bg: &'static str,
    pub core_hover_border: &'static str,
    pub core_icon_bg: &'static str,
    pub core_icon_text: &'static str,
    pub core_title: &'static str,
    pub key_points_badge: &'static str,
}

static FOOD_THEME: CategoryTheme = CategoryTheme {
    hex: "#7c7d35",
    logo_text: "Celebfood",
    logo_color: "#7c7d35",
    project_prefix: "celebfood-report",
    page_title: "Celebfood Report",
    selection_bg: "selection:bg-olive-200",
    selection_text: "selection:text-olive-900",
    gauge_fill: "#7c7d35",
    excellent_badge: "bg-olive-50 text-olive-700 border-olive-200",
    section_bar: "bg-gradient-to-b from-olive-500 to-emerald-600",
    hero_blob: "from-olive-50 to-emerald-50",
    dark_blob: "bg-olive-600",
    headline_gradient: "from-olive-300 via-emerald-300 to-teal-300",
    sub_heading_color: "text-olive-200/80",
    quote_icon_color: "text-olive-400",
    strategic_badge: "text-olive-600",
    name_gradient: "from-olive-600 to-emerald-600",
    decoration_underline: "decoration-olive-200",
    icon_accent: "text-olive-600",
    identity_tag_hover: "hover:border-olive-300 hover:text-olive-600",
    tagline_bar: "bg-olive-200",
    profile_link_hover: "hover:text-olive-500",
    radar_stroke: "#7c7d35",
    radar_fill: "#7c7d35",
    core_bg: "bg-olive-50/40",
    core_border: "border-olive-100",
    core_hover_bg: "hover:bg-olive-50",
    core_hover_border: "hover:border-olive-300",
    core_icon_bg: "bg-olive-100",
    core_icon_text: "text-olive-600",
    core_title: "text-olive-700",
    key_points_badge: "text-olive-700 bg-olive-50 border-olive-100",
};

static BEAUTY_THEME: CategoryTheme = CategoryTheme {
    hex: "#8b5cf6",
    logo_text: "Celebeauty",
    logo_color: "#8b5cf6",
    project_prefix: "celebeauty-report",
    page_title: "Celebeauty Report",
    selection_bg: "selection:bg-purple-200",
    selection_text: "selection:text-purple-900",
    gauge_fill: "#8b5cf6",
    excellent_badge: "bg-purple-50 text-purple-700 border-purple-200",
    section_bar: "bg-gradient-to-b from-purple-500 to-violet-600",
    hero_blob: "from-purple-50 to-violet-50",
    dark_blob: "bg-purple-600",
    headline_gradient: "from-purple-300 via-violet-300 to-fuchsia-300",
    sub_heading_color: "text-purple-200/80",
    quote_icon_color: "text-purple-400",
    strategic_badge: "text-purple-600",
    name_gradient: "from-purple-600 to-violet-600",
    decoration_underline: "decoration-purple-200",
    icon_accent: "text-purple-600",
    identity_tag_hover: "hover:border-purple-300 hover:text-purple-600",
    tagline_bar: "bg-purple-200",
    profile_link_hover: "hover:text-purple-500",
    radar_stroke: "#8b5cf6",
    radar_fill: "#8b5cf6",
    core_bg: "bg-purple-50/40",
    core_border: "border-purple-100",
    core_hover_bg: "hover:bg-purple-50",
    core_hover_border: "hover:border-purple-300",
    core_icon_bg: "bg-purple-100",
    core_icon_text: "text-purple-600",
    core_title: "text-purple-700",
    key_points_badge: "text-purple-700 bg-purple-50 border-purple-100",
};

// ============================================================================
// Item themes
// ============================================================================

/// Per-item presentation tokens (pillar tabs, content cards, concept icons).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemThemeColors {
    pub tab_active_bg: &'static str,
    pub reason_badge: &'static str,
    pub divider_line: &'static str,
    pub title_gradient: &'static str,
    pub context_bg: &'static str,
    pub context_headline: &'static str,
    pub solution_label_color: &'static str,
    pub key_point_card: &'static str,
    pub key_point_icon: &'static str,
    pub key_point_text: &'static str,
    pub content_tag: &'static str,
    pub tab_underline: &'static str,
    pub timeline_dot: &'static str,
    pub step_label: &'static str,
    pub synergy_header: &'static str,
    pub synergy_card: &'static str,
    pub concept_icon_gradient: &'static str,
    pub concept_title_hover: &'static str,
    pub highlight_class: &'static str,
}

static PURPLE_ITEM: ItemThemeColors = ItemThemeColors {
    tab_active_bg: "bg-purple-600",
    reason_badge: "bg-purple-50 text-purple-700 border-purple-100",
    divider_line: "bg-purple-100",
    title_gradient: "from-purple-600 to-violet-600",
    context_bg: "bg-purple-50/40",
    context_headline: "text-purple-900",
    solution_label_color: "#7c3aed",
    key_point_card: "bg-purple-50/30 border-purple-100 hover:border-purple-300",
    key_point_icon: "bg-purple-100 text-purple-600",
    key_point_text: "text-purple-900",
    content_tag: "bg-purple-50 text-purple-700 border-purple-100",
    tab_underline: "bg-purple-600",
    timeline_dot: "bg-purple-500",
    step_label: "text-purple-600",
    synergy_header: "text-purple-600",
    synergy_card: "bg-gradient-to-br from-purple-600 to-violet-700 border-purple-500",
    concept_icon_gradient: "from-purple-500/20 to-purple-500/5 text-purple-300",
    concept_title_hover: "group-hover:text-purple-200",
    highlight_class: "text-purple-700 font-semibold",
};

static GREEN_ITEM: ItemThemeColors = ItemThemeColors {
    tab_active_bg: "bg-slate-900",
    reason_badge: "bg-olive-50 text-olive-700 border-olive-100",
    divider_line: "bg-olive-100",
    title_gradient: "from-olive-600 to-emerald-600",
    context_bg: "bg-olive-50/40",
    context_headline: "text-olive-900",
    solution_label_color: "#15803d",
    key_point_card: "bg-olive-50/30 border-olive-100 hover:border-olive-300",
    key_point_icon: "bg-olive-100 text-olive-600",
    key_point_text: "text-olive-900",
    content_tag: "bg-olive-50 text-olive-700 border-olive-100",
    tab_underline: "bg-olive-600",
    timeline_dot: "bg-olive-500",
    step_label: "text-olive-600",
    synergy_header: "text-olive-600",
    synergy_card: "bg-gradient-to-br from-olive-600 to-emerald-700 border-olive-500",
    concept_icon_gradient: "from-olive-500/20 to-olive-500/5 text-olive-300",
    concept_title_hover: "group-hover:text-olive-200",
    highlight_class: "text-olive-700 font-semibold",
};

static BLUE_ITEM: ItemThemeColors = ItemThemeColors {
    tab_active_bg: "bg-blue-600",
    reason_badge: "bg-blue-50 text-blue-700 border-blue-100",
    divider_line: "bg-blue-100",
    title_gradient: "from-blue-600 to-cyan-600",
    context_bg: "bg-blue-50/40",
    context_headline: "text-blue-900",
    solution_label_color: "#1d4ed8",
    key_point_card: "bg-blue-50/30 border-blue-100 hover:border-blue-200",
    key_point_icon: "bg-blue-100 text-blue-600",
    key_point_text: "text-blue-900",
    content_tag: "bg-blue-50 text-blue-700 border-blue-100",
    tab_underline: "bg-blue-600",
    timeline_dot: "bg-blue-500",
    step_label: "text-blue-600",
    synergy_header: "text-blue-600",
    synergy_card: "bg-gradient-to-br from-blue-600 to-cyan-700 border-blue-500",
    concept_icon_gradient: "from-indigo-500/20 to-indigo-500/5 text-indigo-300",
    concept_title_hover: "group-hover:text-indigo-200",
    highlight_class: "text-blue-700 font-semibold",
};

static TEAL_ITEM: ItemThemeColors = ItemThemeColors {
    tab_active_bg: "bg-teal-600",
    reason_badge: "bg-teal-50 text-teal-700 border-teal-100",
    divider_line: "bg-teal-100",
    title_gradient: "from-teal-600 to-cyan-600",
    context_bg: "bg-teal-50/40",
    context_headline: "text-teal-900",
    solution_label_color: "#0d9488",
    key_point_card: "bg-teal-50/30 border-teal-100 hover:border-teal-200",
    key_point_icon: "bg-teal-100 text-teal-600",
    key_point_text: "text-teal-900",
    content_tag: "bg-teal-50 text-teal-700 border-teal-100",
    tab_underline: "bg-teal-600",
    timeline_dot: "bg-teal-500",
    step_label: "text-teal-600",
    synergy_header: "text-teal-600",
    synergy_card: "bg-gradient-to-br from-teal-600 to-cyan-700 border-teal-500",
    concept_icon_gradient: "from-teal-500/20 to-teal-500/5 text-teal-300",
    concept_title_hover: "group-hover:text-teal-200",
    highlight_class: "text-teal-700 font-semibold",
};

static PINK_ITEM: ItemThemeColors = ItemThemeColors {
    tab_active_bg: "bg-pink-600",
    reason_badge: "bg-pink-50 text-pink-700 border-pink-100",
    divider_line: "bg-pink-100",
    title_gradient: "from-pink-600 to-rose-600",
    context_bg: "bg-pink-50/40",
    context_headline: "text-pink-900",
    solution_label_color: "#be123c",
    key_point_card: "bg-pink-50/30 border-pink-100 hover:border-pink-200",
    key_point_icon: "bg-pink-100 text-pink-600",
    key_point_text: "text-pink-900",
    content_tag: "bg-pink-50 text-pink-700 border-pink-100",
    tab_underline: "bg-pink-600",
    timeline_dot: "bg-pink-500",
    step_label: "text-pink-600",
    synergy_header: "text-pink-600",
    synergy_card: "bg-gradient-to-br from-pink-600 to-rose-700 border-pink-500",
    concept_icon_gradient: "from-pink-500/20 to-pink-500/5 text-pink-300",
    concept_title_hover: "group-hover:text-pink-200",
    highlight_class: "text-pink-700 font-semibold",
};

// ============================================================================
// External link colors
// ============================================================================

/// Style tokens for the three synthesized external links, in link order.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalLinkColors {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub tertiary: &'static str,
}

static BEAUTY_LINK_COLORS: ExternalLinkColors = ExternalLinkColors {
    primary: "text-purple-600 bg-purple-50 border-purple-200 hover:bg-purple-100",
    secondary: "text-indigo-600 bg-indigo-50 border-indigo-200 hover:bg-indigo-100",
    tertiary: "text-purple-600 bg-purple-50 border-purple-200 hover:bg-purple-100",
};

static FOOD_LINK_COLORS: ExternalLinkColors = ExternalLinkColors {
    primary: "text-olive-600 bg-olive-50 border-olive-200 hover:bg-olive-100",
    secondary: "text-emerald-600 bg-emerald-50 border-emerald-200 hover:bg-emerald-100",
    tertiary: "text-olive-600 bg-olive-50 border-olive-200 hover:bg-olive-100",
};
