use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry of the member card drawn inside each node box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    pub corner_radius: f32,
    pub avatar_column_width: f32,
    pub avatar_radius: f32,
    pub text_padding: f32,
    pub name_font_size: f32,
    pub bio_font_size: f32,
    pub caption_font_size: f32,
    pub bio_max_lines: usize,
    pub line_height: f32,
    pub selected_ring_width: f32,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            corner_radius: 12.0,
            avatar_column_width: 80.0,
            avatar_radius: 32.0,
            text_padding: 12.0,
            name_font_size: 14.0,
            bio_font_size: 12.0,
            caption_font_size: 10.0,
            bio_max_lines: 2,
            line_height: 1.35,
            selected_ring_width: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between adjacent groups on one level.
    pub node_gap_x: f32,
    /// Gap between the two members of a spouse pair.
    pub spouse_gap: f32,
    /// Gap between consecutive levels.
    pub level_gap_y: f32,
    pub padding: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub fast_text_metrics: bool,
    pub card: CardConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            node_height: 120.0,
            node_gap_x: 60.0,
            spouse_gap: 24.0,
            level_gap_y: 140.0,
            padding: 40.0,
            min_width: 800.0,
            min_height: 400.0,
            fast_text_metrics: true,
            card: CardConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    card_fill: Option<String>,
    card_border: Option<String>,
    card_selected_border: Option<String>,
    avatar_column_fill: Option<String>,
    name_color: Option<String>,
    bio_color: Option<String>,
    caption_color: Option<String>,
    line_color: Option<String>,
    line_width: Option<f32>,
    spouse_line_color: Option<String>,
    spouse_dasharray: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_gap_x: Option<f32>,
    spouse_gap: Option<f32>,
    level_gap_y: Option<f32>,
    padding: Option<f32>,
    min_width: Option<f32>,
    min_height: Option<f32>,
    fast_text_metrics: Option<bool>,
    bio_max_lines: Option<usize>,
    avatar_column_width: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::from_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown theme `{}`", theme_name))?;
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
        if let Some(v) = vars.card_fill {
            theme.card_fill = v;
        }
        if let Some(v) = vars.card_border {
            theme.card_border = v;
        }
        if let Some(v) = vars.card_selected_border {
            theme.card_selected_border = v;
        }
        if let Some(v) = vars.avatar_column_fill {
            theme.avatar_column_fill = v;
        }
        if let Some(v) = vars.name_color {
            theme.name_color = v;
        }
        if let Some(v) = vars.bio_color {
            theme.bio_color = v;
        }
        if let Some(v) = vars.caption_color {
            theme.caption_color = v;
        }
        if let Some(v) = vars.line_color {
            theme.line_color = v;
        }
        if let Some(v) = vars.line_width {
            theme.line_width = v;
        }
        if let Some(v) = vars.spouse_line_color {
            theme.spouse_line_color = v;
        }
        if let Some(v) = vars.spouse_dasharray {
            theme.spouse_dasharray = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.node_width {
            target.node_width = v.max(1.0);
        }
        if let Some(v) = layout.node_height {
            target.node_height = v.max(1.0);
        }
        if let Some(v) = layout.node_gap_x {
            target.node_gap_x = v.max(0.0);
        }
        if let Some(v) = layout.spouse_gap {
            target.spouse_gap = v.max(0.0);
        }
        if let Some(v) = layout.level_gap_y {
            target.level_gap_y = v.max(0.0);
        }
        if let Some(v) = layout.padding {
            target.padding = v.max(0.0);
        }
        if let Some(v) = layout.min_width {
            target.min_width = v.max(0.0);
        }
        if let Some(v) = layout.min_height {
            target.min_height = v.max(0.0);
        }
        if let Some(v) = layout.fast_text_metrics {
            target.fast_text_metrics = v;
        }
        if let Some(v) = layout.bio_max_lines {
            target.card.bio_max_lines = v;
        }
        if let Some(v) = layout.avatar_column_width {
            target.card.avatar_column_width = v.max(0.0);
        }
    }

    Ok(config)
}
