use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub card_fill: String,
    pub card_border: String,
    pub card_selected_border: String,
    pub avatar_column_fill: String,
    pub avatar_placeholder_fill: String,
    pub avatar_placeholder_text: String,
    pub name_color: String,
    pub bio_color: String,
    pub caption_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub spouse_line_color: String,
    pub spouse_dasharray: String,
}

impl Theme {
    /// The light card look of the web editor.
    pub fn classic() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            card_fill: "#EEF2FF".to_string(),
            card_border: "#E5E7EB".to_string(),
            card_selected_border: "#6366F1".to_string(),
            avatar_column_fill: "#F8FAFC".to_string(),
            avatar_placeholder_fill: "#E5E7EB".to_string(),
            avatar_placeholder_text: "#6B7280".to_string(),
            name_color: "#1F2937".to_string(),
            bio_color: "#4B5563".to_string(),
            caption_color: "#6B7280".to_string(),
            line_color: "#94A3B8".to_string(),
            line_width: 2.0,
            spouse_line_color: "#F472B6".to_string(),
            spouse_dasharray: "6 4".to_string(),
        }
    }

    pub fn midnight() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            background: "#000000".to_string(),
            card_fill: "#111827".to_string(),
            card_border: "#374151".to_string(),
            card_selected_border: "#22D3EE".to_string(),
            avatar_column_fill: "#1F2937".to_string(),
            avatar_placeholder_fill: "#374151".to_string(),
            avatar_placeholder_text: "#D1D5DB".to_string(),
            name_color: "#F9FAFB".to_string(),
            bio_color: "#D1D5DB".to_string(),
            caption_color: "#9CA3AF".to_string(),
            line_color: "#64748B".to_string(),
            line_width: 2.0,
            spouse_line_color: "#38BDF8".to_string(),
            spouse_dasharray: "6 4".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" | "light" => Some(Self::classic()),
            "midnight" | "dark" => Some(Self::midnight()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
