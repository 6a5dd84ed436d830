use family_tree_renderer::{RenderOptions, Theme, render_roster_svg};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    node_width: Option<f32>,
    node_height: Option<f32>,
}

fn build_render_options(options: TreeRenderOptions) -> Result<RenderOptions, String> {
    let mut render_options = RenderOptions::classic();
    if let Some(name) = options.theme.as_deref() {
        render_options.theme = Theme::from_name(name).ok_or_else(|| format!("unknown theme `{name}`"))?;
    }
    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(width) = options.node_width {
        render_options.layout.node_width = width;
    }
    if let Some(height) = options.node_height {
        render_options.layout.node_height = height;
    }
    Ok(render_options)
}

#[wasm_bindgen]
pub fn render_family_tree_svg(roster: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TreeRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TreeRenderOptions::default()
    };

    let render_options = build_render_options(options).map_err(|error| JsValue::from_str(&error))?;
    render_roster_svg(roster, &render_options).map_err(|error| JsValue::from_str(&format!("{error:#}")))
}
