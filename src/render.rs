use crate::config::LayoutConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::ir::Person;
use crate::layout::{ConnectorLayout, Layout, NodeLayout, SpouseLinkLayout, StrokeStyle};
use crate::store::FamilyStore;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Draws the laid-out tree: connectors first, then spouse links, then cards on top.
pub fn render_svg(layout: &Layout, store: &FamilyStore, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<defs>");
    for node in layout.nodes.values() {
        if has_photo(store.get(node.id)) {
            let (cx, cy) = avatar_center(node, config);
            svg.push_str(&format!(
                "<clipPath id=\"{}\"><circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\"/></clipPath>",
                avatar_clip_id(node),
                config.card.avatar_radius
            ));
        }
    }
    svg.push_str("</defs>");

    svg.push_str("<g class=\"connectors\">");
    for conn in &layout.connectors {
        svg.push_str(&connector_svg(conn, theme));
    }
    for link in &layout.spouse_links {
        svg.push_str(&spouse_link_svg(link, theme));
    }
    svg.push_str("</g>");

    for node in layout.nodes.values() {
        let Some(person) = store.get(node.id) else {
            continue;
        };
        svg.push_str(&card_svg(node, person, theme, config));
    }

    svg.push_str("</svg>");
    svg
}

fn stroke_attrs(stroke: StrokeStyle, color: &str, width: f32, dasharray: &str) -> String {
    let mut attrs = format!("fill=\"none\" stroke=\"{color}\" stroke-width=\"{width}\"");
    if stroke == StrokeStyle::Dashed {
        attrs.push_str(&format!(" stroke-dasharray=\"{dasharray}\""));
    }
    attrs
}

fn connector_svg(conn: &ConnectorLayout, theme: &Theme) -> String {
    format!(
        "<path d=\"{}\" {} data-child=\"{}\"/>",
        conn.path_data(),
        stroke_attrs(conn.stroke, &theme.line_color, theme.line_width, &theme.spouse_dasharray),
        conn.child
    )
}

fn spouse_link_svg(link: &SpouseLinkLayout, theme: &Theme) -> String {
    format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" {}/>",
        link.start.0,
        link.start.1,
        link.end.0,
        link.end.1,
        stroke_attrs(
            link.stroke,
            &theme.spouse_line_color,
            theme.line_width,
            &theme.spouse_dasharray
        )
    )
}

fn card_svg(node: &NodeLayout, person: &Person, theme: &Theme, config: &LayoutConfig) -> String {
    let card = &config.card;
    let radius = card.corner_radius;
    let mut svg = format!("<g class=\"member\" data-person-id=\"{}\">", node.id);

    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius}\" ry=\"{radius}\" fill=\"{}\"/>",
        node.x, node.y, node.width, node.height, theme.card_fill
    ));

    // Avatar column, rounded only on the card's left side.
    let column = card.avatar_column_width.min(node.width);
    svg.push_str(&format!(
        "<path d=\"M {xr:.2} {y0:.2} L {xc:.2} {y0:.2} L {xc:.2} {y1:.2} L {xr:.2} {y1:.2} A {radius} {radius} 0 0 1 {x0:.2} {yb:.2} L {x0:.2} {yt:.2} A {radius} {radius} 0 0 1 {xr:.2} {y0:.2} Z\" fill=\"{}\"/>",
        theme.avatar_column_fill,
        x0 = node.x,
        xr = node.x + radius,
        xc = node.x + column,
        y0 = node.y,
        yt = node.y + radius,
        yb = node.bottom() - radius,
        y1 = node.bottom(),
    ));

    let (border, border_width) = if node.selected {
        (theme.card_selected_border.as_str(), card.selected_ring_width)
    } else {
        (theme.card_border.as_str(), 1.0)
    };
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius}\" ry=\"{radius}\" fill=\"none\" stroke=\"{border}\" stroke-width=\"{border_width}\"/>",
        node.x, node.y, node.width, node.height
    ));
    svg.push_str(&avatar_svg(node, person, theme, config));

    let text_x = node.x + column + card.text_padding;
    let mut baseline = node.y + card.text_padding + card.name_font_size;
    svg.push_str(&format!(
        "<text x=\"{text_x:.2}\" y=\"{baseline:.2}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        theme.font_family,
        card.name_font_size,
        theme.name_color,
        escape_xml(&node.card.name)
    ));

    baseline += card.name_font_size * (card.line_height - 1.0) + card.bio_font_size * card.line_height;
    for line in &node.card.bio_lines {
        svg.push_str(&format!(
            "<text x=\"{text_x:.2}\" y=\"{baseline:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            theme.font_family,
            card.bio_font_size,
            theme.bio_color,
            escape_xml(line)
        ));
        baseline += card.bio_font_size * card.line_height;
    }

    let caption_y = node.bottom() - card.text_padding;
    svg.push_str(&format!(
        "<text x=\"{text_x:.2}\" y=\"{caption_y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        theme.font_family,
        card.caption_font_size,
        theme.caption_color,
        escape_xml(&node.card.caption)
    ));

    svg.push_str("</g>");
    svg
}

fn avatar_svg(node: &NodeLayout, person: &Person, theme: &Theme, config: &LayoutConfig) -> String {
    let r = config.card.avatar_radius;
    let (cx, cy) = avatar_center(node, config);
    if let Some(photo) = person.attributes.photo.as_deref().filter(|p| !p.trim().is_empty()) {
        return format!(
            "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" preserveAspectRatio=\"xMidYMid slice\" clip-path=\"url(#{})\"/>",
            escape_xml(photo),
            cx - r,
            cy - r,
            r * 2.0,
            r * 2.0,
            avatar_clip_id(node)
        );
    }
    format!(
        "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{}\"/><text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{:.2}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        theme.avatar_placeholder_fill,
        cy + r * 0.35,
        theme.font_family,
        r,
        theme.avatar_placeholder_text,
        escape_xml(&initial(person.name()))
    )
}

fn avatar_center(node: &NodeLayout, config: &LayoutConfig) -> (f32, f32) {
    let column = config.card.avatar_column_width.min(node.width);
    (node.x + column / 2.0, node.center_y())
}

fn avatar_clip_id(node: &NodeLayout) -> String {
    format!("avatar-{}", node.id)
}

fn has_photo(person: Option<&Person>) -> bool {
    person
        .and_then(|p| p.attributes.photo.as_deref())
        .is_some_and(|photo| !photo.trim().is_empty())
}

fn initial(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map(|ch| ch.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
