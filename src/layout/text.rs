use crate::config::LayoutConfig;
use crate::ir::{Gender, Person};
use crate::text_metrics;
use crate::theme::Theme;

use super::CardText;

const ELLIPSIS: char = '\u{2026}';
const EMPTY_BIO: &str = "\u{2014}";

/// Fits a person's name, bio and caption into the card's text column.
///
/// The name is clamped to one line and the bio to `card.bio_max_lines`,
/// both ending in an ellipsis when cut.
pub(super) fn fit_card_text(person: &Person, theme: &Theme, config: &LayoutConfig) -> CardText {
    let card = &config.card;
    let column = text_column_width(config);
    let family = theme.font_family.as_str();
    let fast = config.fast_text_metrics;

    let name = ellipsize(person.name().trim(), column, card.name_font_size, family, fast);

    let bio = person.attributes.bio.trim();
    let bio_lines = if bio.is_empty() {
        vec![EMPTY_BIO.to_string()]
    } else {
        wrap_clamped(bio, column, card.bio_max_lines, card.bio_font_size, family, fast)
    };

    let role = person.attributes.role.label();
    let caption = match person.attributes.gender {
        Gender::Unspecified => role.to_string(),
        gender => format!("{} \u{b7} {}", gender.label(), role),
    };
    let caption = ellipsize(&caption, column, card.caption_font_size, family, fast);

    CardText {
        name,
        bio_lines,
        caption,
    }
}

pub(super) fn text_column_width(config: &LayoutConfig) -> f32 {
    let card = &config.card;
    (config.node_width - card.avatar_column_width - card.text_padding * 2.0).max(1.0)
}

pub(super) fn ellipsize(
    text: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
) -> String {
    if text_width(text, font_size, font_family, fast_metrics) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>().trim_end().to_string();
        let with_ellipsis = format!("{candidate}{ELLIPSIS}");
        if text_width(&with_ellipsis, font_size, font_family, fast_metrics) <= max_width {
            return with_ellipsis;
        }
    }
    ELLIPSIS.to_string()
}

pub(super) fn wrap_clamped(
    text: &str,
    max_width: f32,
    max_lines: usize,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        lines.extend(wrap_line(raw.trim(), max_width, font_size, font_family, fast_metrics));
    }
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        // The kept line may fit on its own; it still has to show the cut.
        let mut chars: Vec<char> = last.chars().collect();
        loop {
            let candidate = format!("{}{ELLIPSIS}", chars.iter().collect::<String>().trim_end());
            if chars.is_empty()
                || text_width(&candidate, font_size, font_family, fast_metrics) <= max_width
            {
                *last = candidate;
                break;
            }
            chars.pop();
        }
    }
    lines
}

pub(super) fn wrap_line(
    line: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
) -> Vec<String> {
    if text_width(line, font_size, font_family, fast_metrics) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, font_size, font_family, fast_metrics) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        // A single word wider than the column is broken by characters.
        for ch in word.chars() {
            current.push(ch);
            if current.chars().count() > 1
                && text_width(&current, font_size, font_family, fast_metrics) > max_width
            {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(ch);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(super) fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Advance widths as a fraction of font size for a typical sans-serif face.
pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' | '\u{a0}' => 0.306,
        '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '\'' => 0.321,
        '\u{2026}' => 0.9,
        '\u{2014}' => 1.0,
        '\u{b7}' => 0.3,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' | 'Q' => 0.755,
        'P' => 0.623,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' | 'Y' | 'Z' => 0.64,
        'f' => 0.340,
        'i' | 'j' | 'l' => 0.235,
        'm' => 0.867,
        'r' => 0.364,
        't' => 0.305,
        'w' => 0.811,
        'a'..='z' => 0.575,
        '0'..='9' => 0.6,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}
