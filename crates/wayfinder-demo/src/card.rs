//! Plain-text rendering of the popup card.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use wayfinder::StepView;

/// Wrap text into lines respecting `max_width` display columns. Words wider
/// than a line are broken between graphemes.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![];
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_width: usize = 0;

        for word in paragraph.split_whitespace() {
            let word_width = UnicodeWidthStr::width(word);

            if word_width > max_width {
                if current_width > 0 {
                    lines.push(std::mem::take(&mut current_line));
                    current_width = 0;
                }
                for grapheme in word.graphemes(true) {
                    let w = UnicodeWidthStr::width(grapheme);
                    if current_width + w > max_width && current_width > 0 {
                        lines.push(std::mem::take(&mut current_line));
                        current_width = 0;
                    }
                    current_line.push_str(grapheme);
                    current_width += w;
                }
            } else if current_width == 0 {
                current_line = word.to_string();
                current_width = word_width;
            } else if current_width + 1 + word_width <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_width += 1 + word_width;
            } else {
                lines.push(std::mem::replace(&mut current_line, word.to_string()));
                current_width = word_width;
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    lines
}

fn pad_to(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

/// `left` and `right` on one line, or on two when they do not fit.
fn spread(left: &str, right: &str, width: usize) -> Vec<String> {
    let used = UnicodeWidthStr::width(left) + UnicodeWidthStr::width(right);
    if used < width {
        vec![format!("{left}{}{right}", " ".repeat(width - used))]
    } else {
        let mut lines = wrap_text(left, width);
        lines.extend(wrap_text(right, width));
        lines
    }
}

/// Render `view` as a boxed card `inner_width` columns wide, followed by a
/// placement summary line.
pub fn render_card(view: &StepView, inner_width: usize) -> Vec<String> {
    let inner_width = inner_width.max(20);
    let mut body = spread(&view.tour_name, &view.progress_label(), inner_width);
    body.push(String::new());
    body.extend(wrap_text(&view.title, inner_width));
    body.extend(wrap_text(&view.content, inner_width));
    if let Some(hint) = &view.action_text {
        body.push(String::new());
        body.extend(wrap_text(&format!("▸ {hint}"), inner_width));
    }
    body.push(String::new());
    let forward = if view.can_go_back() {
        format!("[Back] [{}]", view.next_label())
    } else {
        format!("[{}]", view.next_label())
    };
    body.extend(spread("[Skip]", &forward, inner_width));

    let rule = "─".repeat(inner_width + 2);
    let mut lines = Vec::with_capacity(body.len() + 3);
    lines.push(format!("╭{rule}╮"));
    lines.extend(
        body.iter()
            .map(|line| format!("│ {} │", pad_to(line, inner_width))),
    );
    lines.push(format!("╰{rule}╯"));

    let p = &view.placement;
    let mut summary = format!("  {} at ({}, {})", p.side, p.origin.x, p.origin.y);
    match (p.arrow, view.anchor) {
        (Some(arrow), Some(anchor)) => {
            summary.push_str(&format!(" {} anchored to {}", arrow.glyph(), anchor.element));
        }
        _ if !p.anchored && view.anchor.is_none() && p.side != wayfinder::Placement::Center => {
            summary.push_str(" (anchor missing, centered)");
        }
        _ => {}
    }
    lines.push(summary);
    lines
}
