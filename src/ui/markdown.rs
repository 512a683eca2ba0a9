//! Rendering of the Markdown subset the summary and rating endpoints produce.
//!
//! Supported: ATX headings, bullet and numbered lists, horizontal rules,
//! `**bold**`, `*italic*` and `` `code` `` spans. Anything else is passed
//! through as plain text.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

/// Convert Markdown source into styled terminal text.
pub fn to_text(source: &str) -> Text<'static> {
    let lines: Vec<Line<'static>> = source.lines().map(render_line).collect();
    Text::from(lines)
}

fn render_line(raw: &str) -> Line<'static> {
    let trimmed = raw.trim_start();
    let indent = &raw[..raw.len() - trimmed.len()];

    if let Some((level, title)) = heading(trimmed) {
        let color = if level <= 2 { Color::Yellow } else { Color::Cyan };
        return Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    if is_rule(trimmed) {
        return Line::from(Span::styled(
            "─".repeat(24),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(rest) = ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
    {
        let mut spans = vec![Span::styled(
            format!("{}• ", indent),
            Style::default().fg(Color::Magenta),
        )];
        spans.extend(inline(rest, Style::default()));
        return Line::from(spans);
    }

    if let Some((number, rest)) = numbered(trimmed) {
        let mut spans = vec![Span::styled(
            format!("{}{}. ", indent, number),
            Style::default().fg(Color::Magenta),
        )];
        spans.extend(inline(rest, Style::default()));
        return Line::from(spans);
    }

    Line::from(inline(raw, Style::default()))
}

/// Parse `#`..`######` headings.
fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if rest.is_empty() {
        return Some((level, ""));
    }
    rest.strip_prefix(' ').map(|title| (level, title.trim()))
}

fn is_rule(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&c| line.chars().all(|ch| ch == c))
}

/// Parse `12. item` list entries.
fn numbered(line: &str) -> Option<(&str, &str)> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    line[digits..]
        .strip_prefix(". ")
        .map(|rest| (&line[..digits], rest))
}

/// Split a line into spans on emphasis and code markers.
fn inline(text: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut buf = String::new();
    let mut bold = false;
    let mut italic = false;
    let mut code = false;

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };

        if c == '`' {
            flush(&mut spans, &mut buf, style_for(base, bold, italic, code));
            code = !code;
            i += 1;
            continue;
        }

        if !code && c == '*' && next == Some('*') {
            flush(&mut spans, &mut buf, style_for(base, bold, italic, code));
            bold = !bold;
            i += 2;
            continue;
        }

        // A lone asterisk only toggles italics when it hugs a word.
        if !code && c == '*' {
            let opens = !italic && next.is_some_and(|n| !n.is_whitespace());
            let closes = italic && prev.is_some_and(|p| !p.is_whitespace());
            if opens || closes {
                flush(&mut spans, &mut buf, style_for(base, bold, italic, code));
                italic = !italic;
                i += 1;
                continue;
            }
        }

        buf.push(c);
        i += 1;
    }

    flush(&mut spans, &mut buf, style_for(base, bold, italic, code));
    spans
}

fn style_for(base: Style, bold: bool, italic: bool, code: bool) -> Style {
    let mut style = base;
    if bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if code {
        style = style.fg(Color::Green);
    }
    style
}

fn flush(spans: &mut Vec<Span<'static>>, buf: &mut String, style: Style) {
    if !buf.is_empty() {
        spans.push(Span::styled(std::mem::take(buf), style));
    }
}
