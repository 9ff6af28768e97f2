//! Small Markdown renderer for chat replies and sidebar text
//!
//! Covers what the model and the static copy actually use: paragraphs with hard
//! line breaks, headings, bullet and numbered lists, rules, bold, italic, inline
//! code and links.

use dioxus::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Consecutive lines, rendered with line breaks between them
    Paragraph(Vec<String>),
    Heading(u8, String),
    BulletList(Vec<String>),
    NumberedList(Vec<String>),
    Rule,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Link(String, String), // (text, url)
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&level) && line[level..].starts_with(' ') {
        Some((level as u8, line[level..].trim()))
    } else {
        None
    }
}

fn bullet_item(line: &str) -> Option<&str> {
    ["- ", "* ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

fn numbered_item(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ").map(str::trim)
}

fn is_rule(line: &str) -> bool {
    matches!(line, "---" | "***" | "___")
}

fn starts_block(line: &str) -> bool {
    is_rule(line)
        || heading(line).is_some()
        || bullet_item(line).is_some()
        || numbered_item(line).is_some()
}

pub fn parse_blocks(content: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut lines = content.lines().map(str::trim).peekable();

    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }

        if is_rule(line) {
            blocks.push(Block::Rule);
        } else if let Some((level, text)) = heading(line) {
            blocks.push(Block::Heading(level, text.to_string()));
        } else if let Some(first) = bullet_item(line) {
            let mut items = vec![first.to_string()];
            while let Some(item) = lines.peek().and_then(|l| bullet_item(l)) {
                items.push(item.to_string());
                lines.next();
            }
            blocks.push(Block::BulletList(items));
        } else if let Some(first) = numbered_item(line) {
            let mut items = vec![first.to_string()];
            while let Some(item) = lines.peek().and_then(|l| numbered_item(l)) {
                items.push(item.to_string());
                lines.next();
            }
            blocks.push(Block::NumberedList(items));
        } else {
            let mut para = vec![line.to_string()];
            while let Some(next) = lines.peek() {
                if next.is_empty() || starts_block(next) {
                    break;
                }
                para.push(next.to_string());
                lines.next();
            }
            blocks.push(Block::Paragraph(para));
        }
    }

    blocks
}

pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    let flush = |plain: &mut String, segments: &mut Vec<Inline>| {
        if !plain.is_empty() {
            segments.push(Inline::Text(std::mem::take(plain)));
        }
    };

    while let Some(ch) = rest.chars().next() {
        // Bold **...**
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**").filter(|&end| end > 0) {
                flush(&mut plain, &mut segments);
                segments.push(Inline::Bold(after[..end].to_string()));
                rest = &after[end + 2..];
                continue;
            }
        }

        // Italic *...*
        if let Some(after) = rest.strip_prefix('*') {
            if !after.starts_with(['*', ' ']) {
                if let Some(end) = after.find('*').filter(|&end| end > 0) {
                    flush(&mut plain, &mut segments);
                    segments.push(Inline::Italic(after[..end].to_string()));
                    rest = &after[end + 1..];
                    continue;
                }
            }
        }

        // Inline code `...`
        if let Some(after) = rest.strip_prefix('`') {
            if let Some(end) = after.find('`') {
                flush(&mut plain, &mut segments);
                segments.push(Inline::Code(after[..end].to_string()));
                rest = &after[end + 1..];
                continue;
            }
        }

        // Link [text](url)
        if let Some(after) = rest.strip_prefix('[') {
            if let Some(mid) = after.find("](") {
                if let Some(close) = after[mid + 2..].find(')') {
                    flush(&mut plain, &mut segments);
                    let url = &after[mid + 2..mid + 2 + close];
                    segments.push(Inline::Link(after[..mid].to_string(), url.to_string()));
                    rest = &after[mid + 2 + close + 1..];
                    continue;
                }
            }
        }

        plain.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    flush(&mut plain, &mut segments);

    segments
}

/// Markdown content renderer
#[component]
pub fn MarkdownContent(content: String) -> Element {
    let blocks = parse_blocks(&content);

    rsx! {
        div { class: "markdown",
            for block in blocks {
                {render_block(block)}
            }
        }
    }
}

fn render_block(block: Block) -> Element {
    match block {
        Block::Paragraph(lines) => {
            let last = lines.len().saturating_sub(1);
            rsx! {
                p {
                    for (idx, line) in lines.iter().enumerate() {
                        {render_inline(line)}
                        if idx < last {
                            br {}
                        }
                    }
                }
            }
        }
        Block::Heading(level, text) => {
            let class = match level {
                1 => "md-h1",
                2 => "md-h2",
                _ => "md-h3",
            };
            rsx! {
                div { class: "{class}", {render_inline(&text)} }
            }
        }
        Block::BulletList(items) => rsx! {
            ul {
                for item in items {
                    li { {render_inline(&item)} }
                }
            }
        },
        Block::NumberedList(items) => rsx! {
            ol {
                for item in items {
                    li { {render_inline(&item)} }
                }
            }
        },
        Block::Rule => rsx! {
            hr {}
        },
    }
}

fn render_inline(text: &str) -> Element {
    rsx! {
        for segment in parse_inline(text) {
            {render_segment(segment)}
        }
    }
}

fn render_segment(segment: Inline) -> Element {
    match segment {
        Inline::Text(text) => rsx! { "{text}" },
        Inline::Bold(text) => rsx! {
            strong { "{text}" }
        },
        Inline::Italic(text) => rsx! {
            em { "{text}" }
        },
        Inline::Code(code) => rsx! {
            code { "{code}" }
        },
        Inline::Link(text, url) => rsx! {
            a { href: "{url}", target: "_blank", rel: "noopener noreferrer", "{text}" }
        },
    }
}
