//! Line-oriented Markdown → HTML.
//!
//! Deliberately approximate: ATX headings, emphasis, fenced and inline code,
//! links, flat bullet lists and paragraphs. No nesting, tables or HTML
//! passthrough.

use std::sync::LazyLock;

use regex::Regex;

use super::escape_html;

#[allow(clippy::expect_used)]
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$").expect("valid regex"));

#[allow(clippy::expect_used)]
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid regex"));

#[allow(clippy::expect_used)]
static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));

#[allow(clippy::expect_used)]
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid regex"));

#[allow(clippy::expect_used)]
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").expect("valid regex"));

#[allow(clippy::expect_used)]
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*|\b_([^_]+)_\b").expect("valid regex"));

/// Convert Markdown source to an HTML fragment.
pub fn markdown_to_html(source: &str) -> String {
    let mut out = String::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut in_list = false;
    let mut fence: Option<Vec<String>> = None;
    let mut fence_lang = String::new();

    for line in source.lines() {
        if let Some(code) = fence.as_mut() {
            if line.trim_start().starts_with("```") {
                let class = if fence_lang.is_empty() {
                    String::new()
                } else {
                    format!(" class=\"language-{}\"", escape_html(&fence_lang))
                };
                out.push_str(&format!(
                    "<pre><code{class}>{}</code></pre>\n",
                    escape_html(&code.join("\n"))
                ));
                fence = None;
            } else {
                code.push(line.to_string());
            }
            continue;
        }

        let trimmed = line.trim();
        if let Some(lang) = trimmed.strip_prefix("```") {
            flush_paragraph(&mut out, &mut paragraph);
            close_list(&mut out, &mut in_list);
            fence_lang = lang.trim().to_string();
            fence = Some(Vec::new());
            continue;
        }
        if trimmed.is_empty() {
            flush_paragraph(&mut out, &mut paragraph);
            close_list(&mut out, &mut in_list);
            continue;
        }
        if let Some(caps) = HEADING_RE.captures(trimmed) {
            flush_paragraph(&mut out, &mut paragraph);
            close_list(&mut out, &mut in_list);
            let level = caps[1].len();
            out.push_str(&format!("<h{level}>{}</h{level}>\n", inline(&caps[2])));
            continue;
        }
        if let Some(caps) = BULLET_RE.captures(line) {
            flush_paragraph(&mut out, &mut paragraph);
            if !in_list {
                out.push_str("<ul>\n");
                in_list = true;
            }
            out.push_str(&format!("<li>{}</li>\n", inline(&caps[1])));
            continue;
        }
        close_list(&mut out, &mut in_list);
        paragraph.push(trimmed.to_string());
    }

    // An unterminated fence still shows its contents.
    if let Some(code) = fence {
        out.push_str(&format!(
            "<pre><code>{}</code></pre>\n",
            escape_html(&code.join("\n"))
        ));
    }
    flush_paragraph(&mut out, &mut paragraph);
    close_list(&mut out, &mut in_list);
    out
}

fn flush_paragraph(out: &mut String, paragraph: &mut Vec<String>) {
    if paragraph.is_empty() {
        return;
    }
    out.push_str(&format!("<p>{}</p>\n", inline(&paragraph.join(" "))));
    paragraph.clear();
}

fn close_list(out: &mut String, in_list: &mut bool) {
    if *in_list {
        out.push_str("</ul>\n");
        *in_list = false;
    }
}

/// Inline markup on already-escaped text. Code spans are protected from
/// emphasis by swapping them out for placeholders first.
fn inline(text: &str) -> String {
    let escaped = escape_html(text);

    let mut spans: Vec<String> = Vec::new();
    let protected = INLINE_CODE_RE.replace_all(&escaped, |caps: &regex::Captures| {
        spans.push(format!("<code>{}</code>", &caps[1]));
        format!("\u{0}{}\u{0}", spans.len() - 1)
    });

    let linked = LINK_RE.replace_all(&protected, r#"<a href="$2">$1</a>"#);
    let bold = BOLD_RE.replace_all(&linked, |caps: &regex::Captures| {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        format!("<strong>{inner}</strong>")
    });
    let italic = ITALIC_RE.replace_all(&bold, |caps: &regex::Captures| {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        format!("<em>{inner}</em>")
    });

    let mut result = italic.into_owned();
    for (i, span) in spans.iter().enumerate() {
        result = result.replace(&format!("\u{0}{i}\u{0}"), span);
    }
    result
}
