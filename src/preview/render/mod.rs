//! Format renderers: decoded text or raw bytes in, [`PreviewDescriptor`] out.

pub mod code;
pub mod json;
pub mod markdown;
pub mod spreadsheet;
pub mod table;

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{debug, warn};

use crate::charset::decode_text;
use crate::model::document::ByteBuffer;
use crate::model::preview::{DescriptorKind, Payload, PreviewDescriptor, PreviewKind};
use crate::parser::header::charset_param;
use crate::parser::mhtml::{decode_mhtml_with, ensure_wrapper, MhtmlOptions};

use super::resolver::{mime_for_extension, FileFacts};

/// A file ready to be rendered.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub file_name: &'a str,
    pub buffer: ByteBuffer<'a>,
}

impl<'a> RenderInput<'a> {
    pub fn new(file_name: &'a str, bytes: &'a [u8], content_type: Option<&'a str>) -> Self {
        Self {
            file_name,
            buffer: ByteBuffer::new(bytes, content_type),
        }
    }

    fn facts(&self) -> FileFacts {
        FileFacts::new(self.file_name, self.buffer.content_type)
    }

    /// Bytes decoded to text, honouring a declared `charset=`.
    fn text(&self) -> String {
        let declared = self.buffer.content_type.and_then(charset_param);
        decode_text(self.buffer.bytes, declared.as_deref())
    }
}

/// Knobs that change what the renderers produce.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub mhtml: MhtmlOptions,
    /// Sheet shown first for workbooks.
    pub default_sheet: usize,
    /// Row limit for tables (0 = unlimited).
    pub max_table_rows: usize,
}

/// Render with default options.
pub fn render(kind: PreviewKind, input: &RenderInput<'_>) -> PreviewDescriptor {
    render_with(kind, input, &RenderOptions::default())
}

/// Dispatch on the resolved kind. Never fails; unreadable input degrades to
/// an `Unsupported` descriptor.
pub fn render_with(
    kind: PreviewKind,
    input: &RenderInput<'_>,
    options: &RenderOptions,
) -> PreviewDescriptor {
    debug!(
        file = input.file_name,
        kind = %kind,
        size = input.buffer.bytes.len(),
        "Rendering preview"
    );
    match kind {
        PreviewKind::Code => {
            let highlighted = code::highlight(&input.text(), &input.facts().extension);
            PreviewDescriptor::new(DescriptorKind::Code, Payload::Code(highlighted))
        }
        PreviewKind::Html => html(ensure_wrapper(&input.text()), None),
        PreviewKind::Mhtml => {
            let outcome =
                decode_mhtml_with(input.buffer.bytes, input.buffer.content_type, &options.mhtml);
            let tier = outcome.tier().to_string();
            html(outcome.into_html(), Some(tier))
        }
        PreviewKind::Markdown => html(markdown::markdown_to_html(&input.text()), None),
        PreviewKind::Csv => {
            let delimiter = table::delimiter_for(&input.facts().extension);
            let parsed = table::parse_delimited(&input.text(), delimiter, options.max_table_rows);
            let html = table::table_to_html(&parsed);
            PreviewDescriptor::new(
                DescriptorKind::Spreadsheet,
                Payload::Table {
                    table: parsed,
                    html,
                },
            )
        }
        PreviewKind::Json => {
            let highlighted = code::highlight_with(&json::pretty_json(&input.text()), &code::JSON);
            PreviewDescriptor::new(DescriptorKind::Code, Payload::Code(highlighted))
        }
        PreviewKind::Text => PreviewDescriptor::new(
            DescriptorKind::Text,
            Payload::PlainText { text: input.text() },
        ),
        PreviewKind::Spreadsheet => {
            match spreadsheet::render_workbook(
                input.buffer.bytes,
                options.default_sheet,
                options.max_table_rows,
            ) {
                Ok(workbook) => PreviewDescriptor::new(
                    DescriptorKind::Spreadsheet,
                    Payload::Sheets {
                        sheets: workbook.sheets,
                        selected: workbook.selected,
                    },
                ),
                Err(e) => {
                    warn!(file = input.file_name, error = %e, "Could not open workbook");
                    PreviewDescriptor::unsupported(format!("unreadable workbook: {e}"))
                }
            }
        }
        PreviewKind::Image => media(DescriptorKind::Image, input),
        PreviewKind::Pdf => media(DescriptorKind::Pdf, input),
        PreviewKind::Audio => media(DescriptorKind::Audio, input),
        PreviewKind::Video => media(DescriptorKind::Video, input),
        PreviewKind::Word => delegated(DescriptorKind::Html, "word-to-html", input),
        PreviewKind::Presentation => {
            delegated(DescriptorKind::Presentation, "presentation-to-slides", input)
        }
        PreviewKind::Unsupported => PreviewDescriptor::unsupported(format!(
            "no preview available for {}",
            input.file_name
        )),
    }
}

fn html(html: String, tier: Option<String>) -> PreviewDescriptor {
    PreviewDescriptor::new(DescriptorKind::Html, Payload::Html { html, tier })
}

fn media(kind: DescriptorKind, input: &RenderInput<'_>) -> PreviewDescriptor {
    let facts = input.facts();
    let mime_type = if facts.content_type.is_empty()
        || facts.content_type == "application/octet-stream"
    {
        mime_for_extension(&facts.extension)
            .unwrap_or("application/octet-stream")
            .to_string()
    } else {
        facts.content_type
    };
    let data_url = format!("data:{mime_type};base64,{}", STANDARD.encode(input.buffer.bytes));
    PreviewDescriptor::new(
        kind,
        Payload::Media {
            mime_type,
            size: input.buffer.bytes.len(),
            data_url,
        },
    )
}

fn delegated(kind: DescriptorKind, conversion: &str, input: &RenderInput<'_>) -> PreviewDescriptor {
    PreviewDescriptor::new(
        kind,
        Payload::Delegated {
            conversion: conversion.to_string(),
            file_name: input.file_name.to_string(),
        },
    )
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
