//! Render-strategy tags and the descriptors handed to the UI.

use serde::{Deserialize, Serialize};

/// Render strategy chosen by the type resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Code,
    Html,
    Mhtml,
    Presentation,
    Spreadsheet,
    Word,
    Markdown,
    Csv,
    Json,
    Text,
    Image,
    Pdf,
    Audio,
    Video,
    Unsupported,
}

impl PreviewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Html => "html",
            Self::Mhtml => "mhtml",
            Self::Presentation => "presentation",
            Self::Spreadsheet => "spreadsheet",
            Self::Word => "word",
            Self::Markdown => "markdown",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Text => "text",
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of widget the UI should use for a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
    Text,
    Code,
    Html,
    Image,
    Pdf,
    Audio,
    Video,
    Spreadsheet,
    Presentation,
    Unsupported,
}

/// Terminal value of a preview request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewDescriptor {
    pub kind: DescriptorKind,
    pub payload: Payload,
}

impl PreviewDescriptor {
    pub fn new(kind: DescriptorKind, payload: Payload) -> Self {
        Self { kind, payload }
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::new(
            DescriptorKind::Unsupported,
            Payload::Unsupported {
                reason: reason.into(),
            },
        )
    }
}

/// Structured render data, one variant per render strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    PlainText {
        text: String,
    },
    Code(HighlightedCode),
    Html {
        html: String,
        /// MHTML tier that produced the HTML, if it came from the MHTML pipeline.
        #[serde(skip_serializing_if = "Option::is_none")]
        tier: Option<String>,
    },
    Table {
        table: Table,
        /// The same table rendered with a `<thead>` header row.
        html: String,
    },
    Sheets {
        sheets: Vec<SheetTable>,
        selected: usize,
    },
    Media {
        mime_type: String,
        size: usize,
        data_url: String,
    },
    /// The host converts this format through its own pipeline.
    Delegated {
        conversion: String,
        file_name: String,
    },
    Unsupported {
        reason: String,
    },
}

/// Highlighted source code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightedCode {
    pub language: String,
    pub lines: Vec<Vec<Token>>,
    pub html: String,
}

/// A classified run of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub class: TokenClass,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Plain,
    Keyword,
    String,
    Comment,
    Number,
}

impl TokenClass {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Plain => "hl-plain",
            Self::Keyword => "hl-keyword",
            Self::String => "hl-string",
            Self::Comment => "hl-comment",
            Self::Number => "hl-number",
        }
    }
}

/// A delimited-text table; row 0 of the source is the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One worksheet rendered as an HTML table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTable {
    pub name: String,
    pub html: String,
}
