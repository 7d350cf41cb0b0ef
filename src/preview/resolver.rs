//! Map (file name, declared content type) to a render strategy.
//!
//! A file can satisfy several predicates (`.json` served as `text/plain`), so
//! the rules are an ordered table evaluated first-match-wins.

use super::render::code::language_for_extension;
use crate::model::preview::PreviewKind;

/// Lowercased facts the predicates inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFacts {
    /// Extension without the dot, lowercased; empty when there is none.
    pub extension: String,
    /// Media type without parameters, lowercased; empty when not declared.
    pub content_type: String,
}

impl FileFacts {
    pub fn new(file_name: &str, content_type: Option<&str>) -> Self {
        let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
        let extension = match base.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.trim().to_ascii_lowercase(),
            _ => String::new(),
        };
        let content_type = content_type
            .and_then(|ct| ct.split(';').next())
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        Self {
            extension,
            content_type,
        }
    }

    fn ext_in(&self, set: &[&str]) -> bool {
        set.contains(&self.extension.as_str())
    }

    fn ct_is(&self, set: &[&str]) -> bool {
        set.contains(&self.content_type.as_str())
    }

    fn ct_prefix(&self, prefix: &str) -> bool {
        self.content_type.starts_with(prefix)
    }
}

/// One entry of the precedence table.
pub struct Rule {
    pub kind: PreviewKind,
    pub name: &'static str,
    pub matches: fn(&FileFacts) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "ico"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv", "ogv"];

/// Precedence order; the first matching rule wins.
pub static RULES: &[Rule] = &[
    Rule {
        kind: PreviewKind::Code,
        name: "code-extension",
        matches: |f| language_for_extension(&f.extension).is_some(),
    },
    Rule {
        kind: PreviewKind::Html,
        name: "html",
        matches: |f| f.ext_in(&["html", "htm"]),
    },
    Rule {
        kind: PreviewKind::Mhtml,
        name: "mhtml",
        matches: |f| {
            f.ext_in(&["mhtml", "mht"]) || f.ct_is(&["multipart/related", "message/rfc822"])
        },
    },
    Rule {
        kind: PreviewKind::Presentation,
        name: "presentation",
        matches: |f| f.ext_in(&["ppt", "pptx"]),
    },
    Rule {
        kind: PreviewKind::Spreadsheet,
        name: "spreadsheet",
        matches: |f| f.ext_in(&["xls", "xlsx", "xlsm", "ods"]),
    },
    Rule {
        kind: PreviewKind::Word,
        name: "word",
        matches: |f| f.ext_in(&["doc", "docx"]),
    },
    Rule {
        kind: PreviewKind::Markdown,
        name: "markdown-extension",
        matches: |f| f.ext_in(&["md", "markdown"]),
    },
    Rule {
        kind: PreviewKind::Csv,
        name: "csv-extension",
        matches: |f| f.ext_in(&["csv", "tsv"]),
    },
    Rule {
        kind: PreviewKind::Json,
        name: "json-extension",
        matches: |f| f.ext_in(&["json"]),
    },
    Rule {
        kind: PreviewKind::Text,
        name: "text-extension",
        matches: |f| f.ext_in(&["txt", "log"]),
    },
    Rule {
        kind: PreviewKind::Markdown,
        name: "markdown-type",
        matches: |f| f.ct_is(&["text/markdown", "text/x-markdown"]),
    },
    Rule {
        kind: PreviewKind::Csv,
        name: "csv-type",
        matches: |f| f.ct_is(&["text/csv", "text/tab-separated-values"]),
    },
    Rule {
        kind: PreviewKind::Json,
        name: "json-type",
        matches: |f| f.ct_is(&["application/json"]),
    },
    Rule {
        kind: PreviewKind::Html,
        name: "html-type",
        matches: |f| f.ct_is(&["text/html"]),
    },
    Rule {
        kind: PreviewKind::Text,
        name: "text-type",
        matches: |f| f.ct_prefix("text/"),
    },
    Rule {
        kind: PreviewKind::Image,
        name: "image",
        matches: |f| f.ct_prefix("image/") || f.ext_in(IMAGE_EXTENSIONS),
    },
    Rule {
        kind: PreviewKind::Pdf,
        name: "pdf",
        matches: |f| f.ext_in(&["pdf"]) || f.ct_is(&["application/pdf"]),
    },
    Rule {
        kind: PreviewKind::Audio,
        name: "audio",
        matches: |f| f.ct_prefix("audio/") || f.ext_in(AUDIO_EXTENSIONS),
    },
    Rule {
        kind: PreviewKind::Video,
        name: "video",
        matches: |f| f.ct_prefix("video/") || f.ext_in(VIDEO_EXTENSIONS),
    },
];

/// Resolve the render strategy for a file.
pub fn resolve_preview_kind(file_name: &str, content_type: Option<&str>) -> PreviewKind {
    matching_rule(&FileFacts::new(file_name, content_type))
        .map(|rule| rule.kind)
        .unwrap_or(PreviewKind::Unsupported)
}

/// The first rule matching `facts`, if any.
pub fn matching_rule(facts: &FileFacts) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.matches)(facts))
}

/// Best-effort MIME type for media payloads when none was declared.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    Some(match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "ogv" => "video/ogg",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mhtml_case_insensitive() {
        assert_eq!(resolve_preview_kind("report.MHTML", None), PreviewKind::Mhtml);
        assert_eq!(resolve_preview_kind("saved.mht", None), PreviewKind::Mhtml);
        assert_eq!(
            resolve_preview_kind("blob", Some("multipart/related; boundary=x")),
            PreviewKind::Mhtml
        );
    }

    #[test]
    fn test_extension_beats_generic_content_type() {
        assert_eq!(resolve_preview_kind("data.json", Some("text/plain")), PreviewKind::Json);
        assert_eq!(resolve_preview_kind("notes.md", Some("text/plain")), PreviewKind::Markdown);
        assert_eq!(resolve_preview_kind("t.csv", Some("text/plain")), PreviewKind::Csv);
    }

    #[test]
    fn test_code_first() {
        assert_eq!(resolve_preview_kind("main.rs", Some("text/plain")), PreviewKind::Code);
        assert_eq!(resolve_preview_kind("dir/app.PY", None), PreviewKind::Code);
    }

    #[test]
    fn test_office_formats() {
        assert_eq!(resolve_preview_kind("deck.pptx", None), PreviewKind::Presentation);
        assert_eq!(resolve_preview_kind("book.XLSX", None), PreviewKind::Spreadsheet);
        assert_eq!(resolve_preview_kind("letter.docx", None), PreviewKind::Word);
    }

    #[test]
    fn test_content_type_only() {
        assert_eq!(resolve_preview_kind("blob", Some("text/html")), PreviewKind::Html);
        assert_eq!(resolve_preview_kind("blob", Some("TEXT/PLAIN; charset=gbk")), PreviewKind::Text);
        assert_eq!(resolve_preview_kind("blob", Some("application/json")), PreviewKind::Json);
        assert_eq!(resolve_preview_kind("blob", Some("image/png")), PreviewKind::Image);
        assert_eq!(resolve_preview_kind("blob", Some("audio/mpeg")), PreviewKind::Audio);
        assert_eq!(resolve_preview_kind("blob", Some("video/mp4")), PreviewKind::Video);
        assert_eq!(resolve_preview_kind("blob", Some("application/pdf")), PreviewKind::Pdf);
    }

    #[test]
    fn test_html_content_type_does_not_override_extension() {
        assert_eq!(resolve_preview_kind("report.mhtml", Some("text/html")), PreviewKind::Mhtml);
        assert_eq!(resolve_preview_kind("data.json", Some("text/html")), PreviewKind::Json);
        assert_eq!(resolve_preview_kind("book.xlsx", Some("text/html")), PreviewKind::Spreadsheet);
        assert_eq!(resolve_preview_kind("notes.txt", Some("text/html")), PreviewKind::Text);
        assert_eq!(resolve_preview_kind("page", Some("text/html; charset=gbk")), PreviewKind::Html);
        let facts = FileFacts::new("page", Some("text/html"));
        assert_eq!(matching_rule(&facts).map(|r| r.name), Some("html-type"));
    }

    #[test]
    fn test_media_extensions() {
        assert_eq!(resolve_preview_kind("a.JPG", None), PreviewKind::Image);
        assert_eq!(resolve_preview_kind("a.pdf", Some("application/octet-stream")), PreviewKind::Pdf);
        assert_eq!(resolve_preview_kind("a.flac", None), PreviewKind::Audio);
        assert_eq!(resolve_preview_kind("a.mkv", None), PreviewKind::Video);
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(resolve_preview_kind("archive.zip", None), PreviewKind::Unsupported);
        assert_eq!(resolve_preview_kind("", None), PreviewKind::Unsupported);
        assert_eq!(resolve_preview_kind(".bashrc", None), PreviewKind::Unsupported);
    }

    #[test]
    fn test_rule_order_is_explicit() {
        let facts = FileFacts::new("page.html", Some("text/plain"));
        assert_eq!(matching_rule(&facts).map(|r| r.name), Some("html"));
        let position = |name: &str| RULES.iter().position(|r| r.name == name);
        assert!(position("code-extension") < position("html"));
        assert!(position("json-extension") < position("text-type"));
        assert!(position("text-extension") < position("html-type"));
        assert!(position("html-type") < position("text-type"));
        assert!(position("video") == Some(RULES.len() - 1));
    }

    #[test]
    fn test_file_facts() {
        let facts = FileFacts::new("C:\\tmp\\Report.Final.CSV", Some(" Text/CSV ; charset=utf-8"));
        assert_eq!(facts.extension, "csv");
        assert_eq!(facts.content_type, "text/csv");
    }
}
