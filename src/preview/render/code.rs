//! Source code highlighting on top of syntect's bundled grammars.
//!
//! Syntect parses each line into a scope stack; the innermost scope that
//! names a comment, string, number or keyword decides the token class.

use std::sync::LazyLock;

use syntect::parsing::{
    ParseState, ParsingError, Scope, ScopeError, ScopeStack, SyntaxReference, SyntaxSet,
};
use syntect::util::LinesWithEndings;
use tracing::warn;

use crate::model::preview::{HighlightedCode, Token, TokenClass};

use super::escape_html;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Scope prefixes mapped to token classes, checked per scope from innermost out.
#[allow(clippy::expect_used)]
static SCOPE_CLASSES: LazyLock<Vec<(Scope, TokenClass)>> = LazyLock::new(|| {
    [
        ("comment", TokenClass::Comment),
        ("string", TokenClass::String),
        ("constant.numeric", TokenClass::Number),
        ("keyword", TokenClass::Keyword),
        ("storage", TokenClass::Keyword),
    ]
    .into_iter()
    .map(|(name, class)| (Scope::new(name).expect("valid scope"), class))
    .collect()
});

/// A code language: the name reported to callers and the syntect lookup token.
#[derive(Debug)]
pub struct Language {
    pub name: &'static str,
    token: &'static str,
}

/// Verbatim language for unknown extensions.
pub static TEXT: Language = Language {
    name: "text",
    token: "txt",
};

pub static JSON: Language = Language {
    name: "json",
    token: "json",
};

static RUST: Language = Language { name: "rust", token: "rs" };
static PYTHON: Language = Language { name: "python", token: "py" };
static JAVASCRIPT: Language = Language { name: "javascript", token: "js" };
// No bundled TypeScript or Kotlin grammar; the closest relatives stand in.
static TYPESCRIPT: Language = Language { name: "typescript", token: "js" };
static KOTLIN: Language = Language { name: "kotlin", token: "java" };
static JAVA: Language = Language { name: "java", token: "java" };
static C: Language = Language { name: "c", token: "c" };
static CPP: Language = Language { name: "cpp", token: "cpp" };
static CSHARP: Language = Language { name: "csharp", token: "cs" };
static GO: Language = Language { name: "go", token: "go" };
static RUBY: Language = Language { name: "ruby", token: "rb" };
static PHP: Language = Language { name: "php", token: "php" };
static SWIFT: Language = Language { name: "swift", token: "swift" };
static SHELL: Language = Language { name: "bash", token: "sh" };
static SQL: Language = Language { name: "sql", token: "sql" };
static YAML: Language = Language { name: "yaml", token: "yaml" };
static TOML: Language = Language { name: "toml", token: "toml" };
static XML: Language = Language { name: "xml", token: "xml" };
static CSS: Language = Language { name: "css", token: "css" };

/// Language for a lowercased file extension, if it is a known code language.
pub fn language_for_extension(extension: &str) -> Option<&'static Language> {
    Some(match extension {
        "rs" => &RUST,
        "py" | "pyw" => &PYTHON,
        "js" | "mjs" | "cjs" | "jsx" => &JAVASCRIPT,
        "ts" | "tsx" => &TYPESCRIPT,
        "java" => &JAVA,
        "kt" | "kts" => &KOTLIN,
        "c" | "h" => &C,
        "cpp" | "cc" | "cxx" | "hpp" => &CPP,
        "cs" => &CSHARP,
        "go" => &GO,
        "rb" => &RUBY,
        "php" => &PHP,
        "swift" => &SWIFT,
        "sh" | "bash" | "zsh" => &SHELL,
        "sql" => &SQL,
        "yaml" | "yml" => &YAML,
        "toml" => &TOML,
        "xml" => &XML,
        "css" | "scss" | "less" => &CSS,
        _ => return None,
    })
}

impl Language {
    /// Syntect grammar for this language; plain text when none is bundled.
    fn syntax(&self) -> &'static SyntaxReference {
        let set: &'static SyntaxSet = &SYNTAXES;
        set.find_syntax_by_token(self.token)
            .or_else(|| set.find_syntax_by_extension(self.token))
            .unwrap_or_else(|| set.find_syntax_plain_text())
    }
}

#[derive(Debug, thiserror::Error)]
enum HighlightError {
    #[error(transparent)]
    Parse(#[from] ParsingError),
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

/// Highlight `source` using the language for `extension` (verbatim text when unknown).
pub fn highlight(source: &str, extension: &str) -> HighlightedCode {
    highlight_with(source, language_for_extension(extension).unwrap_or(&TEXT))
}

pub fn highlight_with(source: &str, language: &Language) -> HighlightedCode {
    let lines = tokenize(source, language.syntax()).unwrap_or_else(|e| {
        warn!(language = language.name, error = %e, "Highlighting failed, showing plain text");
        source
            .lines()
            .map(|line| {
                let mut tokens = Vec::new();
                push(&mut tokens, TokenClass::Plain, line);
                tokens
            })
            .collect()
    });
    let html = render_html(&lines);
    HighlightedCode {
        language: language.name.to_string(),
        lines,
        html,
    }
}

/// Split `source` into classified tokens, one vector per line without its line ending.
fn tokenize(
    source: &str,
    syntax: &SyntaxReference,
) -> Result<Vec<Vec<Token>>, HighlightError> {
    let mut state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut lines = Vec::new();

    for line in LinesWithEndings::from(source) {
        let ops = state.parse_line(line, &SYNTAXES)?;
        let body = line.trim_end_matches(['\n', '\r']);
        let mut tokens = Vec::new();
        let mut start = 0;
        for (pos, op) in &ops {
            let end = (*pos).min(body.len());
            if end > start {
                push(&mut tokens, classify(&stack), &body[start..end]);
                start = end;
            }
            stack.apply(op)?;
        }
        if start < body.len() {
            push(&mut tokens, classify(&stack), &body[start..]);
        }
        lines.push(tokens);
    }
    Ok(lines)
}

fn classify(stack: &ScopeStack) -> TokenClass {
    for scope in stack.as_slice().iter().rev() {
        if let Some((_, class)) = SCOPE_CLASSES
            .iter()
            .find(|(prefix, _)| prefix.is_prefix_of(*scope))
        {
            return *class;
        }
    }
    TokenClass::Plain
}

/// Append text, merging with the previous token when the class matches.
fn push(tokens: &mut Vec<Token>, class: TokenClass, text: &str) {
    match tokens.last_mut() {
        Some(last) if last.class == class => last.text.push_str(text),
        _ => tokens.push(Token {
            class,
            text: text.to_string(),
        }),
    }
}

fn render_html(lines: &[Vec<Token>]) -> String {
    let mut html = String::from("<pre class=\"code\"><code>");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            html.push('\n');
        }
        for token in line {
            if token.class == TokenClass::Plain {
                html.push_str(&escape_html(&token.text));
            } else {
                html.push_str(&format!(
                    "<span class=\"{}\">{}</span>",
                    token.class.css_class(),
                    escape_html(&token.text)
                ));
            }
        }
    }
    html.push_str("</code></pre>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn find(tokens: &[Token], class: TokenClass) -> Vec<&str> {
        tokens
            .iter()
            .filter(|t| t.class == class)
            .map(|t| t.text.as_str())
            .collect()
    }

    #[test]
    fn test_language_table() {
        assert_eq!(language_for_extension("rs").map(|l| l.name), Some("rust"));
        assert_eq!(language_for_extension("tsx").map(|l| l.name), Some("typescript"));
        assert_eq!(language_for_extension("yml").map(|l| l.name), Some("yaml"));
        assert!(language_for_extension("json").is_none());
        assert!(language_for_extension("html").is_none());
        assert!(language_for_extension("").is_none());
    }

    #[test]
    fn test_bundled_grammars_resolve() {
        for ext in ["rs", "py", "js", "java", "c", "cpp", "cs", "go", "rb", "sql", "yaml", "css"] {
            let language = language_for_extension(ext).unwrap();
            assert_ne!(language.syntax().name, "Plain Text", "{ext}");
        }
        assert_eq!(TEXT.syntax().name, "Plain Text");
    }

    #[test]
    fn test_rust_line() {
        let code = highlight("let x = \"hi\"; // note", "rs");
        assert_eq!(code.language, "rust");
        let line = &code.lines[0];
        assert_eq!(text_of(line), "let x = \"hi\"; // note");
        assert_eq!(line[0].class, TokenClass::Keyword);
        assert_eq!(line[0].text, "let");
        assert_eq!(find(line, TokenClass::String), vec!["\"hi\""]);
        assert_eq!(find(line, TokenClass::Comment), vec!["// note"]);
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let code = highlight("/* a\nb */ int y = 42;", "c");
        assert_eq!(code.lines.len(), 2);
        assert_eq!(find(&code.lines[0], TokenClass::Comment), vec!["/* a"]);
        assert_eq!(code.lines[1][0].class, TokenClass::Comment);
        assert_eq!(code.lines[1][0].text, "b */");
        assert!(find(&code.lines[1], TokenClass::Number).contains(&"42"));
    }

    #[test]
    fn test_line_endings_stripped() {
        let code = highlight("x = 1\r\ny = 2\n", "py");
        assert_eq!(code.lines.len(), 2);
        assert_eq!(text_of(&code.lines[0]), "x = 1");
        assert_eq!(text_of(&code.lines[1]), "y = 2");
    }

    #[test]
    fn test_unknown_extension_is_verbatim() {
        let source = "fn main() { \"x\" } // 1";
        let code = highlight(source, "weird");
        assert_eq!(code.language, "text");
        assert_eq!(code.lines[0].len(), 1);
        assert_eq!(code.lines[0][0].class, TokenClass::Plain);
        assert_eq!(code.lines[0][0].text, source);
    }

    #[test]
    fn test_html_is_escaped() {
        let code = highlight("if a < b { \"<x>\" }", "rs");
        assert!(code.html.contains("<span class=\"hl-keyword\">if</span>"));
        assert!(code.html.contains("&lt;"));
        assert!(code.html.contains("&quot;&lt;x&gt;&quot;</span>"));
        assert!(!code.html.contains("<x>"));
        assert!(code.html.starts_with("<pre class=\"code\"><code>"));
    }
}
