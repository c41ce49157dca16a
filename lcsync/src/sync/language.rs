use lcsync_core::Difficulty;

pub const PROBLEM_URL_BASE: &str = "https://leetcode.com/problems";
const PROVENANCE: &str = "Auto-generated by lcsync";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Docstring,
    Block,
    Hash,
    DoubleDash,
}

struct LanguageEntry {
    name: &'static str,
    extension: &'static str,
    style: CommentStyle,
}

const LANGUAGES: &[LanguageEntry] = &[
    entry("python", "py", CommentStyle::Docstring),
    entry("python3", "py", CommentStyle::Docstring),
    entry("javascript", "js", CommentStyle::Block),
    entry("typescript", "ts", CommentStyle::Block),
    entry("java", "java", CommentStyle::Block),
    entry("cpp", "cpp", CommentStyle::Block),
    entry("c", "c", CommentStyle::Block),
    entry("csharp", "cs", CommentStyle::Block),
    entry("golang", "go", CommentStyle::Block),
    entry("rust", "rs", CommentStyle::Block),
    entry("kotlin", "kt", CommentStyle::Block),
    entry("swift", "swift", CommentStyle::Block),
    entry("scala", "scala", CommentStyle::Block),
    entry("php", "php", CommentStyle::Block),
    entry("ruby", "rb", CommentStyle::Hash),
    entry("mysql", "sql", CommentStyle::DoubleDash),
    entry("mssql", "sql", CommentStyle::DoubleDash),
    entry("oraclesql", "sql", CommentStyle::DoubleDash),
];

const fn entry(name: &'static str, extension: &'static str, style: CommentStyle) -> LanguageEntry {
    LanguageEntry {
        name,
        extension,
        style,
    }
}

fn lookup(lang: &str) -> Option<&'static LanguageEntry> {
    let lang = lang.trim();
    LANGUAGES
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(lang))
}

/// File extension (without the dot) for a submission language.
pub fn extension_for(lang: &str) -> Option<&'static str> {
    lookup(lang).map(|entry| entry.extension)
}

pub fn comment_style_for(lang: &str) -> Option<CommentStyle> {
    lookup(lang).map(|entry| entry.style)
}

pub fn is_known_extension(extension: &str) -> bool {
    LANGUAGES
        .iter()
        .any(|entry| entry.extension.eq_ignore_ascii_case(extension))
}

pub fn problem_url(title_slug: &str) -> String {
    format!("{PROBLEM_URL_BASE}/{title_slug}/")
}

pub struct HeaderFields<'a> {
    pub title: &'a str,
    pub title_slug: &'a str,
    pub difficulty: Difficulty,
    pub language: &'a str,
}

pub fn render_header(style: CommentStyle, fields: &HeaderFields<'_>) -> String {
    let lines = [
        format!("LeetCode Problem: {}", fields.title),
        format!("Difficulty: {}", fields.difficulty.label()),
        format!("Language: {}", fields.language),
        format!("Link: {}", problem_url(fields.title_slug)),
        String::new(),
        PROVENANCE.to_string(),
    ]
    .map(|line| neutralise(style, &line));

    match style {
        CommentStyle::Docstring => format!("\"\"\"\n{}\n\"\"\"", lines.join("\n")),
        CommentStyle::Block => {
            let body = lines
                .iter()
                .map(|line| {
                    if line.is_empty() {
                        " *".to_string()
                    } else {
                        format!(" * {line}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!("/**\n{body}\n */")
        }
        CommentStyle::Hash => prefixed(&lines, "#"),
        CommentStyle::DoubleDash => prefixed(&lines, "--"),
    }
}

/// Remote text must not be able to end the comment early.
fn neutralise(style: CommentStyle, line: &str) -> String {
    let line = line.replace(['\r', '\n'], " ");
    match style {
        CommentStyle::Docstring => line.replace("\"\"\"", "\\\"\\\"\\\""),
        CommentStyle::Block => line.replace("*/", "* /").replace("/*", "/ *"),
        CommentStyle::Hash | CommentStyle::DoubleDash => line,
    }
}

fn prefixed(lines: &[String], marker: &str) -> String {
    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                marker.to_string()
            } else {
                format!("{marker} {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
