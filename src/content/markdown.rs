//! Markdown rendering with callouts, syntax highlighting and link hardening

use indexmap::IndexMap;
use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::{Captures, Regex};
use std::ops::Range;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::frontmatter;
use crate::config::{CalloutStyle, SiteConfig};
use crate::helpers::{html_escape, is_same_site};

/// Excerpt length used when none is configured
pub const DEFAULT_EXCERPT_LENGTH: usize = 160;

/// Callout type used when a block omits `type` or names an unknown one
pub const DEFAULT_CALLOUT_TYPE: &str = "info";

const EXTERNAL_REL: &str = "nofollow noopener noreferrer";

lazy_static! {
    static ref CALLOUT_RE: Regex =
        Regex::new(r#"(?s)<Callout(?:\s+type=["']([^"']*)["'])?\s*>(.*?)</Callout>"#).unwrap();
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"(?:<p>)?CALLOUTPLACEHOLDER(\d+)END(?:</p>)?").unwrap();
    static ref H1_RE: Regex = Regex::new(r"(?s)<h1[^>]*>.*?</h1>\n?").unwrap();
    static ref ANCHOR_RE: Regex =
        Regex::new(r#"<a(\s[^>]*?)?\shref="(https?://[^"]*)"([^>]*)>"#).unwrap();
    static ref CALLOUT_TAG_RE: Regex = Regex::new(r"</?Callout[^>]*>").unwrap();
    static ref HEADING_LINE_RE: Regex = Regex::new(r"(?m)^[ \t]{0,3}#{1,6}(?:[ \t].*)?$").unwrap();
    static ref IMAGE_RE: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref LINK_RE: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref HTML_TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref LINE_MARKER_RE: Regex = Regex::new(r"(?m)^[ \t]*(?:[-*+]|\d+\.|>)[ \t]+").unwrap();
    static ref PUNCTUATION_RE: Regex = Regex::new(r"[*`~#>|\[\]]").unwrap();
    static ref EMPHASIS_UNDERSCORE_RE: Regex = Regex::new(r"\b_+|_+\b").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Callout type -> styling table
#[derive(Debug, Clone, PartialEq)]
pub struct CalloutStyles {
    styles: IndexMap<String, CalloutStyle>,
}

impl CalloutStyles {
    /// The four built-in callout types
    pub fn builtin() -> Self {
        let mut styles = IndexMap::new();
        styles.insert(
            "info".to_string(),
            CalloutStyle::new("border-blue-500 bg-blue-50", "ℹ️"),
        );
        styles.insert(
            "warning".to_string(),
            CalloutStyle::new("border-yellow-500 bg-yellow-50", "⚠️"),
        );
        styles.insert(
            "success".to_string(),
            CalloutStyle::new("border-green-500 bg-green-50", "✅"),
        );
        styles.insert(
            "error".to_string(),
            CalloutStyle::new("border-red-500 bg-red-50", "❌"),
        );
        Self { styles }
    }

    /// Built-in styles with `overrides` replacing or adding entries
    pub fn with_overrides(overrides: &IndexMap<String, CalloutStyle>) -> Self {
        let mut table = Self::builtin();
        for (kind, style) in overrides {
            table.styles.insert(kind.clone(), style.clone());
        }
        table
    }

    /// Resolve a callout type to (type, style), falling back to `info`
    pub fn resolve(&self, kind: Option<&str>) -> (&str, Option<&CalloutStyle>) {
        let requested = kind.map(str::trim).unwrap_or(DEFAULT_CALLOUT_TYPE);
        match self.styles.get_key_value(requested) {
            Some((name, style)) => (name.as_str(), Some(style)),
            None => match self.styles.get_key_value(DEFAULT_CALLOUT_TYPE) {
                Some((name, style)) => (name.as_str(), Some(style)),
                None => (DEFAULT_CALLOUT_TYPE, None),
            },
        }
    }
}

impl Default for CalloutStyles {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Converted body of a content item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub html: String,
    pub excerpt: String,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
    callouts: CalloutStyles,
    /// Base URL whose links are treated as internal
    site_url: Option<String>,
    excerpt_length: usize,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "base16-ocean.dark".to_string(),
            highlight: false,
            line_numbers: false,
            callouts: CalloutStyles::builtin(),
            site_url: None,
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
        }
    }

    /// Create from the site configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.highlight.theme.clone(),
            highlight: config.highlight.enable,
            line_numbers: config.highlight.line_number,
            callouts: CalloutStyles::with_overrides(&config.callouts),
            site_url: Some(config.url.clone()),
            excerpt_length: config.excerpt_length,
        }
    }

    /// Replace the callout table
    pub fn with_callouts(mut self, callouts: CalloutStyles) -> Self {
        self.callouts = callouts;
        self
    }

    /// Treat links to `url`'s host as internal
    pub fn with_site_url(mut self, url: &str) -> Self {
        self.site_url = Some(url.to_string());
        self
    }

    /// Convert a content body into its HTML and plain-text excerpt
    pub fn convert(&self, body: &str) -> Rendered {
        if body.trim().is_empty() {
            return Rendered::default();
        }

        let html = self.render_blocks(body);
        let html = H1_RE.replacen(&html, 1, "").into_owned();
        let html = self.harden_external_links(&html);

        Rendered {
            html,
            excerpt: excerpt(body, self.excerpt_length),
        }
    }

    /// Callout extraction, markdown conversion and placeholder substitution
    fn render_blocks(&self, markdown: &str) -> String {
        let mut blocks: Vec<String> = Vec::new();
        let fences = fenced_ranges(markdown);

        // Callout tags inside fenced code stay literal
        let mut outer = String::with_capacity(markdown.len());
        let mut copied = 0;
        let mut pos = 0;
        while let Some(caps) = CALLOUT_RE.captures_at(markdown, pos) {
            let Some(whole) = caps.get(0) else { break };
            if let Some(fence) = fences.iter().find(|r| r.contains(&whole.start())) {
                pos = fence.end;
                continue;
            }

            let inner = self.render_blocks(caps.get(2).map_or("", |m| m.as_str()).trim());
            let (kind, style) = self.callouts.resolve(caps.get(1).map(|m| m.as_str()));
            blocks.push(callout_html(kind, style, &inner));

            outer.push_str(&markdown[copied..whole.start()]);
            outer.push_str(&format!("\n\nCALLOUTPLACEHOLDER{}END\n\n", blocks.len() - 1));
            copied = whole.end();
            pos = whole.end();
        }
        outer.push_str(&markdown[copied..]);

        let html = self.render(&outer);
        if blocks.is_empty() {
            return html;
        }

        PLACEHOLDER_RE
            .replace_all(&html, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| blocks.get(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Front-matter is split off before rendering, so no metadata blocks here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) if self.highlight => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            Some(lang.split_whitespace().next().unwrap_or("").to_string())
                        }
                        _ => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) if code_block.is_some() => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            html_escape(lang),
            gutter,
            lines.join("\n")
        )
    }

    /// Open off-site links in a new tab without passing referrer or ranking
    fn harden_external_links(&self, html: &str) -> String {
        ANCHOR_RE
            .replace_all(html, |caps: &Captures| {
                let before = caps.get(1).map_or("", |m| m.as_str());
                let href = &caps[2];
                let after = &caps[3];
                let internal = self
                    .site_url
                    .as_deref()
                    .is_some_and(|site| is_same_site(href, site));

                if internal || before.contains("rel=") || after.contains("rel=") {
                    return caps[0].to_string();
                }

                let target = if before.contains("target=") || after.contains("target=") {
                    ""
                } else {
                    r#" target="_blank""#
                };
                format!(
                    r#"<a{} href="{}"{} rel="{}"{}>"#,
                    before, href, after, EXTERNAL_REL, target
                )
            })
            .into_owned()
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte ranges of fenced code blocks, fences included. An unclosed fence
/// runs to the end of the document.
fn fenced_ranges(markdown: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut open: Option<(usize, char, usize)> = None;
    let mut offset = 0;

    for line in markdown.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            continue;
        }
        let fence_char = match trimmed.chars().next() {
            Some(c @ ('`' | '~')) => c,
            _ => continue,
        };
        let run = trimmed.chars().take_while(|&c| c == fence_char).count();
        if run < 3 {
            continue;
        }

        match open {
            None => open = Some((start, fence_char, run)),
            Some((begin, c, len))
                if c == fence_char && run >= len && trimmed[run..].trim().is_empty() =>
            {
                ranges.push(begin..offset);
                open = None;
            }
            Some(_) => {}
        }
    }

    if let Some((begin, _, _)) = open {
        ranges.push(begin..markdown.len());
    }
    ranges
}

fn callout_html(kind: &str, style: Option<&CalloutStyle>, inner: &str) -> String {
    let (class, icon) = style
        .map(|s| (s.class.as_str(), s.icon.as_str()))
        .unwrap_or(("", ""));
    format!(
        r#"<div class="callout callout-{} {}" role="note"><span class="callout-icon" aria-hidden="true">{}</span><div class="callout-content">{}</div></div>"#,
        html_escape(kind),
        class,
        icon,
        inner.trim()
    )
}

/// Plain-text excerpt of a markdown body, at most `max_chars` characters
/// plus `...` when truncated
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let body = match frontmatter::split(body) {
        Some((_, rest)) => rest,
        None => body,
    };

    let text = CALLOUT_TAG_RE.replace_all(body, " ");
    let text = HEADING_LINE_RE.replace_all(&text, "");
    let text = IMAGE_RE.replace_all(&text, "");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = HTML_TAG_RE.replace_all(&text, " ");
    let text = LINE_MARKER_RE.replace_all(&text, "");
    let text = PUNCTUATION_RE.replace_all(&text, "");
    let text = EMPHASIS_UNDERSCORE_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() > max_chars {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
