//! Content templates and the marker -> content dispatch table.
//!
//! Each content key has exactly one template producing a [`Fragment`]. Both
//! the rendered view and the literal source view are derived from that
//! fragment by the table's [`Layout`], so the two can never disagree about
//! which markup a card demonstrates.

use std::collections::BTreeMap;
use std::fmt;

/// Semantic tag a marker slot maps to (e.g. `"b"`, `"h1"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentKey(String);

impl ContentKey {
    /// Create a content key from a tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The bare tag name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label shown when the key is detected, e.g. `<b>`.
    pub fn tag_label(&self) -> String {
        format!("<{}>", self.0)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentKey {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Escape text for literal display inside HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// One logical block of a content fragment.
///
/// Lines are concatenated in the rendered view and placed on separate lines
/// in the source view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    lines: Vec<String>,
    focus: bool,
}

impl Block {
    /// A single-line block.
    pub fn plain(markup: impl Into<String>) -> Self {
        Self {
            lines: vec![markup.into()],
            focus: false,
        }
    }

    /// A single-line block highlighted as the subject of the card.
    pub fn focus(markup: impl Into<String>) -> Self {
        Self {
            lines: vec![markup.into()],
            focus: true,
        }
    }

    /// A multi-line block.
    pub fn lines<I, S>(lines: I, focus: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            focus,
        }
    }

    fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    fn rendered(&self) -> String {
        self.lines.concat()
    }

    fn source(&self) -> String {
        self.lines.join("\n")
    }
}

/// Canonical output of a content template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    blocks: Vec<Block>,
}

impl Fragment {
    /// Create a fragment from blocks. Empty blocks are dropped.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks: blocks.into_iter().filter(|b| !b.is_empty()).collect(),
        }
    }

    /// A fragment holding a single plain block.
    pub fn single(markup: impl Into<String>) -> Self {
        Self::new(vec![Block::plain(markup)])
    }

    /// The blocks of this fragment.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

/// How a level lays fragments out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Blocks are concatenated as-is in both views.
    Inline,
    /// The rendered view wraps every block in a `<div>` (focus blocks carry
    /// `focus_class`) inside a root `<div class="root_class">`; the source
    /// view lists the bare blocks one per line.
    Grouped {
        root_class: String,
        focus_class: String,
    },
}

impl Layout {
    fn render(&self, fragment: &Fragment) -> String {
        match self {
            Layout::Inline => fragment.blocks.iter().map(Block::rendered).collect(),
            Layout::Grouped {
                root_class,
                focus_class,
            } => {
                let mut html = format!("<div class=\"{}\">", root_class);
                for block in &fragment.blocks {
                    if block.focus {
                        html.push_str(&format!(
                            "<div class=\"{}\">{}</div>",
                            focus_class,
                            block.rendered()
                        ));
                    } else {
                        html.push_str(&format!("<div>{}</div>", block.rendered()));
                    }
                }
                html.push_str("</div>");
                html
            }
        }
    }

    fn source(&self, fragment: &Fragment) -> String {
        let separator = match self {
            Layout::Inline => "",
            Layout::Grouped { .. } => "\n",
        };
        fragment
            .blocks
            .iter()
            .map(Block::source)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Both representations handed to the presentation adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    /// Markup to render.
    pub html: String,
    /// Escaped markup for literal display.
    pub source: String,
}

impl RenderedContent {
    /// Build from rendered markup and unescaped source text.
    pub fn new(html: impl Into<String>, raw_source: &str) -> Self {
        Self {
            html: html.into(),
            source: escape_html(raw_source),
        }
    }
}

/// Content template function.
pub type TemplateFn = fn() -> Fragment;

/// A dispatch table entry.
#[derive(Debug, Clone)]
pub struct ContentEntry {
    hint: String,
    template: TemplateFn,
}

/// Dispatch table from content key to template.
#[derive(Debug, Clone)]
pub struct ContentTable {
    layout: Layout,
    entries: BTreeMap<ContentKey, ContentEntry>,
}

impl ContentTable {
    /// Create an empty table with the given layout.
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            entries: BTreeMap::new(),
        }
    }

    /// Add (or replace) the template for a key.
    pub fn with_entry(
        mut self,
        key: impl Into<ContentKey>,
        hint: impl Into<String>,
        template: TemplateFn,
    ) -> Self {
        self.entries.insert(
            key.into(),
            ContentEntry {
                hint: hint.into(),
                template,
            },
        );
        self
    }

    /// Render both views for a key, `None` if the key has no template.
    pub fn render(&self, key: &ContentKey) -> Option<RenderedContent> {
        let entry = self.entries.get(key)?;
        let fragment = (entry.template)();
        Some(RenderedContent::new(
            self.layout.render(&fragment),
            &self.layout.source(&fragment),
        ))
    }

    /// Teaching hint for a key.
    pub fn hint(&self, key: &ContentKey) -> Option<&str> {
        self.entries.get(key).map(|e| e.hint.as_str())
    }

    /// The table's layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped() -> Layout {
        Layout::Grouped {
            root_class: "root".to_string(),
            focus_class: "focus".to_string(),
        }
    }

    fn two_blocks() -> Fragment {
        Fragment::new(vec![
            Block::plain("Title"),
            Block::plain(""),
            Block::focus("<p>Body</p>"),
        ])
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_tag_label() {
        assert_eq!(ContentKey::new("strong").tag_label(), "<strong>");
    }

    #[test]
    fn test_fragment_drops_empty_blocks() {
        assert_eq!(two_blocks().blocks().len(), 2);
    }

    #[test]
    fn test_grouped_layout_views() {
        let table = ContentTable::new(grouped()).with_entry("p", "Paragraph", two_blocks);
        let content = table.render(&ContentKey::new("p")).unwrap();

        assert_eq!(
            content.html,
            "<div class=\"root\"><div>Title</div><div class=\"focus\"><p>Body</p></div></div>"
        );
        assert_eq!(content.source, escape_html("Title\n<p>Body</p>"));
    }

    #[test]
    fn test_multiline_block() {
        fn breaks() -> Fragment {
            Fragment::new(vec![Block::lines(["a<br>", "b"], true)])
        }
        let table = ContentTable::new(grouped()).with_entry("br", "Line break", breaks);
        let content = table.render(&ContentKey::new("br")).unwrap();

        assert!(content.html.contains("a<br>b"));
        assert_eq!(content.source, escape_html("a<br>\nb"));
    }

    #[test]
    fn test_missing_key_renders_nothing() {
        let table = ContentTable::new(Layout::Inline);
        assert!(table.render(&ContentKey::new("blink")).is_none());
        assert!(table.hint(&ContentKey::new("blink")).is_none());
    }
}
