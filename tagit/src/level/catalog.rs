//! Built-in levels.
//!
//! Level 1 (blue cards) demonstrates inline text formatting on a fixed
//! sentence. Level 2 (green cards) demonstrates document structure on a
//! small page, highlighting the block the scanned card introduces.

use super::content::{Block, ContentTable, Fragment, Layout};
use super::Level;

const BASE_TEXT: &str = "Hello World!";

const PAGE_TITLE: &str = "My first web page!";
const PAGE_SENTENCE: &str = "This is my first web page and it contains:";
const PAGE_ITEMS: [&str; 3] = ["text", "images", "sounds"];

/// All built-in levels in menu order.
pub fn builtin_levels() -> Vec<Level> {
    vec![level_one(), level_two()]
}

/// Find a built-in level by id (case-insensitive).
pub fn find_level(id: &str) -> Option<Level> {
    builtin_levels()
        .into_iter()
        .find(|l| l.id().eq_ignore_ascii_case(id))
}

/// Level 1: text formatting.
pub fn level_one() -> Level {
    let table = ContentTable::new(Layout::Inline)
        .with_entry("i", "Italic text with <i>…</i>", || phrase("i"))
        .with_entry("b", "Bold text with <b>…</b>", || phrase("b"))
        .with_entry("u", "Underlined text with <u>…</u>", || phrase("u"))
        .with_entry("h1", "Heading with <h1>…</h1>", || {
            Fragment::single(format!("<h1>{}</h1>", BASE_TEXT))
        })
        .with_entry("strong", "Strong importance with <strong>…</strong>", || {
            phrase("strong")
        })
        .with_entry("em", "Emphasis with <em>…</em>", || phrase("em"))
        .with_entry("ins", "Inserted text with <ins>…</ins>", || phrase("ins"))
        .with_entry("sub", "Subscript with <sub>…</sub>", || {
            Fragment::single("<p>H<sub>2</sub>O</p>")
        })
        .with_entry("sup", "Superscript with <sup>…</sup>", || {
            Fragment::single("<p>x<sup>2</sup></p>")
        })
        .with_entry("del", "Deleted text with <del>…</del>", || phrase("del"))
        .with_entry("code", "Inline code with <code>…</code>", || phrase("code"))
        .with_entry("kbd", "Keyboard input with <kbd>…</kbd>", || {
            Fragment::single("<p>Press <kbd>Ctrl</kbd> + <kbd>S</kbd></p>")
        });

    Level::builder("L1", table)
        .title("Level 1")
        .subtitle("Text formatting (blue cards)")
        .asset_path("level-1.mind")
        .slots([
            "i", "b", "u", "h1", "strong", "em", "ins", "sub", "sup", "del", "code", "kbd",
        ])
        .build()
}

/// Level 2: text structure.
pub fn level_two() -> Level {
    let table = ContentTable::new(Layout::Grouped {
        root_class: "l2-root".to_string(),
        focus_class: "l2-focus".to_string(),
    })
    .with_entry("h1", "Page title with <h1>…</h1>", || page(Structure::Heading))
    .with_entry("p", "Paragraph with <p>…</p>", || page(Structure::Paragraph))
    .with_entry("br", "Line break with <br>", || page(Structure::LineBreak))
    .with_entry("hr", "Horizontal rule with <hr>", || page(Structure::Rule))
    .with_entry("ul", "Bulleted list with <ul><li>…</li></ul>", || {
        page(Structure::Unordered)
    })
    .with_entry("ol", "Numbered list with <ol><li>…</li></ol>", || {
        page(Structure::Ordered)
    });

    Level::builder("L2", table)
        .title("Level 2")
        .subtitle("Text structure (green cards)")
        .asset_path("level-2.mind")
        .slots(["h1", "p", "br", "hr", "ul", "ol"])
        .build()
}

fn phrase(tag: &str) -> Fragment {
    Fragment::single(format!("<p><{tag}>{}</{tag}></p>", BASE_TEXT))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Structure {
    Heading,
    Paragraph,
    LineBreak,
    Rule,
    Unordered,
    Ordered,
}

fn page(focus: Structure) -> Fragment {
    let title = if focus == Structure::Heading {
        Block::focus(format!("<h1>{}</h1>", PAGE_TITLE))
    } else {
        Block::plain(PAGE_TITLE)
    };

    let rule = if focus == Structure::Rule {
        Block::focus("<hr>")
    } else {
        Block::plain("")
    };

    if focus == Structure::LineBreak {
        let [first, second, third] = PAGE_ITEMS;
        let sentence = Block::lines(
            [
                format!("{}<br>", PAGE_SENTENCE),
                format!("{}<br>", first),
                format!("{}<br>", second),
                third.to_string(),
            ],
            true,
        );
        return Fragment::new(vec![title, rule, sentence]);
    }

    let sentence = if focus == Structure::Paragraph {
        Block::focus(format!("<p>{}</p>", PAGE_SENTENCE))
    } else {
        Block::plain(PAGE_SENTENCE)
    };

    let list = match focus {
        Structure::Unordered => Block::focus(format!("<ul>{}</ul>", list_items())),
        Structure::Ordered => Block::focus(format!("<ol>{}</ol>", list_items())),
        _ => {
            let [first, second, third] = PAGE_ITEMS;
            Block::plain(format!("{}, {} and {}.", first, second, third))
        }
    };

    Fragment::new(vec![title, rule, sentence, list])
}

fn list_items() -> String {
    PAGE_ITEMS
        .iter()
        .map(|item| format!("<li>{}</li>", item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{escape_html, ContentKey};

    #[test]
    fn test_every_level_one_slot_has_content() {
        let level = level_one();
        assert_eq!(level.marker_count(), 12);
        for slot in level.slots() {
            assert!(
                level.render(&slot.content_key).is_some(),
                "missing template for {}",
                slot.content_key
            );
            assert!(!level.hint(&slot.content_key).is_empty());
        }
    }

    #[test]
    fn test_every_level_two_slot_has_content() {
        let level = level_two();
        assert_eq!(level.marker_count(), 6);
        for slot in level.slots() {
            assert!(level.render(&slot.content_key).is_some());
        }
    }

    #[test]
    fn test_level_one_bold() {
        let content = level_one().render(&ContentKey::new("b")).unwrap();
        assert_eq!(content.html, "<p><b>Hello World!</b></p>");
        assert_eq!(content.source, escape_html("<p><b>Hello World!</b></p>"));
    }

    #[test]
    fn test_level_one_heading_is_not_wrapped_in_paragraph() {
        let content = level_one().render(&ContentKey::new("h1")).unwrap();
        assert_eq!(content.html, "<h1>Hello World!</h1>");
    }

    #[test]
    fn test_level_two_unordered_list() {
        let content = level_two().render(&ContentKey::new("ul")).unwrap();
        assert_eq!(
            content.html,
            "<div class=\"l2-root\">\
             <div>My first web page!</div>\
             <div>This is my first web page and it contains:</div>\
             <div class=\"l2-focus\"><ul><li>text</li><li>images</li><li>sounds</li></ul></div>\
             </div>"
        );
        assert_eq!(
            content.source,
            escape_html(
                "My first web page!\n\
                 This is my first web page and it contains:\n\
                 <ul><li>text</li><li>images</li><li>sounds</li></ul>"
            )
        );
    }

    #[test]
    fn test_level_two_rule_only_present_when_focused() {
        let level = level_two();
        let with_rule = level.render(&ContentKey::new("hr")).unwrap();
        let without_rule = level.render(&ContentKey::new("p")).unwrap();
        assert!(with_rule.html.contains("<div class=\"l2-focus\"><hr></div>"));
        assert!(!without_rule.html.contains("<hr>"));
    }

    #[test]
    fn test_level_two_line_breaks_drop_list() {
        let content = level_two().render(&ContentKey::new("br")).unwrap();
        assert!(content
            .html
            .contains("contains:<br>text<br>images<br>sounds</div>"));
        assert!(!content.html.contains("and sounds."));
        assert!(content.source.contains("contains:&lt;br&gt;\ntext&lt;br&gt;"));
    }

    #[test]
    fn test_find_level_is_case_insensitive() {
        assert_eq!(find_level("l2").unwrap().id(), "L2");
        assert!(find_level("L9").is_none());
    }
}
