//! Levels: marker slots, content tables and default content.
//!
//! A [`Level`] is read-only configuration selected by navigation. It bundles
//! the slot -> content key mapping assigned by the tracking engine, the
//! content templates and the reference to the engine's marker asset.
//!
//! # Example
//!
//! ```
//! use tagit::level::{level_one, Level};
//!
//! let level = Level::builder("demo", level_one().table().clone())
//!     .slot(0, "b")
//!     .slot(1, "i")
//!     .build();
//!
//! let content = level.content_for_slot(0).unwrap();
//! assert_eq!(content.html, "<p><b>Hello World!</b></p>");
//! assert!(level.content_for_slot(7).is_none());
//! ```

mod catalog;
mod content;

use std::sync::Arc;

pub use catalog::{builtin_levels, find_level, level_one, level_two};
pub use content::{
    escape_html, Block, ContentEntry, ContentKey, ContentTable, Fragment, Layout,
    RenderedContent, TemplateFn,
};

/// Default rendered placeholder shown when no card is recognized.
pub const DEFAULT_PLACEHOLDER_HTML: &str =
    "<div class=\"placeholder\">The result will appear here.</div>";

/// Default source placeholder (unescaped).
pub const DEFAULT_PLACEHOLDER_SOURCE: &str = "<!-- The code will appear here -->";

/// Default hint shown while scanning.
pub const DEFAULT_HINT: &str = "Scan a card to see the result.";

/// One physical card as identified by the tracking engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSlot {
    /// Stable position assigned by the tracking engine.
    pub index: u32,
    /// Semantic tag the slot maps to.
    pub content_key: ContentKey,
}

impl MarkerSlot {
    /// Create a new slot.
    pub fn new(index: u32, content_key: impl Into<ContentKey>) -> Self {
        Self {
            index,
            content_key: content_key.into(),
        }
    }
}

/// Content shown when nothing is recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultContent {
    pub content: RenderedContent,
    pub hint: String,
}

impl Default for DefaultContent {
    fn default() -> Self {
        Self {
            content: RenderedContent::new(DEFAULT_PLACEHOLDER_HTML, DEFAULT_PLACEHOLDER_SOURCE),
            hint: DEFAULT_HINT.to_string(),
        }
    }
}

/// A named bundle of marker mappings, templates and the tracking asset.
#[derive(Debug, Clone)]
pub struct Level {
    id: String,
    title: String,
    subtitle: String,
    asset_path: String,
    slots: Vec<MarkerSlot>,
    table: Arc<ContentTable>,
    default: DefaultContent,
}

impl Level {
    /// Start building a level around a content table.
    pub fn builder(id: impl Into<String>, table: ContentTable) -> LevelBuilder {
        LevelBuilder::new(id, table)
    }

    /// Short identifier (e.g. `L1`).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display subtitle.
    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    /// Path of the tracking engine's marker descriptor.
    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    /// All configured slots, ordered by index.
    pub fn slots(&self) -> &[MarkerSlot] {
        &self.slots
    }

    /// Number of markers the engine should track.
    pub fn marker_count(&self) -> usize {
        self.slots.len()
    }

    /// Look up a slot by engine index.
    pub fn slot(&self, index: u32) -> Option<&MarkerSlot> {
        self.slots.iter().find(|s| s.index == index)
    }

    /// The level's content table.
    pub fn table(&self) -> &ContentTable {
        &self.table
    }

    /// Render content for a key.
    pub fn render(&self, key: &ContentKey) -> Option<RenderedContent> {
        self.table.render(key)
    }

    /// Render content for an engine slot index.
    pub fn content_for_slot(&self, index: u32) -> Option<RenderedContent> {
        self.slot(index).and_then(|s| self.table.render(&s.content_key))
    }

    /// Teaching hint for a key, empty if none is configured.
    pub fn hint(&self, key: &ContentKey) -> &str {
        self.table.hint(key).unwrap_or("")
    }

    /// Content restored after a reset.
    pub fn default_content(&self) -> &DefaultContent {
        &self.default
    }
}

/// Builder for [`Level`].
#[derive(Debug)]
pub struct LevelBuilder {
    id: String,
    title: Option<String>,
    subtitle: String,
    asset_path: Option<String>,
    slots: Vec<MarkerSlot>,
    table: ContentTable,
    default: DefaultContent,
}

impl LevelBuilder {
    fn new(id: impl Into<String>, table: ContentTable) -> Self {
        Self {
            id: id.into(),
            title: None,
            subtitle: String::new(),
            asset_path: None,
            slots: Vec::new(),
            table,
            default: DefaultContent::default(),
        }
    }

    /// Set the display title (defaults to the id).
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the subtitle.
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    /// Set the marker asset path (defaults to `<id>.mind`).
    pub fn asset_path(mut self, path: impl Into<String>) -> Self {
        self.asset_path = Some(path.into());
        self
    }

    /// Map an engine slot to a content key. A later mapping for the same
    /// index replaces the earlier one.
    pub fn slot(mut self, index: u32, key: impl Into<ContentKey>) -> Self {
        self.slots.retain(|s| s.index != index);
        self.slots.push(MarkerSlot::new(index, key));
        self
    }

    /// Map consecutive slots starting at 0.
    pub fn slots<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ContentKey>,
    {
        for (index, key) in keys.into_iter().enumerate() {
            self = self.slot(index as u32, key);
        }
        self
    }

    /// Override the default content.
    pub fn default_content(mut self, default: DefaultContent) -> Self {
        self.default = default;
        self
    }

    /// Build the level.
    pub fn build(mut self) -> Level {
        self.slots.sort_by_key(|s| s.index);
        let asset_path = self
            .asset_path
            .unwrap_or_else(|| format!("{}.mind", self.id.to_lowercase()));
        Level {
            title: self.title.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            subtitle: self.subtitle,
            asset_path,
            slots: self.slots,
            table: Arc::new(self.table),
            default: self.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ContentTable {
        fn bold() -> Fragment {
            Fragment::single("<b>x</b>")
        }
        ContentTable::new(Layout::Inline).with_entry("b", "Bold", bold)
    }

    #[test]
    fn test_builder_defaults() {
        let level = Level::builder("Demo", table()).build();
        assert_eq!(level.title(), "Demo");
        assert_eq!(level.asset_path(), "demo.mind");
        assert_eq!(level.marker_count(), 0);
    }

    #[test]
    fn test_slot_replacement_and_order() {
        let level = Level::builder("demo", table())
            .slot(2, "b")
            .slot(0, "i")
            .slot(2, "u")
            .build();

        let indices: Vec<u32> = level.slots().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(level.slot(2).unwrap().content_key, ContentKey::new("u"));
    }

    #[test]
    fn test_unmapped_content_is_none() {
        let level = Level::builder("demo", table()).slots(["b", "blink"]).build();
        assert!(level.content_for_slot(0).is_some());
        // Mapped slot without a template.
        assert!(level.content_for_slot(1).is_none());
        // Unmapped slot.
        assert!(level.content_for_slot(5).is_none());
    }

    #[test]
    fn test_default_content_is_escaped() {
        let default = DefaultContent::default();
        assert_eq!(default.content.html, DEFAULT_PLACEHOLDER_HTML);
        assert_eq!(
            default.content.source,
            "&lt;!-- The code will appear here --&gt;"
        );
    }
}
