#![allow(dead_code)]
//! Content model: blocks, inline text runs and catalog records.

use regex::Regex;
use std::sync::OnceLock;

/// One styled run of inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub href: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: None,
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// Where an image block's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// File hosted by the content service (signed, short-lived URL).
    Hosted(String),
    External(String),
}

impl ImageSource {
    pub fn url(&self) -> &str {
        match self {
            Self::Hosted(url) | Self::External(url) => url,
        }
    }
}

/// Payload of a block, one variant per recognized type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph { rich_text: Vec<TextRun> },
    Heading1 { rich_text: Vec<TextRun> },
    Heading2 { rich_text: Vec<TextRun> },
    Image { source: Option<ImageSource> },
    /// Children are never expanded.
    Toggle { rich_text: Vec<TextRun> },
    EmbeddedCollection,
    ChildPageStub { title: String },
    /// `source_node_id` is set on mirror copies only; the original instance
    /// carries its content as its own children.
    SyncMirror { source_node_id: Option<String> },
    CrossDocLink { target_document_id: String },
    Unsupported { kind: String },
}

impl BlockKind {
    /// Type tag as reported by the content service.
    pub fn tag(&self) -> &str {
        match self {
            Self::Paragraph { .. } => "paragraph",
            Self::Heading1 { .. } => "heading_1",
            Self::Heading2 { .. } => "heading_2",
            Self::Image { .. } => "image",
            Self::Toggle { .. } => "toggle",
            Self::EmbeddedCollection => "child_database",
            Self::ChildPageStub { .. } => "child_page",
            Self::SyncMirror { .. } => "synced_block",
            Self::CrossDocLink { .. } => "link_to_page",
            Self::Unsupported { kind } => kind,
        }
    }
}

/// A node of the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub has_children: bool,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            has_children: false,
            kind,
        }
    }

    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }
}

/// Catalog attribute holding a project's public slug.
pub const URL_PROPERTY: &str = "URL";
/// Catalog checkbox selecting projects for the home carousel.
pub const FEATURED_PROPERTY: &str = "Home";

/// A document as seen through the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentRecord {
    pub id: String,
    pub title: Option<String>,
    /// Denormalized `URL` attribute; the project's public slug.
    pub url: Option<String>,
    /// Classification (`Tipo`).
    pub kind: Option<String>,
    pub year: Option<i64>,
    pub cover_url: Option<String>,
    /// Shown on the home carousel.
    pub featured: bool,
}

impl DocumentRecord {
    /// Public slug, falling back to the raw id.
    pub fn slug(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.id)
    }
}

/// Catalog query predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogFilter {
    All,
    TextEquals { property: String, value: String },
    CheckboxEquals { property: String, value: bool },
}

impl CatalogFilter {
    pub fn text_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TextEquals {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn checkbox(property: impl Into<String>, value: bool) -> Self {
        Self::CheckboxEquals {
            property: property.into(),
            value,
        }
    }
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Lower-case `title` and join its words with single hyphens.
pub fn slugify(title: &str) -> String {
    whitespace_runs()
        .replace_all(&title.trim().to_lowercase(), "-")
        .into_owned()
}
