use crate::ids::ContentId;

pub const EMBED_SCHEME: &str = "ezcontent://";
pub const EMBED_VIEW: &str = "embed";
pub const EMBED_CLASS_IMAGE: &str = "ez-embed-type-image";
/// Image size used for every embed; not derived from the source.
pub const EMBED_SIZE: &str = "large";

/// In-memory rich-text document. The root `section` is implicit; `blocks`
/// are its children in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichTextDocument {
    blocks: Vec<Block>,
}

impl RichTextDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: impl Into<Block>) {
        self.blocks.push(block.into());
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(Title),
    Paragraph(Paragraph),
    Embed(Embed),
    Table(Table),
}

impl From<Title> for Block {
    fn from(title: Title) -> Self {
        Block::Title(title)
    }
}

impl From<Paragraph> for Block {
    fn from(paragraph: Paragraph) -> Self {
        Block::Paragraph(paragraph)
    }
}

impl From<Embed> for Block {
    fn from(embed: Embed) -> Self {
        Block::Embed(embed)
    }
}

impl From<Table> for Block {
    fn from(table: Table) -> Self {
        Block::Table(table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub level: String,
    pub text: String,
}

/// A paragraph with at least one inline child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    inlines: Vec<Inline>,
}

impl Paragraph {
    /// Returns `None` for an empty child list; empty paragraphs are never materialized.
    pub fn new(inlines: Vec<Inline>) -> Option<Self> {
        if inlines.is_empty() {
            None
        } else {
            Some(Self { inlines })
        }
    }

    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link { href: String, text: String },
}

/// Reference to another stored object, rendered as `ezembed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub href: String,
    pub view: String,
    pub class: String,
    pub config: Vec<(String, String)>,
}

impl Embed {
    pub fn image(content_id: ContentId) -> Self {
        Self {
            href: format!("{EMBED_SCHEME}{content_id}"),
            view: EMBED_VIEW.to_string(),
            class: EMBED_CLASS_IMAGE.to_string(),
            config: vec![("size".to_string(), EMBED_SIZE.to_string())],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// A cell holds exactly one paragraph of plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    pub text: String,
}
