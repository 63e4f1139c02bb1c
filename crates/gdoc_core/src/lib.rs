//! Gdoc core: pure document model, classification and rich-text building.
//!
//! Nothing in this crate performs IO. Source documents are decoded from the
//! document API's JSON once, classified into [`StructuralElement`]s and turned
//! into a [`RichTextDocument`] that serializes to the target XML schema.
mod build;
mod ids;
mod richtext;
mod source;
pub mod wire;
mod xml;

pub use build::{build_embed, build_paragraph, build_table, build_title};
pub use ids::{ContentId, RemoteId};
pub use richtext::{
    Block, Embed, Inline, Paragraph, RichTextDocument, Table, TableCell, TableRow, Title,
    EMBED_CLASS_IMAGE, EMBED_SCHEME, EMBED_SIZE, EMBED_VIEW,
};
pub use source::{
    DecodeError, InlineObject, Run, SourceCell, SourceDocument, SourceRow, StructuralElement,
    HEADING_PREFIX,
};
pub use xml::{to_xml, NS_CUSTOM, NS_DOCBOOK, NS_XHTML, NS_XLINK, SCHEMA_VERSION};
