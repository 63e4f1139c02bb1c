use std::collections::BTreeMap;

use thiserror::Error;

use crate::wire;

/// Named style prefix that marks a paragraph as a heading.
pub const HEADING_PREFIX: &str = "HEADING_";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed document json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A contiguous span of text inside a paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub link: Option<String>,
    pub inline_object_id: Option<String>,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: Some(url.into()),
            inline_object_id: None,
        }
    }

    pub fn inline_object(id: impl Into<String>) -> Self {
        Self {
            inline_object_id: Some(id.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineObject {
    pub id: String,
    pub content_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    pub cells: Vec<SourceCell>,
}

/// Paragraphs of one table cell, each paragraph as its ordered runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCell {
    pub paragraphs: Vec<Vec<Run>>,
}

/// One block-level unit of the source document, classified once at decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralElement {
    /// `level` is whatever follows [`HEADING_PREFIX`] in the style name.
    Heading { level: String, runs: Vec<Run> },
    Image { inline_object_id: String, runs: Vec<Run> },
    Table { rows: Vec<SourceRow> },
    Paragraph { runs: Vec<Run> },
    /// `kind` is a short label for diagnostics.
    Unknown { kind: String },
}

impl StructuralElement {
    /// First-match classification: heading, image, table, paragraph, unknown.
    pub fn classify(raw: wire::StructuralElement) -> Self {
        let wire::StructuralElement {
            paragraph,
            table,
            section_break,
            table_of_contents,
        } = raw;

        if let Some(paragraph) = &paragraph {
            let style = paragraph
                .paragraph_style
                .as_ref()
                .and_then(|style| style.named_style_type.as_deref());
            if let Some(level) = style.and_then(|s| s.strip_prefix(HEADING_PREFIX)) {
                return StructuralElement::Heading {
                    level: level.to_string(),
                    runs: runs_of(paragraph),
                };
            }
            let first_object = paragraph
                .elements
                .first()
                .and_then(|element| element.inline_object_element.as_ref());
            if let Some(object) = first_object {
                return StructuralElement::Image {
                    inline_object_id: object.inline_object_id.clone(),
                    runs: runs_of(paragraph),
                };
            }
        }

        if let Some(table) = table {
            return StructuralElement::Table {
                rows: table.table_rows.into_iter().map(row_of).collect(),
            };
        }

        if let Some(paragraph) = &paragraph {
            return StructuralElement::Paragraph {
                runs: runs_of(paragraph),
            };
        }

        let kind = if section_break.is_some() {
            "sectionBreak"
        } else if table_of_contents.is_some() {
            "tableOfContents"
        } else {
            "unrecognized"
        };
        StructuralElement::Unknown {
            kind: kind.to_string(),
        }
    }

    pub fn kind_name(&self) -> &str {
        match self {
            StructuralElement::Heading { .. } => "heading",
            StructuralElement::Image { .. } => "image",
            StructuralElement::Table { .. } => "table",
            StructuralElement::Paragraph { .. } => "paragraph",
            StructuralElement::Unknown { kind } => kind,
        }
    }
}

fn runs_of(paragraph: &wire::Paragraph) -> Vec<Run> {
    paragraph
        .elements
        .iter()
        .map(|element| {
            let (text, link) = match &element.text_run {
                Some(run) => (
                    run.content.clone(),
                    run.text_style
                        .as_ref()
                        .and_then(|style| style.link.as_ref())
                        .and_then(|link| link.url.clone()),
                ),
                None => (String::new(), None),
            };
            Run {
                text,
                link,
                inline_object_id: element
                    .inline_object_element
                    .as_ref()
                    .map(|object| object.inline_object_id.clone()),
            }
        })
        .collect()
}

fn row_of(row: wire::TableRow) -> SourceRow {
    SourceRow {
        cells: row
            .table_cells
            .into_iter()
            .map(|cell| SourceCell {
                paragraphs: cell
                    .content
                    .iter()
                    .filter_map(|element| element.paragraph.as_ref())
                    .map(runs_of)
                    .collect(),
            })
            .collect(),
    }
}

/// Read-only view of a fetched document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: String,
    pub title: String,
    pub elements: Vec<StructuralElement>,
    pub inline_objects: BTreeMap<String, InlineObject>,
}

impl SourceDocument {
    pub fn from_json(json: &[u8]) -> Result<Self, DecodeError> {
        let raw: wire::Document = serde_json::from_slice(json)?;
        Ok(Self::from(raw))
    }

    pub fn inline_object(&self, id: &str) -> Option<&InlineObject> {
        self.inline_objects.get(id)
    }
}

impl From<wire::Document> for SourceDocument {
    fn from(raw: wire::Document) -> Self {
        let inline_objects = raw
            .inline_objects
            .iter()
            .map(|(id, object)| {
                (
                    id.clone(),
                    InlineObject {
                        id: id.clone(),
                        content_uri: object.content_uri().map(ToOwned::to_owned),
                    },
                )
            })
            .collect();

        Self {
            id: raw.document_id,
            title: raw.title,
            elements: raw
                .body
                .content
                .into_iter()
                .map(StructuralElement::classify)
                .collect(),
            inline_objects,
        }
    }
}
