//! Pure mappings from one classified source element to output nodes.

use crate::ids::ContentId;
use crate::richtext::{Embed, Inline, Paragraph, Table, TableCell, TableRow, Title};
use crate::source::{Run, SourceRow};

/// Heading text comes from the first run only; later runs are dropped.
pub fn build_title(level: &str, runs: &[Run]) -> Title {
    Title {
        level: level.to_string(),
        text: first_run_text(runs),
    }
}

/// Returns `None` when every run is empty or whitespace and none is a link.
pub fn build_paragraph(runs: &[Run]) -> Option<Paragraph> {
    let mut inlines = Vec::with_capacity(runs.len());
    for run in runs {
        let text = run.text.trim();
        match &run.link {
            Some(url) => inlines.push(Inline::Link {
                href: url.clone(),
                text: format!(" {text} "),
            }),
            None if !text.is_empty() => inlines.push(Inline::Text(text.to_string())),
            None => {}
        }
    }
    Paragraph::new(inlines)
}

pub fn build_embed(asset: ContentId) -> Embed {
    Embed::image(asset)
}

/// Each cell keeps only the first run of its first paragraph.
pub fn build_table(rows: &[SourceRow]) -> Table {
    Table {
        rows: rows
            .iter()
            .map(|row| TableRow {
                cells: row
                    .cells
                    .iter()
                    .map(|cell| TableCell {
                        text: cell
                            .paragraphs
                            .first()
                            .map(|runs| first_run_text(runs))
                            .unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn first_run_text(runs: &[Run]) -> String {
    runs.first()
        .map(|run| run.text.trim().to_string())
        .unwrap_or_default()
}
