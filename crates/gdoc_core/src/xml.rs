//! XML serialization of a [`RichTextDocument`] into the rich-text field schema.
//!
//! Element-only containers are indented two spaces per level. Mixed content
//! (`para`, `title`, `link`) is written inline so no whitespace is added to text.

use crate::richtext::{Block, Embed, Inline, Paragraph, RichTextDocument, Table, Title};

pub const NS_DOCBOOK: &str = "http://docbook.org/ns/docbook";
pub const NS_XLINK: &str = "http://www.w3.org/1999/xlink";
pub const NS_XHTML: &str = "http://ez.no/xmlns/ezpublish/docbook/xhtml";
pub const NS_CUSTOM: &str = "http://ez.no/xmlns/ezpublish/docbook/custom";
pub const SCHEMA_VERSION: &str = "5.0-variant ezpublish-1.0";

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Serialize the whole document, including the XML declaration.
pub fn to_xml(doc: &RichTextDocument) -> String {
    let mut writer = XmlWriter::new();
    writer.buffer.push_str(DECLARATION);

    let root_attrs = [
        ("xmlns", NS_DOCBOOK),
        ("xmlns:xlink", NS_XLINK),
        ("xmlns:ezxhtml", NS_XHTML),
        ("xmlns:ezcustom", NS_CUSTOM),
        ("version", SCHEMA_VERSION),
    ];

    if doc.is_empty() {
        writer.empty_element("section", &root_attrs);
        return writer.finish();
    }

    writer.open("section", &root_attrs);
    for block in doc.blocks() {
        match block {
            Block::Title(title) => writer.title(title),
            Block::Paragraph(paragraph) => writer.paragraph(paragraph),
            Block::Embed(embed) => writer.embed(embed),
            Block::Table(table) => writer.table(table),
        }
    }
    writer.close("section");
    writer.finish()
}

struct XmlWriter {
    buffer: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            buffer: String::with_capacity(4 * 1024),
            depth: 0,
        }
    }

    fn finish(mut self) -> String {
        if !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.buffer
    }

    fn title(&mut self, title: &Title) {
        self.indent();
        self.start_tag("title", &[("ezxhtml:level", title.level.as_str())]);
        self.text(&title.text);
        self.end_tag("title");
        self.buffer.push('\n');
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        self.indent();
        self.start_tag("para", &[]);
        for inline in paragraph.inlines() {
            match inline {
                Inline::Text(text) => self.text(text),
                Inline::Link { href, text } => {
                    self.start_tag("link", &[("xlink:href", href.as_str())]);
                    self.text(text);
                    self.end_tag("link");
                }
            }
        }
        self.end_tag("para");
        self.buffer.push('\n');
    }

    fn embed(&mut self, embed: &Embed) {
        self.open(
            "ezembed",
            &[
                ("xlink:href", embed.href.as_str()),
                ("view", embed.view.as_str()),
                ("ezxhtml:class", embed.class.as_str()),
            ],
        );
        self.open("ezconfig", &[]);
        for (key, value) in &embed.config {
            self.text_element("ezvalue", &[("key", key.as_str())], value);
        }
        self.close("ezconfig");
        self.close("ezembed");
    }

    fn table(&mut self, table: &Table) {
        self.open("informaltable", &[("border", "1"), ("width", "100%")]);
        self.open("tbody", &[]);
        for row in &table.rows {
            self.open("tr", &[]);
            for cell in &row.cells {
                self.open("td", &[]);
                self.text_element("para", &[], &cell.text);
                self.close("td");
            }
            self.close("tr");
        }
        self.close("tbody");
        self.close("informaltable");
    }

    /// Start tag on its own line; children follow one level deeper.
    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.start_tag(tag, attrs);
        self.buffer.push('\n');
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.end_tag(tag);
        self.buffer.push('\n');
    }

    fn empty_element(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.buffer.push('<');
        self.buffer.push_str(tag);
        self.attributes(attrs);
        self.buffer.push_str("/>\n");
    }

    fn text_element(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) {
        self.indent();
        self.start_tag(tag, attrs);
        self.text(text);
        self.end_tag(tag);
        self.buffer.push('\n');
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.buffer.push('<');
        self.buffer.push_str(tag);
        self.attributes(attrs);
        self.buffer.push('>');
    }

    fn end_tag(&mut self, tag: &str) {
        self.buffer.push_str("</");
        self.buffer.push_str(tag);
        self.buffer.push('>');
    }

    fn attributes(&mut self, attrs: &[(&str, &str)]) {
        for (name, value) in attrs {
            self.buffer.push(' ');
            self.buffer.push_str(name);
            self.buffer.push_str("=\"");
            self.attr_escaped(value);
            self.buffer.push('"');
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str("  ");
        }
    }

    fn text(&mut self, s: &str) {
        for c in s.chars() {
            match c {
                '&' => self.buffer.push_str("&amp;"),
                '<' => self.buffer.push_str("&lt;"),
                '>' => self.buffer.push_str("&gt;"),
                // Soft line break inside a run.
                '\u{0B}' => self.buffer.push('\n'),
                c if is_forbidden(c) => {}
                _ => self.buffer.push(c),
            }
        }
    }

    fn attr_escaped(&mut self, s: &str) {
        for c in s.chars() {
            match c {
                '&' => self.buffer.push_str("&amp;"),
                '"' => self.buffer.push_str("&quot;"),
                '<' => self.buffer.push_str("&lt;"),
                '>' => self.buffer.push_str("&gt;"),
                '\n' => self.buffer.push_str("&#10;"),
                '\t' => self.buffer.push_str("&#9;"),
                '\r' => self.buffer.push_str("&#13;"),
                c if is_forbidden(c) => {}
                _ => self.buffer.push(c),
            }
        }
    }
}

/// Control characters not allowed anywhere in an XML 1.0 document.
fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\0'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}
